//! PNGファイル末尾に追記されたデータ（トレーラー）を取り出すモジュール。
//!
//! PNGデコーダは `IEND` チャンク以降のバイト列を無視するため、
//! そこに任意のテキストを追記しておくことができます。

use memchr::memmem;
use serde::Deserialize;
use thiserror::Error;

/// PNGファイルの先頭8バイト（シグネチャ）。
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// `IEND` チャンクの種類名とCRC。PNGデータの終端を表す。
pub const PNG_END: [u8; 8] = [b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82];

/// トレーラーをテキストとして解釈するときの、不正なUTF-8への対処方針。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodePolicy {
    /// 不正なバイト列を U+FFFD に置き換える。
    #[default]
    Replace,
    /// 不正なバイト列があればエラーにする。
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrailerError {
    #[error("PNGシグネチャが見つかりません。PNGファイルではありません。")]
    NotPng,

    #[error("PNGデータの終端 (IEND) が見つかりません。")]
    MissingEndMarker,

    #[error("トレーラーが有効なUTF-8ではありません (オフセット {offset} バイト目)")]
    InvalidText { offset: usize },
}

/// ファイル全体のバイト列を、PNG本体とトレーラーに分割します。
///
/// 終端マーカーは**最後に**現れたものを採用します（`rindex` と同じ規則）。
/// トレーラーの中に終端マーカーが含まれる場合、トレーラーはその後ろの部分だけになります。
///
/// # 戻り値
/// * `Ok((png, trailer))`: `png` は終端マーカーを含むPNG本体、`trailer` はその後ろのバイト列（空の場合もある）。
/// * `Err(TrailerError)`: PNGシグネチャまたは終端マーカーが見つからない場合。
pub fn split_trailer(data: &[u8]) -> Result<(&[u8], &[u8]), TrailerError> {
    if !data.starts_with(&PNG_SIGNATURE) {
        return Err(TrailerError::NotPng);
    }
    let start = memmem::rfind(data, &PNG_END).ok_or(TrailerError::MissingEndMarker)?;
    Ok(data.split_at(start + PNG_END.len()))
}

/// トレーラーのバイト列をテキストに変換します。空のトレーラーは空文字列になります。
pub fn decode_trailer(trailer: &[u8], policy: DecodePolicy) -> Result<String, TrailerError> {
    match policy {
        DecodePolicy::Replace => Ok(String::from_utf8_lossy(trailer).into_owned()),
        DecodePolicy::Strict => std::str::from_utf8(trailer)
            .map(str::to_owned)
            .map_err(|e| TrailerError::InvalidText {
                offset: e.valid_up_to(),
            }),
    }
}
