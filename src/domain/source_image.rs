// use宣言：必要なクレートやモジュールをスコープに取り込む

use super::trailer::{self, DecodePolicy, TrailerError};
use image::{DynamicImage, GenericImageView, ImageFormat}; // 画像のデコードと寸法取得のために利用
use thiserror::Error;

// --- 構造体定義 ---

/// トレーラー付きPNGファイルを読み込んだ結果を保持するコンテナ。
///
/// `from_bytes` コンストラクタを通じてのみインスタンス化でき、その際に以下の点が保証されます。
/// - データがPNGシグネチャで始まり、終端マーカー (`IEND`) を含むこと
/// - 終端マーカーまでのPNG本体が画像としてデコードできること
///
/// 元のバイト列はPNG本体とトレーラーに分けて保持するため、
/// 描画が不要な場合に元ファイルと同じ内容をそのまま書き出せます。
#[derive(Debug)]
pub struct SourceImage {
    name: String,
    png_data: Vec<u8>,
    trailer: Vec<u8>,
    image: DynamicImage,
}

// --- エラー定義 ---

/// `SourceImage` のインスタンス化時に発生する可能性のあるエラー。
#[derive(Debug, Error)]
pub enum SourceImageError {
    /// シグネチャや終端マーカーが見つからない場合。
    #[error(transparent)]
    Trailer(#[from] TrailerError),

    /// 終端マーカーまでのデータを画像としてデコードできなかった場合。
    #[error("'{name}' のPNGデータをデコードできません: {reason}")]
    NotAnImage { name: String, reason: String },
}

// --- 実装ブロック ---

impl SourceImage {
    /// ファイル全体のバイト列から新しい `SourceImage` を作成します。
    ///
    /// # 引数
    /// * `data`: ファイルの全バイト列。
    /// * `name`: ログやエラーメッセージで使う識別名（通常はファイルパス）。
    pub fn from_bytes(data: &[u8], name: impl Into<String>) -> Result<Self, SourceImageError> {
        let name = name.into();
        let (png_data, trailer) = trailer::split_trailer(data)?;

        let image = image::load_from_memory_with_format(png_data, ImageFormat::Png).map_err(|e| {
            SourceImageError::NotAnImage {
                name: name.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            name,
            png_data: png_data.to_vec(),
            trailer: trailer.to_vec(),
            image,
        })
    }

    /// トレーラーを指定の方針でテキストに変換します。
    pub fn trailer_text(&self, policy: DecodePolicy) -> Result<String, TrailerError> {
        trailer::decode_trailer(&self.trailer, policy)
    }

    /// (幅, 高さ) をまとめて取得。
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    // --- ゲッターメソッド ---

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn png_data(&self) -> &[u8] {
        &self.png_data
    }
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

// --- テストモジュール ---

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    // --- テスト用ヘルパー関数 ---
    pub(crate) fn create_dummy_png(width: u32, height: u32, color: u8) -> Vec<u8> {
        let buf = vec![color; (width * height * 3) as usize];
        let mut result = Vec::new();
        let encoder = PngEncoder::new(&mut result);
        encoder
            .write_image(&buf, width, height, ExtendedColorType::Rgb8)
            .expect("PNGのエンコードに失敗");
        result
    }

    pub(crate) fn create_png_with_trailer(width: u32, height: u32, trailer: &[u8]) -> Vec<u8> {
        let mut data = create_dummy_png(width, height, 128);
        data.extend_from_slice(trailer);
        data
    }

    #[test]
    fn from_bytes_splits_png_and_trailer() {
        let png = create_dummy_png(4, 3, 0);
        let data = create_png_with_trailer(4, 3, b"ID: abc123");
        let source = SourceImage::from_bytes(&data, "a.png").unwrap();
        assert_eq!(source.png_data(), png.as_slice());
        assert_eq!(source.trailer(), b"ID: abc123");
        assert_eq!(source.dimensions(), (4, 3));
        assert_eq!(source.name(), "a.png");
    }

    #[test]
    fn trailer_text_round_trips() {
        let text = "ID: abc123\nメモ: テスト";
        let data = create_png_with_trailer(1, 1, text.as_bytes());
        let source = SourceImage::from_bytes(&data, "a.png").unwrap();
        assert_eq!(source.trailer_text(DecodePolicy::Strict).unwrap(), text);
    }

    #[test]
    fn png_without_trailer_yields_empty_text() {
        let data = create_dummy_png(2, 2, 0);
        let source = SourceImage::from_bytes(&data, "a.png").unwrap();
        assert!(source.trailer().is_empty());
        assert_eq!(source.trailer_text(DecodePolicy::Replace).unwrap(), "");
    }

    #[test]
    fn rejects_non_png_data() {
        let res = SourceImage::from_bytes(b"this is not an image", "x.png");
        assert!(matches!(
            res,
            Err(SourceImageError::Trailer(TrailerError::NotPng))
        ));
    }

    #[test]
    fn rejects_png_without_end_marker() {
        let data = create_dummy_png(2, 2, 0);
        // IEND チャンクを切り落とす
        let truncated = &data[..data.len() - 12];
        let res = SourceImage::from_bytes(truncated, "x.png");
        assert!(matches!(
            res,
            Err(SourceImageError::Trailer(TrailerError::MissingEndMarker))
        ));
    }

    #[test]
    fn rejects_corrupt_png_body() {
        let mut data = trailer::PNG_SIGNATURE.to_vec();
        data.extend_from_slice(b"garbage");
        data.extend_from_slice(&trailer::PNG_END);
        let res = SourceImage::from_bytes(&data, "x.png");
        assert!(matches!(res, Err(SourceImageError::NotAnImage { .. })));
    }
}
