// rusttype のフォント型と、ファイルからの読み込みに必要な標準ライブラリをインポートします。
use rusttype::Font;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 埋め込みのデフォルトフォント（DejaVu Sans Mono）。
static DEFAULT_FONT: &[u8] = include_bytes!("../../../fonts/DejaVuSansMono.ttf");

#[derive(Debug, Error)]
pub enum FontError {
    #[error("フォントファイル '{path}' を読み込めません: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{0}' は有効なTTF/OTFフォントではありません")]
    InvalidFont(String),
}

/// キャプションの描画に使うフォントを管理するためのラッパー構造体。
///
/// ファイルまたは埋め込みデータからフォントを読み込むためのコンストラクタを提供します。
#[derive(Clone)]
pub struct CaptionFont {
    font: Font<'static>,
    // ログ表示用。埋め込みフォントの場合は None
    path: Option<PathBuf>,
}

impl CaptionFont {
    /// 新しい `CaptionFont` インスタンスを作成します。
    ///
    /// # 引数
    ///
    /// * `font_path`: TTFやOTFなどのフォントファイルへのパスを含む `Option`。
    ///   - `Some(path)`: 指定されたパスからフォントを読み込みます。
    ///   - `None`: バイナリに埋め込まれたデフォルトフォントを使用します。
    pub fn new(font_path: Option<&Path>) -> Result<Self, FontError> {
        match font_path {
            Some(path) => {
                let font_bytes = fs::read(path).map_err(|source| FontError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let font = Font::try_from_vec(font_bytes)
                    .ok_or_else(|| FontError::InvalidFont(path.display().to_string()))?;
                Ok(Self {
                    font,
                    path: Some(path.to_path_buf()),
                })
            }
            None => {
                let font = Font::try_from_bytes(DEFAULT_FONT)
                    .ok_or_else(|| FontError::InvalidFont("(埋め込みフォント)".to_string()))?;
                Ok(Self { font, path: None })
            }
        }
    }

    /// 内部に保持している `rusttype::Font` への参照を返します。
    pub fn font(&self) -> &Font<'static> {
        &self.font
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptionFont")
            .field("path", &self.path)
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}
