use image::Rgba;
use serde::Deserialize;
use thiserror::Error;

/// テキストをどこに描くか。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    /// 画像の下に帯を追加し、そこに描く。元の画素には触れない。
    #[default]
    Below,
    /// 画像の上に直接描く。キャンバスの大きさは変わらない。
    Overlay,
}

/// `Overlay` のときにテキストブロックを寄せる角。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    #[default]
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("色 '{0}' は #RRGGBB または #RRGGBBAA 形式で指定してください")]
pub struct ColorError(pub String);

/// キャプション描画のレイアウト設定。
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub font_size: f32,
    pub text_color: Rgba<u8>,
    pub background_color: Rgba<u8>,
    pub placement: Placement,
    pub anchor: Anchor,
    pub margin: u32,
    pub line_spacing: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let font_size = 20.0;
        Self {
            font_size,
            text_color: Rgba([0, 0, 0, 255]),
            background_color: Rgba([255, 255, 255, 255]),
            placement: Placement::Below,
            anchor: Anchor::TopLeft,
            margin: default_margin(font_size),
            line_spacing: 4,
        }
    }
}

/// 余白の既定値はフォントサイズの1/4。
pub fn default_margin(font_size: f32) -> u32 {
    (font_size / 4.0).floor().max(0.0) as u32
}

/// `#RRGGBB` / `#RRGGBBAA` 形式の色を解析します。先頭の `#` は省略可能です。
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let hex = s.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError(s.to_string()));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError(s.to_string()));
    let alpha = if hex.len() == 8 { channel(6)? } else { 255 };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
