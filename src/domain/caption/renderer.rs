//! キャプションの描画。
//!
//! 描画は決定的で、同じ入力からは常に同じ画素列が得られます。
//! キャンバスの外にはみ出したグリフの画素は黙って捨てられます
//! （キャンバスを横に広げることはしません）。

use super::caption_font::CaptionFont;
use super::layout::{Anchor, LayoutConfig, Placement};
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use rusttype::{point, Scale};

/// 測定済みのテキストブロックの大きさ。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBlock {
    pub width: u32,
    pub height: u32,
    pub line_height: u32,
}

#[derive(Debug, Clone)]
pub struct CaptionRenderer {
    font: CaptionFont,
    layout: LayoutConfig,
}

impl CaptionRenderer {
    pub fn new(font: CaptionFont, layout: LayoutConfig) -> Self {
        Self { font, layout }
    }

    fn scale(&self) -> Scale {
        Scale::uniform(self.layout.font_size)
    }

    /// 行の並びを描いたときの大きさを測ります。
    pub fn measure(&self, lines: &[String]) -> TextBlock {
        let v_metrics = self.font.font().v_metrics(self.scale());
        let line_height = (v_metrics.ascent - v_metrics.descent).ceil().max(1.0) as u32;
        let n = lines.len() as u32;
        let height = if n == 0 {
            0
        } else {
            n * line_height + (n - 1) * self.layout.line_spacing
        };
        let width = lines
            .iter()
            .map(|line| self.line_width(line))
            .max()
            .unwrap_or(0);
        TextBlock {
            width,
            height,
            line_height,
        }
    }

    // カーニングを含めた送り幅の合計
    fn line_width(&self, line: &str) -> u32 {
        self.font
            .font()
            .layout(line, self.scale(), point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
            .ceil()
            .max(0.0) as u32
    }

    /// 画像の複製に行を上から順に描き、新しい画像を返します。
    /// `lines` が空の場合は元の画像をそのまま返します。
    pub fn render(&self, image: &DynamicImage, lines: &[String]) -> RgbaImage {
        let source = image.to_rgba8();
        if lines.is_empty() {
            return source;
        }
        let block = self.measure(lines);
        let margin = self.layout.margin;

        match self.layout.placement {
            Placement::Below => {
                let (width, height) = source.dimensions();
                let band = block.height + 2 * margin;
                let mut canvas =
                    RgbaImage::from_pixel(width, height + band, self.layout.background_color);
                imageops::replace(&mut canvas, &source, 0, 0);
                self.draw_lines(&mut canvas, margin as i64, (height + margin) as i64, &block, lines);
                canvas
            }
            Placement::Overlay => {
                let mut canvas = source;
                let (x, y) = anchor_origin(
                    self.layout.anchor,
                    canvas.dimensions(),
                    &block,
                    margin,
                );
                self.draw_lines(&mut canvas, x, y, &block, lines);
                canvas
            }
        }
    }

    fn draw_lines(&self, canvas: &mut RgbaImage, x: i64, top: i64, block: &TextBlock, lines: &[String]) {
        let step = (block.line_height + self.layout.line_spacing) as i64;
        for (i, line) in lines.iter().enumerate() {
            self.draw_line(canvas, x, top + i as i64 * step, line);
        }
    }

    fn draw_line(&self, canvas: &mut RgbaImage, x: i64, top: i64, text: &str) {
        let scale = self.scale();
        let v_metrics = self.font.font().v_metrics(scale);
        let baseline = top as f32 + v_metrics.ascent;
        let color = self.layout.text_color;
        let (width, height) = canvas.dimensions();

        for glyph in self.font.font().layout(text, scale, point(x as f32, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i64 + bb.min.x as i64;
                let py = gy as i64 + bb.min.y as i64;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    return;
                }
                blend(canvas.get_pixel_mut(px as u32, py as u32), color, coverage);
            });
        }
    }
}

/// `Overlay` 配置でのテキストブロック左上の座標。負になることもある。
fn anchor_origin(anchor: Anchor, (width, height): (u32, u32), block: &TextBlock, margin: u32) -> (i64, i64) {
    let m = margin as i64;
    let left = m;
    let top = m;
    let right = width as i64 - m - block.width as i64;
    let bottom = height as i64 - m - block.height as i64;
    match anchor {
        Anchor::TopLeft => (left, top),
        Anchor::TopRight => (right, top),
        Anchor::BottomLeft => (left, bottom),
        Anchor::BottomRight => (right, bottom),
    }
}

fn blend(dst: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0) * color.0[3] as f32 / 255.0;
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for c in 0..3 {
        dst.0[c] = (color.0[c] as f32 * a + dst.0[c] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * a + dst.0[3] as f32 * inv).round() as u8;
}
