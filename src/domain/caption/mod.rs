pub mod caption_font;
pub mod layout;
pub mod renderer;

pub use caption_font::{CaptionFont, FontError};
pub use layout::{Anchor, LayoutConfig, Placement};
pub use renderer::{CaptionRenderer, TextBlock};
