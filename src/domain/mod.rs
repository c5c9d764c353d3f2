pub mod caption;
pub mod captioner;
pub mod input_source;
pub mod output_png;
pub mod pattern;
pub mod source_image;
pub mod trailer;

// --- public re-exports ---
pub use captioner::{Captioner, FileReport};
pub use source_image::SourceImage;
