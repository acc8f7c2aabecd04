mod provider;
mod typeface;

pub use provider::{DiskFontProvider, FontProvider, HttpFontProvider, DEFAULT_FONT_URL};
pub use typeface::{FontFace, Glyph, OutlineCommand};
