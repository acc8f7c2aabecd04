use thiserror::Error;

use crate::params::FontId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("text is empty, nothing to extrude")]
    EmptyText,

    #[error("texture prompt is empty")]
    EmptyPrompt,

    #[error("failed to load font {font}: {reason}")]
    FontLoad { font: FontId, reason: String },

    #[error("font data is not valid typeface JSON: {0}")]
    FontParse(String),

    #[error("no glyph outlines available for {text:?}")]
    MissingGlyphs { text: String },

    #[error("text produced no triangles")]
    DegenerateGeometry,

    #[error("glyph tessellation failed: {0}")]
    Tessellation(String),

    #[error("texture bytes could not be decoded: {0}")]
    TextureDecode(String),

    #[error("texture service returned status {status}")]
    TextureService { status: u16 },

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
