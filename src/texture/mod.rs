mod fetch;

pub use fetch::{TextureService, DEFAULT_TEXTURE_URL, DEFAULT_TIMEOUT_SECS};

use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use image::ImageFormat;

use crate::error::{Error, Result};

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Decoded image ready to be mapped onto the mesh and embedded in exports.
/// Pixels are kept as PNG bytes because that is what the export container
/// stores; handles compare by identity, not by content.
#[derive(Clone)]
pub struct TextureHandle {
    id: u64,
    pub width: u32,
    pub height: u32,
    pub png: Arc<Vec<u8>>,
    pub label: String,
}

impl TextureHandle {
    /// Decodes `bytes` (any supported image format) and normalizes the
    /// payload to PNG. Already-PNG bytes are kept as-is.
    pub fn from_bytes(label: impl Into<String>, bytes: &[u8]) -> Result<TextureHandle> {
        let format = image::guess_format(bytes).map_err(|e| Error::TextureDecode(e.to_string()))?;
        let decoded =
            image::load_from_memory(bytes).map_err(|e| Error::TextureDecode(e.to_string()))?;

        let png = if format == ImageFormat::Png {
            bytes.to_vec()
        } else {
            let mut out = Cursor::new(Vec::new());
            decoded
                .write_to(&mut out, ImageFormat::Png)
                .map_err(|e| Error::TextureDecode(e.to_string()))?;
            out.into_inner()
        };

        Ok(TextureHandle {
            id: NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed),
            width: decoded.width(),
            height: decoded.height(),
            png: Arc::new(png),
            label: label.into(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TextureHandle {}

impl fmt::Debug for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureHandle")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .field("label", &self.label)
            .finish()
    }
}

/// Loads a texture from a local image file.
pub fn load_texture_file(path: impl AsRef<Path>) -> Result<TextureHandle> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let handle = TextureHandle::from_bytes(format!("file:{}", path.display()), &bytes)?;
    log::info!(
        "loaded texture {} ({}x{})",
        handle.label,
        handle.width,
        handle.height
    );
    Ok(handle)
}
