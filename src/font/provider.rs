use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{Error, Result};
use crate::font::FontFace;
use crate::params::FontId;

/// three.js examples CDN, the canonical home of the bundled typeface fonts.
pub const DEFAULT_FONT_URL: &str = "https://cdn.jsdelivr.net/npm/three@0.132.2/examples/fonts";

/// Source of parsed font faces. Loading is async because fonts may come off
/// the network; implementations cache, so repeat loads are cheap.
pub trait FontProvider: Send + Sync {
    fn load(&self, font: FontId) -> BoxFuture<'_, Result<Arc<FontFace>>>;
}

type FaceCache = Mutex<HashMap<FontId, Arc<FontFace>>>;

fn cache_hit(cache: &FaceCache, font: FontId) -> Option<Arc<FontFace>> {
    cache.lock().ok()?.get(&font).cloned()
}

fn cache_store(cache: &FaceCache, font: FontId, face: &Arc<FontFace>) {
    if let Ok(mut map) = cache.lock() {
        map.insert(font, Arc::clone(face));
    }
}

/// Loads `<dir>/<font>_regular.typeface.json` from local disk.
pub struct DiskFontProvider {
    dir: PathBuf,
    cache: FaceCache,
}

impl DiskFontProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }
}

impl FontProvider for DiskFontProvider {
    fn load(&self, font: FontId) -> BoxFuture<'_, Result<Arc<FontFace>>> {
        Box::pin(async move {
            if let Some(face) = cache_hit(&self.cache, font) {
                return Ok(face);
            }

            let path = self.dir.join(font.resource_name());
            let bytes = std::fs::read(&path).map_err(|e| Error::FontLoad {
                font,
                reason: format!("{}: {}", path.display(), e),
            })?;
            let face = Arc::new(FontFace::from_slice(&bytes)?);
            log::info!(
                "loaded font {} from {} ({} glyphs)",
                font,
                path.display(),
                face.glyph_count()
            );
            cache_store(&self.cache, font, &face);
            Ok(face)
        })
    }
}

/// Downloads typeface JSON over HTTP and caches parsed faces per font.
pub struct HttpFontProvider {
    client: reqwest::Client,
    base_url: String,
    cache: FaceCache,
}

impl HttpFontProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            cache: Mutex::new(HashMap::new()),
        })
    }

    fn url_for(&self, font: FontId) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            font.resource_name()
        )
    }
}

impl FontProvider for HttpFontProvider {
    fn load(&self, font: FontId) -> BoxFuture<'_, Result<Arc<FontFace>>> {
        Box::pin(async move {
            if let Some(face) = cache_hit(&self.cache, font) {
                return Ok(face);
            }

            let url = self.url_for(font);
            log::info!("fetching font {} from {}", font, url);
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| Error::FontLoad {
                    font,
                    reason: e.to_string(),
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::FontLoad {
                    font,
                    reason: format!("{} answered {}", url, status),
                });
            }

            let bytes = response.bytes().await.map_err(|e| Error::FontLoad {
                font,
                reason: e.to_string(),
            })?;
            let face = Arc::new(FontFace::from_slice(&bytes)?);
            log::info!("loaded font {} ({} glyphs)", font, face.glyph_count());
            cache_store(&self.cache, font, &face);
            Ok(face)
        })
    }
}
