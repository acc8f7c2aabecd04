use std::time::Duration;

use crate::error::{Error, Result};
use crate::texture::TextureHandle;

pub const DEFAULT_TEXTURE_URL: &str = "https://text-to-image.jessejesse.workers.dev/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the prompt-to-image endpoint. The service takes a text prompt
/// as a query parameter and answers with raw image bytes.
pub struct TextureService {
    client: reqwest::Client,
    base_url: String,
}

impl TextureService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Generates a texture from `prompt`. Rejects blank prompts before any
    /// network traffic happens.
    pub async fn generate(&self, prompt: &str) -> Result<TextureHandle> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::EmptyPrompt);
        }

        log::info!("requesting texture for prompt {:?}", prompt);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("prompt", prompt)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::TextureService {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        let handle = TextureHandle::from_bytes(format!("prompt:{prompt}"), &bytes)?;
        log::info!(
            "texture ready: {}x{}, {} bytes",
            handle.width,
            handle.height,
            handle.png.len()
        );
        Ok(handle)
    }
}
