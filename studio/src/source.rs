//! Image sources a generation run renders through.

use std::time::Duration;

use async_trait::async_trait;
use mimesis_pollinations::{Client, ImageRequest};
use tracing::warn;

use crate::error::Result;
use crate::size::ImageSize;

/// Renders a prompt into an image URL.
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Produces the URL of the rendered image.
    async fn render(
        &self,
        prompt: &str,
        size: ImageSize,
        seed: u64,
        timeout: Duration,
    ) -> Result<String>;
}

#[async_trait]
impl ImageSource for Client {
    async fn render(
        &self,
        prompt: &str,
        size: ImageSize,
        seed: u64,
        timeout: Duration,
    ) -> Result<String> {
        let request = ImageRequest::new(prompt)
            .with_size(size.width, size.height)
            .with_seed(seed)
            .with_timeout(timeout);
        let image = self.image().generate(&request).await;
        if !image.validated {
            warn!(
                url = %image.url,
                attempts = image.attempts,
                "using unvalidated image url"
            );
        }
        Ok(image.url)
    }
}
