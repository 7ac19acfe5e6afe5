//! Image generation service.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{
    client::MAX_TIMEOUT,
    error::Result,
    http::{join_segments, HttpClient},
    retry::RetryPolicy,
};

/// Width and height used when a request does not set them.
pub const DEFAULT_IMAGE_SIZE: u32 = 1024;

/// Exclusive upper bound of the random seed picked when none is supplied.
const DEFAULT_SEED_RANGE: u64 = 1000;

/// Image generation service.
///
/// The host renders the image lazily when its URL is fetched, so generating
/// an image means building its URL and checking that the host accepts it.
pub struct ImageService {
    http: Arc<HttpClient>,
    host: Url,
    retry: RetryPolicy,
}

impl ImageService {
    pub(crate) fn new(http: Arc<HttpClient>, host: Url, retry: RetryPolicy) -> Self {
        Self { http, host, retry }
    }

    /// Builds the request URL for `request` with a concrete seed.
    ///
    /// `GET {host}/prompt/{prompt}?width=W&height=H&nologo=true&seed=S`
    pub fn build_url(&self, request: &ImageRequest, seed: u64) -> Url {
        let mut url = join_segments(&self.host, &["prompt", &request.prompt]);
        url.query_pairs_mut()
            .append_pair("width", &request.width.to_string())
            .append_pair("height", &request.height.to_string())
            .append_pair("nologo", if request.nologo { "true" } else { "false" })
            .append_pair("seed", &seed.to_string());
        url
    }

    /// Generates an image URL for the request.
    ///
    /// The URL is checked with a HEAD request, retrying with exponential
    /// backoff. When every check fails the constructed URL is still
    /// returned with `validated == false`; whoever renders it gets the final
    /// say on whether it loads.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # async fn demo(client: mimesis_pollinations::Client) {
    /// use mimesis_pollinations::ImageRequest;
    ///
    /// let request = ImageRequest::new("a lighthouse at dusk")
    ///     .with_size(768, 1024)
    ///     .with_seed(42);
    /// let image = client.image().generate(&request).await;
    /// println!("{}", image.url);
    /// # }
    /// ```
    pub async fn generate(&self, request: &ImageRequest) -> ImageUrl {
        let seed = request
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen_range(0..DEFAULT_SEED_RANGE));
        let url = self.build_url(request, seed);
        let timeout = request.timeout.map(|t| t.min(MAX_TIMEOUT));
        let policy = match request.max_retries {
            Some(max_retries) => RetryPolicy {
                max_retries,
                ..self.retry
            },
            None => self.retry,
        };

        let mut attempts = 0;
        let checked = policy
            .retry(
                |attempt| {
                    attempts = attempt + 1;
                    let url = &url;
                    async move {
                        let result = self.http.probe(url, timeout).await;
                        if let Err(e) = &result {
                            warn!(
                                attempt = attempt + 1,
                                max = policy.attempts(),
                                error = %e,
                                "could not validate image url"
                            );
                        }
                        result
                    }
                },
                |_| true,
            )
            .await;

        match checked {
            Ok(final_url) => {
                debug!(url = %final_url, attempts, "image url validated");
                ImageUrl {
                    url: final_url.to_string(),
                    seed,
                    validated: true,
                    attempts,
                }
            }
            Err(_) => ImageUrl {
                url: url.to_string(),
                seed,
                validated: false,
                attempts,
            },
        }
    }

    /// Downloads the bytes behind an image URL.
    pub async fn download(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)?;
        self.http.get_bytes(&url).await
    }
}

// ==================== Request/Response Types ====================

/// Request for image generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRequest {
    /// Image description.
    pub prompt: String,

    /// Width in pixels.
    #[serde(default = "default_size")]
    pub width: u32,

    /// Height in pixels.
    #[serde(default = "default_size")]
    pub height: u32,

    /// Ask the host to omit its watermark.
    #[serde(default = "default_nologo")]
    pub nologo: bool,

    /// Seed; a random one is picked when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Per-attempt timeout, capped at [`MAX_TIMEOUT`].
    #[serde(skip)]
    pub timeout: Option<Duration>,

    /// Overrides the client's retry count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

fn default_size() -> u32 {
    DEFAULT_IMAGE_SIZE
}

fn default_nologo() -> bool {
    true
}

impl ImageRequest {
    /// Creates a request with the default size and no watermark.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            nologo: true,
            seed: None,
            timeout: None,
            max_retries: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }
}

/// A resolved image location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// Image URL; never empty.
    pub url: String,
    /// Seed embedded in the URL.
    pub seed: u64,
    /// Whether the host confirmed the URL.
    pub validated: bool,
    /// Number of existence checks issued.
    pub attempts: u32,
}
