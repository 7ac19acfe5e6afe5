//! Pollinations API client.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::{
    error::{Error, Result},
    http::HttpClient,
    image::ImageService,
    retry::RetryPolicy,
    text::TextService,
};

/// Default image host.
pub const DEFAULT_IMAGE_HOST: &str = "https://image.pollinations.ai";

/// Default text host.
pub const DEFAULT_TEXT_HOST: &str = "https://text.pollinations.ai";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Largest per-request timeout a caller may ask for.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(30);

/// Pollinations API client.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```rust,no_run
/// use mimesis_pollinations::Client;
///
/// let client = Client::builder()
///     .image_host("https://image.pollinations.ai")
///     .build()?;
/// # Ok::<(), mimesis_pollinations::Error>(())
/// ```
#[derive(Clone)]
pub struct Client {
    http: Arc<HttpClient>,
    config: ClientConfig,
}

/// Client configuration.
#[derive(Clone)]
struct ClientConfig {
    image_host: Url,
    text_host: Url,
    retry: RetryPolicy,
}

impl Client {
    /// Creates a client against the public hosts.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    /// Creates a new client builder for more configuration options.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns the configured image host.
    pub fn image_host(&self) -> &Url {
        &self.config.image_host
    }

    /// Returns the configured text host.
    pub fn text_host(&self) -> &Url {
        &self.config.text_host
    }

    /// Returns the retry policy applied to every service.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.config.retry
    }

    /// Returns the image generation service.
    pub fn image(&self) -> ImageService {
        ImageService::new(
            self.http.clone(),
            self.config.image_host.clone(),
            self.config.retry,
        )
    }

    /// Returns the text generation service.
    pub fn text(&self) -> TextService {
        TextService::new(
            self.http.clone(),
            self.config.text_host.clone(),
            self.config.retry,
        )
    }

    /// Returns a reference to the internal HTTP client.
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }
}

/// Builder for creating a Pollinations client.
pub struct ClientBuilder {
    image_host: String,
    text_host: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            image_host: DEFAULT_IMAGE_HOST.to_string(),
            text_host: DEFAULT_TEXT_HOST.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the image host.
    pub fn image_host(mut self, url: impl Into<String>) -> Self {
        self.image_host = url.into();
        self
    }

    /// Sets the text host.
    pub fn text_host(mut self, url: impl Into<String>) -> Self {
        self.text_host = url.into();
        self
    }

    /// Sets the default per-request timeout. Values above
    /// [`MAX_TIMEOUT`] are capped.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_TIMEOUT);
        self
    }

    /// Sets the maximum number of retries for failed requests.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.retry.max_retries = retries;
        self
    }

    /// Replaces the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        if self.timeout.is_zero() {
            return Err(Error::Config("timeout must be positive".to_string()));
        }

        let image_host = parse_host("image_host", &self.image_host)?;
        let text_host = parse_host("text_host", &self.text_host)?;
        let http = HttpClient::new(self.timeout)?;

        Ok(Client {
            http: Arc::new(http),
            config: ClientConfig {
                image_host,
                text_host,
                retry: self.retry,
            },
        })
    }
}

fn parse_host(name: &str, raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        return Err(Error::Config(format!("{name} must be non-empty")));
    }
    let url = Url::parse(raw.trim())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(Error::Config(format!("{name} must be an http(s) url: {raw}")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = Client::new().unwrap();
        assert_eq!(client.image_host().as_str(), "https://image.pollinations.ai/");
        assert_eq!(client.text_host().as_str(), "https://text.pollinations.ai/");
        assert_eq!(client.retry_policy(), RetryPolicy::default());
        assert_eq!(client.http().timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_builder_caps_timeout() {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap();
        assert_eq!(client.http().timeout(), MAX_TIMEOUT);
    }

    #[test]
    fn test_builder_rejects_bad_hosts() {
        assert!(matches!(
            Client::builder().image_host("").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Client::builder().text_host("mailto:someone@example.com").build(),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Client::builder().image_host("not a url").build(),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_build_url_layout() {
        let client = Client::new().unwrap();
        let request = crate::ImageRequest::new("a red fox in snow").with_size(512, 512);
        let url = client.image().build_url(&request, 42);
        assert_eq!(
            url.as_str(),
            "https://image.pollinations.ai/prompt/a%20red%20fox%20in%20snow?width=512&height=512&nologo=true&seed=42"
        );
    }
}
