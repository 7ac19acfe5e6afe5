//! HTTP client implementation for the Pollinations hosts.

use std::time::Duration;

use bytes::Bytes;
use reqwest::{
    header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA, USER_AGENT},
    Client as ReqwestClient, Response,
};
use url::Url;

use super::error::{Error, Result};

/// Longest error body excerpt carried in a status error.
const ERROR_BODY_LIMIT: usize = 256;

/// HTTP client for the Pollinations hosts.
pub struct HttpClient {
    client: ReqwestClient,
    timeout: Duration,
}

impl HttpClient {
    /// Creates a new HTTP client with a default per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ReqwestClient::builder()
            .default_headers(Self::default_headers())
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Returns the default per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issues a lightweight existence check against `url`.
    ///
    /// Returns the final URL after redirects when the host answers 2xx.
    pub async fn probe(&self, url: &Url, timeout: Option<Duration>) -> Result<Url> {
        let response = self
            .client
            .head(url.clone())
            .timeout(timeout.unwrap_or(self.timeout))
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .header(PRAGMA, HeaderValue::from_static("no-cache"))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::status(response.status().as_u16(), "existence check failed"));
        }

        Ok(response.url().clone())
    }

    /// Performs a GET request and returns the body as text.
    pub async fn get_text(&self, url: &Url, timeout: Option<Duration>) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout.unwrap_or(self.timeout))
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.text().await?)
    }

    /// Performs a GET request and returns the raw body.
    pub async fn get_bytes(&self, url: &Url) -> Result<Bytes> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await?;

        let response = Self::check_status(response).await?;
        Ok(response.bytes().await?)
    }

    /// Converts a non-success response into a status error.
    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let mut message = body.trim().to_string();
        if message.len() > ERROR_BODY_LIMIT {
            let mut end = ERROR_BODY_LIMIT;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        if message.is_empty() {
            message = status.canonical_reason().unwrap_or("request failed").to_string();
        }

        Err(Error::status(status.as_u16(), message))
    }

    /// Returns default headers for requests.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("mimesis-rust/", env!("CARGO_PKG_VERSION"))),
        );
        headers
    }
}

/// Appends path segments to `host`, percent-encoding each one.
///
/// `host` must be a base-capable URL; the client builder rejects any other.
pub(crate) fn join_segments(host: &Url, segments: &[&str]) -> Url {
    let mut url = host.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    url
}
