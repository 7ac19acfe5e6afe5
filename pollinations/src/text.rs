//! Text generation service.

use std::sync::Arc;

use url::Url;

use super::{
    error::{Error, Result},
    http::{join_segments, HttpClient},
    retry::RetryPolicy,
};

/// Text generation service.
pub struct TextService {
    http: Arc<HttpClient>,
    host: Url,
    retry: RetryPolicy,
}

impl TextService {
    pub(crate) fn new(http: Arc<HttpClient>, host: Url, retry: RetryPolicy) -> Self {
        Self { http, host, retry }
    }

    /// Builds the request URL for a prompt: `GET {host}/{prompt}`.
    pub fn build_url(&self, prompt: &str) -> Url {
        join_segments(&self.host, &[prompt])
    }

    /// Generates plain text for `prompt`.
    ///
    /// Transient failures (timeouts, connection errors, 429 and 5xx) are
    /// retried under the client's policy; anything else is returned at once.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.build_url(prompt);

        let text = self
            .retry
            .retry(
                |_| self.http.get_text(&url, None),
                Error::is_retryable,
            )
            .await?;

        if text.trim().is_empty() {
            return Err(Error::EmptyResponse);
        }
        Ok(text)
    }
}
