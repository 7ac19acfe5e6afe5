//! Error types for the Pollinations API client.

use thiserror::Error;

/// Result type alias for Pollinations operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Pollinations API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The host answered with a non-success status.
    #[error("pollinations: status {status}: {message}")]
    Status { status: u16, message: String },

    /// HTTP request error (connection, timeout, body decoding).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The host answered with an empty body where text was expected.
    #[error("empty response")]
    EmptyResponse,

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a new status error.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Error::Status {
            status,
            message: message.into(),
        }
    }

    /// Returns the HTTP status if the error carries one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if this is a rate limit error.
    pub fn is_rate_limit(&self) -> bool {
        self.http_status() == Some(429)
    }

    /// Returns true if this is a server-side error.
    pub fn is_server_error(&self) -> bool {
        matches!(self.http_status(), Some(s) if s >= 500)
    }

    /// Returns true if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_timeout())
    }

    /// Returns true if the connection could not be established.
    pub fn is_connect(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_connect())
    }

    /// Returns true if the request can be retried.
    pub fn is_retryable(&self) -> bool {
        self.is_rate_limit() || self.is_server_error() || self.is_timeout() || self.is_connect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(Error::status(429, "slow down").is_rate_limit());
        assert!(Error::status(503, "busy").is_server_error());
        assert!(Error::status(502, "bad gateway").is_retryable());
        assert!(!Error::status(404, "missing").is_retryable());
        assert!(!Error::Config("bad".into()).is_retryable());
        assert_eq!(Error::status(418, "teapot").http_status(), Some(418));
    }
}
