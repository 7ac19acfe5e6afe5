//! Error types for the studio.

use thiserror::Error;

/// Result type alias for studio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for studio operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No image with this id exists in the repository.
    #[error("image not found: {0}")]
    NotFound(String),

    /// A generation was requested with a blank prompt.
    #[error("prompt is empty")]
    EmptyPrompt,

    /// A generation run is already in flight.
    #[error("a generation run is already in progress")]
    RunInProgress,

    /// A custom size failed validation.
    #[error("invalid {field}: {message}")]
    InvalidSize {
        field: &'static str,
        message: String,
    },

    /// Image source failure for a single variation.
    #[error("image source: {0}")]
    Source(String),

    /// Pollinations API error.
    #[error("pollinations: {0}")]
    Pollinations(#[from] mimesis_pollinations::Error),

    /// Persistent storage error.
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns true if the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub(crate) fn storage(e: impl std::fmt::Display) -> Self {
        Error::Storage(e.to_string())
    }
}
