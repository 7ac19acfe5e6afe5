//! Durable image records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::style::Style;

/// A saved image as owned by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl PersistedImage {
    /// Creates a record for `image` with a fresh id.
    pub fn create(image: NewImage, created_at: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: image.url,
            prompt: image.prompt,
            style: image.style,
            width: image.width,
            height: image.height,
            is_favorite: false,
            created_at,
        }
    }
}

/// Input for creating a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewImage {
    pub url: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
    pub width: u32,
    pub height: u32,
}
