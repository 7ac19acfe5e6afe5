//! Transient user-facing notices.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual weight of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    #[default]
    Default,
    Destructive,
}

/// A short message reporting the outcome of a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }

    pub fn is_error(&self) -> bool {
        self.variant == NoticeVariant::Destructive
    }

    pub fn refreshed() -> Self {
        Self::info("Refreshed", "Image history has been updated")
    }

    pub fn refresh_failed() -> Self {
        Self::error("Error", "Failed to load images")
    }

    pub fn saved() -> Self {
        Self::info("Saved", "Images saved to history")
    }

    pub fn save_failed() -> Self {
        Self::error("Error", "Failed to save images")
    }

    pub fn favorite_updated() -> Self {
        Self::info("Success", "Updated favorite status")
    }

    pub fn favorite_failed() -> Self {
        Self::error("Error", "Failed to update favorite status")
    }

    pub fn set_deleted() -> Self {
        Self::info("Success", "Image set deleted successfully")
    }

    pub fn image_deleted() -> Self {
        Self::info("Success", "Image deleted successfully")
    }

    pub fn delete_failed() -> Self {
        Self::error("Error", "Failed to delete image")
    }

    pub fn enhancing() -> Self {
        Self::info("Enhancing Prompt", "Creating detailed image generation prompt...")
    }

    pub fn enhanced() -> Self {
        Self::info(
            "Prompt Enhanced",
            "Your prompt has been optimized for image generation",
        )
    }

    pub fn enhancement_failed() -> Self {
        Self::error(
            "Enhancement Failed",
            "Could not enhance the prompt. Please try again.",
        )
    }

    pub fn variation_failed(label: &str) -> Self {
        Self::error(
            format!("{label} Generation Failed"),
            "Will retry automatically...",
        )
    }

    pub fn generation_failed() -> Self {
        Self::error(
            "Generation Failed",
            "Failed to generate images. Please try again.",
        )
    }

    pub fn download_started(label: &str) -> Self {
        Self::info("Download Started", format!("Downloading {label} version"))
    }

    pub fn download_failed() -> Self {
        Self::error(
            "Download Failed",
            "Could not download the image. Please try again.",
        )
    }

    pub fn copied() -> Self {
        Self::info("Copied", "Prompt copied to clipboard")
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
