//! Visual style presets appended to every generation prompt.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the fixed visual styles a run renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Style {
    #[serde(rename = "realistic", alias = "photographic")]
    Photographic,
    #[serde(rename = "digital", alias = "digital art", alias = "digital-art")]
    DigitalArt,
    #[serde(rename = "cinematic")]
    Cinematic,
    #[serde(rename = "anime")]
    Anime,
}

/// Static data attached to a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleInfo {
    /// Stable identifier stored with persisted images.
    pub id: &'static str,
    /// Human readable label.
    pub label: &'static str,
    pub icon: &'static str,
    /// Text appended to the base prompt.
    pub suffix: &'static str,
}

impl Style {
    /// All styles in the order a run renders them.
    pub const ALL: [Style; 4] = [
        Style::Photographic,
        Style::DigitalArt,
        Style::Cinematic,
        Style::Anime,
    ];

    pub fn info(self) -> &'static StyleInfo {
        match self {
            Style::Photographic => &PHOTOGRAPHIC,
            Style::DigitalArt => &DIGITAL_ART,
            Style::Cinematic => &CINEMATIC,
            Style::Anime => &ANIME,
        }
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn icon(self) -> &'static str {
        self.info().icon
    }

    pub fn suffix(self) -> &'static str {
        self.info().suffix
    }

    /// Looks a style up by id or label, ignoring case.
    pub fn from_id(value: &str) -> Option<Style> {
        match value.trim().to_lowercase().as_str() {
            "realistic" | "photographic" => Some(Style::Photographic),
            "digital" | "digital art" | "digital-art" | "digital_art" => Some(Style::DigitalArt),
            "cinematic" => Some(Style::Cinematic),
            "anime" => Some(Style::Anime),
            _ => None,
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::from_id(s).ok_or_else(|| format!("unknown style: {s}"))
    }
}

const PHOTOGRAPHIC: StyleInfo = StyleInfo {
    id: "realistic",
    label: "Photographic",
    icon: "📷",
    suffix: "ultra realistic 8k photography, professional lighting, RAW photo, highly detailed",
};

const DIGITAL_ART: StyleInfo = StyleInfo {
    id: "digital",
    label: "Digital Art",
    icon: "🎨",
    suffix: "digital painting, highly detailed, fantasy concept art, trending on artstation, octane render, unreal engine 5",
};

const CINEMATIC: StyleInfo = StyleInfo {
    id: "cinematic",
    label: "Cinematic",
    icon: "🎬",
    suffix: "cinematic lighting, movie scene, dramatic atmosphere, depth of field, 35mm film",
};

const ANIME: StyleInfo = StyleInfo {
    id: "anime",
    label: "Anime",
    icon: "🎯",
    suffix: "anime style, high quality anime art, studio ghibli, detailed anime illustration, vibrant anime colors, anime key visual",
};
