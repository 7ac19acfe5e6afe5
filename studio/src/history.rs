//! History sets and gallery filters over saved images.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::PersistedImage;
use crate::style::Style;

/// Number of most recent images the history shows.
pub const HISTORY_LIMIT: usize = 32;

/// Images per set, one run's worth of styles.
pub const SET_SIZE: usize = 4;

/// Up to [`SET_SIZE`] consecutive images, grouped by position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSet {
    /// Position of the set in the history, starting at 0.
    pub index: usize,
    pub images: Vec<PersistedImage>,
}

impl ImageSet {
    pub fn contains(&self, id: &str) -> bool {
        self.images.iter().any(|img| img.id == id)
    }

    pub fn has_favorite(&self) -> bool {
        self.images.iter().any(|img| img.is_favorite)
    }

    pub fn ids(&self) -> Vec<String> {
        self.images.iter().map(|img| img.id.clone()).collect()
    }
}

/// Groups the most recent images into sets.
pub fn image_sets(images: &[PersistedImage]) -> Vec<ImageSet> {
    let recent = &images[..images.len().min(HISTORY_LIMIT)];
    recent
        .chunks(SET_SIZE)
        .enumerate()
        .map(|(index, chunk)| ImageSet {
            index,
            images: chunk.to_vec(),
        })
        .collect()
}

/// Finds the history set holding `id`.
pub fn set_containing(images: &[PersistedImage], id: &str) -> Option<ImageSet> {
    image_sets(images).into_iter().find(|set| set.contains(id))
}

/// History filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFilter {
    #[default]
    All,
    /// Sets with at least one favorite.
    Favorites,
}

impl HistoryFilter {
    pub fn apply(self, sets: Vec<ImageSet>) -> Vec<ImageSet> {
        match self {
            HistoryFilter::All => sets,
            HistoryFilter::Favorites => sets.into_iter().filter(ImageSet::has_favorite).collect(),
        }
    }
}

/// Gallery page filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleFilter {
    #[default]
    All,
    Style(Style),
}

impl StyleFilter {
    /// Filters in display order.
    pub fn all() -> Vec<StyleFilter> {
        std::iter::once(StyleFilter::All)
            .chain(
                [Style::Photographic, Style::DigitalArt, Style::Anime, Style::Cinematic]
                    .into_iter()
                    .map(StyleFilter::Style),
            )
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            StyleFilter::All => "All",
            StyleFilter::Style(style) => style.label(),
        }
    }

    pub fn matches(self, image: &PersistedImage) -> bool {
        match self {
            StyleFilter::All => true,
            StyleFilter::Style(style) => image.style == Some(style),
        }
    }

    pub fn apply(self, images: &[PersistedImage]) -> Vec<PersistedImage> {
        images.iter().filter(|img| self.matches(img)).cloned().collect()
    }
}

impl fmt::Display for StyleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StyleFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StyleFilter::All);
        }
        Style::from_id(s)
            .map(StyleFilter::Style)
            .ok_or_else(|| format!("unknown style filter: {s}"))
    }
}

/// Every filter with the number of images it matches.
pub fn style_counts(images: &[PersistedImage]) -> Vec<(StyleFilter, usize)> {
    StyleFilter::all()
        .into_iter()
        .map(|filter| (filter, images.iter().filter(|img| filter.matches(img)).count()))
        .collect()
}
