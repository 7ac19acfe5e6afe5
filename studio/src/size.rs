//! Output sizes: presets, custom input validation and the committed selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Smallest accepted custom dimension.
pub const MIN_SIZE: u32 = 64;
/// Largest accepted custom width.
pub const MAX_WIDTH: u32 = 1704;
/// Largest accepted custom height.
pub const MAX_HEIGHT: u32 = 960;

/// Label of a committed custom size.
pub const CUSTOM_LABEL: &str = "Custom";

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Built-in sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    #[default]
    Landscape,
    Square,
    Portrait,
    Desktop,
    Mobile,
}

impl SizePreset {
    pub const ALL: [SizePreset; 5] = [
        SizePreset::Landscape,
        SizePreset::Square,
        SizePreset::Portrait,
        SizePreset::Desktop,
        SizePreset::Mobile,
    ];

    pub fn size(self) -> ImageSize {
        match self {
            SizePreset::Landscape => ImageSize::new(1280, 720),
            SizePreset::Square => ImageSize::new(512, 512),
            SizePreset::Portrait => ImageSize::new(768, 1024),
            SizePreset::Desktop => ImageSize::new(1704, 960),
            SizePreset::Mobile => ImageSize::new(960, 1704),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SizePreset::Landscape => "Landscape",
            SizePreset::Square => "Square",
            SizePreset::Portrait => "Portrait",
            SizePreset::Desktop => "Desktop",
            SizePreset::Mobile => "Mobile",
        }
    }
}

impl FromStr for SizePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SizePreset::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown size preset: {s}"))
    }
}

/// Which custom size field a message refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    Width,
    Height,
}

impl SizeField {
    pub fn name(self) -> &'static str {
        match self {
            SizeField::Width => "width",
            SizeField::Height => "height",
        }
    }
}

/// Validates one custom dimension as typed by the user.
///
/// Returns the field-level message shown next to the input on failure.
pub fn validate_dimension(value: &str, field: SizeField) -> std::result::Result<u32, String> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Please enter a valid number".to_string());
    }
    // All digits: a parse failure can only mean overflow.
    let num = value.parse::<u64>().unwrap_or(u64::MAX);
    if num < u64::from(MIN_SIZE) {
        return Err(format!("Minimum size is {MIN_SIZE}px"));
    }
    match field {
        SizeField::Width if num > u64::from(MAX_WIDTH) => {
            Err(format!("Maximum width is {MAX_WIDTH}px"))
        }
        SizeField::Height if num > u64::from(MAX_HEIGHT) => {
            Err(format!("Maximum height is {MAX_HEIGHT}px"))
        }
        _ => Ok(num as u32),
    }
}

/// Validates a complete custom size.
pub fn validate_size(width: u32, height: u32) -> Result<ImageSize> {
    for (field, value) in [(SizeField::Width, width), (SizeField::Height, height)] {
        validate_dimension(&value.to_string(), field).map_err(|message| Error::InvalidSize {
            field: field.name(),
            message,
        })?;
    }
    Ok(ImageSize::new(width, height))
}

/// Two text fields for a custom size, validated when a field loses focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomSizeInput {
    width: String,
    height: String,
    width_error: Option<String>,
    height_error: Option<String>,
}

impl CustomSizeInput {
    pub fn new(initial: ImageSize) -> Self {
        Self {
            width: initial.width.to_string(),
            height: initial.height.to_string(),
            width_error: None,
            height_error: None,
        }
    }

    pub fn width(&self) -> &str {
        &self.width
    }

    pub fn height(&self) -> &str {
        &self.height
    }

    pub fn width_error(&self) -> Option<&str> {
        self.width_error.as_deref()
    }

    pub fn height_error(&self) -> Option<&str> {
        self.height_error.as_deref()
    }

    /// Replaces the width text, keeping digits only.
    pub fn set_width(&mut self, raw: &str) {
        self.width = digits(raw);
    }

    /// Replaces the height text, keeping digits only.
    pub fn set_height(&mut self, raw: &str) {
        self.height = digits(raw);
    }

    /// Validates the width field. Returns the size to commit when both
    /// fields are usable.
    pub fn blur_width(&mut self) -> Option<ImageSize> {
        self.blur(SizeField::Width)
    }

    /// Validates the height field. Returns the size to commit when both
    /// fields are usable.
    pub fn blur_height(&mut self) -> Option<ImageSize> {
        self.blur(SizeField::Height)
    }

    fn blur(&mut self, field: SizeField) -> Option<ImageSize> {
        let (value, other, other_field) = match field {
            SizeField::Width => (&self.width, &self.height, SizeField::Height),
            SizeField::Height => (&self.height, &self.width, SizeField::Width),
        };
        let result = validate_dimension(value, field);
        // The other field may hold unblurred text, so it is checked again
        // here. A new error for it is only shown once it loses focus itself.
        let other_result = if other.is_empty() {
            None
        } else {
            validate_dimension(other, other_field).ok()
        };
        let committed = match (&result, other_result) {
            (Ok(value), Some(other)) => Some(match field {
                SizeField::Width => ImageSize::new(*value, other),
                SizeField::Height => ImageSize::new(other, *value),
            }),
            _ => None,
        };
        let error = result.err();
        let other_valid = other_result.is_some();
        let (own_error, other_error) = match field {
            SizeField::Width => (&mut self.width_error, &mut self.height_error),
            SizeField::Height => (&mut self.height_error, &mut self.width_error),
        };
        *own_error = error;
        if other_valid {
            *other_error = None;
        }
        committed
    }
}

fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The size the next run will use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSize {
    pub size: ImageSize,
    pub label: String,
}

impl From<SizePreset> for SelectedSize {
    fn from(preset: SizePreset) -> Self {
        Self {
            size: preset.size(),
            label: preset.label().to_string(),
        }
    }
}

/// Size picker state: a preset list plus the custom input.
#[derive(Debug, Clone)]
pub struct SizeSelector {
    selected: SelectedSize,
    custom: CustomSizeInput,
}

impl Default for SizeSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeSelector {
    /// Starts on the default preset with a 512×512 custom size.
    pub fn new() -> Self {
        Self {
            selected: SizePreset::default().into(),
            custom: CustomSizeInput::new(SizePreset::Square.size()),
        }
    }

    pub fn selected(&self) -> &SelectedSize {
        &self.selected
    }

    pub fn size(&self) -> ImageSize {
        self.selected.size
    }

    pub fn custom(&self) -> &CustomSizeInput {
        &self.custom
    }

    pub fn select_preset(&mut self, preset: SizePreset) {
        self.selected = preset.into();
    }

    pub fn set_custom_width(&mut self, raw: &str) {
        self.custom.set_width(raw);
    }

    pub fn set_custom_height(&mut self, raw: &str) {
        self.custom.set_height(raw);
    }

    /// Validates the custom width and commits the custom size on success.
    pub fn blur_custom_width(&mut self) -> Option<ImageSize> {
        let committed = self.custom.blur_width();
        self.commit(committed)
    }

    /// Validates the custom height and commits the custom size on success.
    pub fn blur_custom_height(&mut self) -> Option<ImageSize> {
        let committed = self.custom.blur_height();
        self.commit(committed)
    }

    fn commit(&mut self, size: Option<ImageSize>) -> Option<ImageSize> {
        let size = size?;
        self.selected = SelectedSize {
            size,
            label: CUSTOM_LABEL.to_string(),
        };
        Some(size)
    }
}
