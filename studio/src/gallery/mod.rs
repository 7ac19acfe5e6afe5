//! Gallery viewer: navigation, zoom, rotation, fullscreen and slideshow.
//!
//! [`GalleryViewer`] holds view state only. Actions that reach outside the
//! viewer (closing it, fullscreen, downloads, favorites, clipboard) come
//! back as [`ViewerEffect`]s for the host to carry out.

mod slideshow;

pub use slideshow::{camera_at, smoothstep, Camera, KeyframePair, Slideshow, SLIDE_INTERVAL};

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::download::{gallery_filename, generated_filename};
use crate::generation::{GeneratedImage, VariationStatus};
use crate::record::PersistedImage;
use crate::style::Style;

/// Zoom limits and step, in tenths.
const MIN_SCALE: u8 = 5;
const MAX_SCALE: u8 = 30;
const UNIT_SCALE: u8 = 10;

/// An image shown by the viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    /// Set for saved images only.
    pub id: Option<String>,
    pub url: String,
    pub prompt: Option<String>,
    pub style: Option<Style>,
    /// Variation label for images that are not saved yet.
    pub label: Option<String>,
    pub is_favorite: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl From<&PersistedImage> for GalleryItem {
    fn from(image: &PersistedImage) -> Self {
        Self {
            id: Some(image.id.clone()),
            url: image.url.clone(),
            prompt: Some(image.prompt.clone()),
            style: image.style,
            label: None,
            is_favorite: image.is_favorite,
            width: Some(image.width),
            height: Some(image.height),
        }
    }
}

impl From<&GeneratedImage> for GalleryItem {
    fn from(image: &GeneratedImage) -> Self {
        Self {
            id: None,
            url: image.url.clone(),
            prompt: Some(image.prompt.clone()),
            style: Some(image.style),
            label: Some(image.label.clone()),
            is_favorite: false,
            width: None,
            height: None,
        }
    }
}

impl GalleryItem {
    /// Items for the succeeded variations of a run.
    pub fn from_run(images: &[GeneratedImage]) -> Vec<GalleryItem> {
        images
            .iter()
            .filter(|img| img.status() == VariationStatus::Succeeded)
            .map(GalleryItem::from)
            .collect()
    }

    /// File name to save this image under.
    pub fn filename(&self, unix_millis: i64) -> String {
        match (&self.id, &self.label) {
            (Some(id), _) => gallery_filename(id, self.style),
            (None, label) => generated_filename(
                self.prompt.as_deref().unwrap_or_default(),
                label.as_deref().unwrap_or("generated"),
                unix_millis,
            ),
        }
    }
}

/// Quarter-turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Clockwise by 90°.
    pub fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl Serialize for Rotation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.degrees())
    }
}

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    ArrowLeft,
    ArrowRight,
    Escape,
}

/// Work the host performs on behalf of the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEffect {
    Close,
    RequestFullscreen,
    ExitFullscreen,
    Download { url: String, filename: String },
    ToggleFavorite { id: String },
    CopyPrompt(String),
}

/// Serializable view of the viewer, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    pub index: usize,
    pub total: usize,
    pub counter: String,
    pub zoom_percent: u32,
    pub rotation: Rotation,
    pub pan: (f64, f64),
    pub is_fullscreen: bool,
    pub is_slideshow_active: bool,
    pub camera: Camera,
    pub item: Option<GalleryItem>,
}

/// Navigable image viewer.
#[derive(Debug, Clone)]
pub struct GalleryViewer {
    items: Vec<GalleryItem>,
    index: usize,
    scale: u8,
    rotation: Rotation,
    pan: (f64, f64),
    fullscreen: bool,
    open: bool,
    slideshow: Slideshow,
}

impl GalleryViewer {
    /// Opens the viewer at `start`, clamped to the last item.
    pub fn new(items: Vec<GalleryItem>, start: usize) -> Self {
        Self::with_slideshow(items, start, Slideshow::new(rand::random()))
    }

    pub fn with_slideshow(items: Vec<GalleryItem>, start: usize, slideshow: Slideshow) -> Self {
        let index = start.min(items.len().saturating_sub(1));
        Self {
            items,
            index,
            scale: UNIT_SCALE,
            rotation: Rotation::Deg0,
            pan: (0.0, 0.0),
            fullscreen: false,
            open: true,
            slideshow,
        }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&GalleryItem> {
        self.items.get(self.index)
    }

    pub fn scale(&self) -> f64 {
        f64::from(self.scale) / 10.0
    }

    pub fn zoom_percent(&self) -> u32 {
        u32::from(self.scale) * 10
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn pan(&self) -> (f64, f64) {
        self.pan
    }

    pub fn slideshow(&self) -> &Slideshow {
        &self.slideshow
    }

    pub fn is_slideshow_active(&self) -> bool {
        self.slideshow.is_active()
    }

    /// Position counter, `N / M`.
    pub fn counter(&self) -> String {
        if self.items.is_empty() {
            return "0 / 0".to_string();
        }
        format!("{} / {}", self.index + 1, self.items.len())
    }

    pub fn state(&self) -> ViewerState {
        ViewerState {
            index: self.index,
            total: self.items.len(),
            counter: self.counter(),
            zoom_percent: self.zoom_percent(),
            rotation: self.rotation,
            pan: self.pan,
            is_fullscreen: self.fullscreen,
            is_slideshow_active: self.slideshow.is_active(),
            camera: self.slideshow.camera(),
            item: self.current().cloned(),
        }
    }

    /// Replaces the items, keeping the index in range.
    pub fn set_items(&mut self, items: Vec<GalleryItem>) {
        self.items = items;
        self.index = self.index.min(self.items.len().saturating_sub(1));
    }

    /// Next image, wrapping to the first.
    pub fn next(&mut self) {
        if !self.items.is_empty() {
            self.index = (self.index + 1) % self.items.len();
        }
    }

    /// Previous image, wrapping to the last.
    pub fn prev(&mut self) {
        if !self.items.is_empty() {
            self.index = self.index.checked_sub(1).unwrap_or(self.items.len() - 1);
        }
    }

    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + 1).min(MAX_SCALE);
    }

    /// Zooms out one step and recenters the image.
    pub fn zoom_out(&mut self) {
        self.scale = self.scale.saturating_sub(1).max(MIN_SCALE);
        self.pan = (0.0, 0.0);
    }

    /// Mouse wheel. Only zooms while ctrl is held; returns whether the event
    /// was consumed.
    pub fn wheel(&mut self, delta_y: f64, ctrl: bool) -> bool {
        if !ctrl {
            return false;
        }
        if delta_y > 0.0 {
            self.zoom_out();
        } else {
            self.zoom_in();
        }
        true
    }

    /// Drags the image. Only possible while zoomed in.
    pub fn drag(&mut self, dx: f64, dy: f64) {
        if self.scale > UNIT_SCALE {
            self.pan = (self.pan.0 + dx, self.pan.1 + dy);
        }
    }

    pub fn rotate(&mut self) {
        self.rotation = self.rotation.next();
    }

    pub fn toggle_fullscreen(&mut self) -> ViewerEffect {
        self.fullscreen = !self.fullscreen;
        if self.fullscreen {
            ViewerEffect::RequestFullscreen
        } else {
            ViewerEffect::ExitFullscreen
        }
    }

    pub fn copy_prompt(&self) -> Option<ViewerEffect> {
        let prompt = self.current()?.prompt.as_ref()?;
        Some(ViewerEffect::CopyPrompt(prompt.clone()))
    }

    pub fn download(&self) -> Option<ViewerEffect> {
        let item = self.current()?;
        Some(ViewerEffect::Download {
            url: item.url.clone(),
            filename: item.filename(Utc::now().timestamp_millis()),
        })
    }

    /// Asks the host to flip the favorite flag; saved images only.
    pub fn toggle_favorite(&self) -> Option<ViewerEffect> {
        let id = self.current()?.id.clone()?;
        Some(ViewerEffect::ToggleFavorite { id })
    }

    /// Mirrors a favorite change the host has completed.
    pub fn set_favorite(&mut self, id: &str, is_favorite: bool) {
        for item in &mut self.items {
            if item.id.as_deref() == Some(id) {
                item.is_favorite = is_favorite;
            }
        }
    }

    pub fn key(&mut self, key: ViewerKey) -> Vec<ViewerEffect> {
        match key {
            ViewerKey::ArrowLeft => {
                self.prev();
                Vec::new()
            }
            ViewerKey::ArrowRight => {
                self.next();
                Vec::new()
            }
            ViewerKey::Escape if self.slideshow.is_active() => self.stop_slideshow(),
            ViewerKey::Escape => self.close(),
        }
    }

    /// Starts the slideshow at `now` and goes fullscreen.
    pub fn start_slideshow(&mut self, now: Duration) -> Vec<ViewerEffect> {
        if self.items.is_empty() {
            return Vec::new();
        }
        self.slideshow.start(now);
        if self.fullscreen {
            return Vec::new();
        }
        self.fullscreen = true;
        vec![ViewerEffect::RequestFullscreen]
    }

    /// Stops the slideshow and resets pan, zoom and rotation.
    pub fn stop_slideshow(&mut self) -> Vec<ViewerEffect> {
        if !self.slideshow.is_active() {
            return Vec::new();
        }
        self.slideshow.stop();
        self.scale = UNIT_SCALE;
        self.rotation = Rotation::Deg0;
        self.pan = (0.0, 0.0);
        if !self.fullscreen {
            return Vec::new();
        }
        self.fullscreen = false;
        vec![ViewerEffect::ExitFullscreen]
    }

    /// Drives the slideshow; advances one image per finished slide.
    pub fn tick(&mut self, now: Duration) {
        for _ in 0..self.slideshow.tick(now) {
            self.next();
        }
    }

    /// Closes the viewer, stopping any slideshow first.
    pub fn close(&mut self) -> Vec<ViewerEffect> {
        let mut effects = self.stop_slideshow();
        if self.fullscreen {
            self.fullscreen = false;
            effects.push(ViewerEffect::ExitFullscreen);
        }
        self.open = false;
        effects.push(ViewerEffect::Close);
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<GalleryItem> {
        (0..n)
            .map(|i| GalleryItem {
                id: Some(format!("id{i}")),
                url: format!("https://img.test/{i}"),
                prompt: Some(format!("prompt {i}")),
                style: Some(Style::Anime),
                label: None,
                is_favorite: false,
                width: Some(512),
                height: Some(512),
            })
            .collect()
    }

    fn viewer(n: usize, start: usize) -> GalleryViewer {
        GalleryViewer::with_slideshow(items(n), start, Slideshow::new(5))
    }

    #[test]
    fn test_navigation_wraps() {
        let mut v = viewer(3, 0);
        v.prev();
        assert_eq!(v.index(), 2);
        v.next();
        assert_eq!(v.index(), 0);

        v.key(ViewerKey::ArrowLeft);
        assert_eq!(v.index(), 2);
        v.key(ViewerKey::ArrowRight);
        assert_eq!(v.index(), 0);
        assert_eq!(v.counter(), "1 / 3");
    }

    #[test]
    fn test_start_is_clamped() {
        assert_eq!(viewer(3, 10).index(), 2);
        let mut empty = viewer(0, 4);
        assert_eq!(empty.index(), 0);
        empty.next();
        empty.prev();
        assert!(empty.current().is_none());
        assert_eq!(empty.counter(), "0 / 0");
    }

    #[test]
    fn test_zoom_limits() {
        let mut v = viewer(1, 0);
        for _ in 0..40 {
            v.zoom_in();
        }
        assert_eq!(v.zoom_percent(), 300);
        assert_eq!(v.scale(), 3.0);
        for _ in 0..40 {
            v.zoom_out();
        }
        assert_eq!(v.zoom_percent(), 50);
        assert_eq!(v.scale(), 0.5);
    }

    #[test]
    fn test_wheel_needs_ctrl() {
        let mut v = viewer(1, 0);
        assert!(!v.wheel(-100.0, false));
        assert_eq!(v.zoom_percent(), 100);
        assert!(v.wheel(-100.0, true));
        assert_eq!(v.zoom_percent(), 110);
        assert!(v.wheel(100.0, true));
        assert_eq!(v.zoom_percent(), 100);
    }

    #[test]
    fn test_zoom_out_resets_pan() {
        let mut v = viewer(1, 0);
        v.drag(10.0, 10.0);
        assert_eq!(v.pan(), (0.0, 0.0));

        v.zoom_in();
        v.zoom_in();
        v.drag(10.0, -4.0);
        assert_eq!(v.pan(), (10.0, -4.0));
        v.zoom_out();
        assert_eq!(v.pan(), (0.0, 0.0));
    }

    #[test]
    fn test_rotation_cycles() {
        let mut v = viewer(1, 0);
        let degrees: Vec<u16> = (0..5)
            .map(|_| {
                v.rotate();
                v.rotation().degrees()
            })
            .collect();
        assert_eq!(degrees, [90, 180, 270, 0, 90]);
    }

    #[test]
    fn test_escape_stops_slideshow_before_closing() {
        let mut v = viewer(3, 0);
        assert_eq!(
            v.start_slideshow(Duration::ZERO),
            [ViewerEffect::RequestFullscreen]
        );
        v.zoom_in();
        v.rotate();

        assert_eq!(v.key(ViewerKey::Escape), [ViewerEffect::ExitFullscreen]);
        assert!(v.is_open());
        assert!(!v.is_slideshow_active());
        assert_eq!(v.zoom_percent(), 100);
        assert_eq!(v.rotation(), Rotation::Deg0);
        assert_eq!(v.slideshow().camera(), Camera::IDENTITY);

        assert_eq!(v.key(ViewerKey::Escape), [ViewerEffect::Close]);
        assert!(!v.is_open());
    }

    #[test]
    fn test_close_stops_slideshow() {
        let mut v = viewer(2, 0);
        v.start_slideshow(Duration::ZERO);
        assert_eq!(
            v.close(),
            [ViewerEffect::ExitFullscreen, ViewerEffect::Close]
        );
        assert!(!v.is_slideshow_active());
    }

    #[test]
    fn test_slideshow_advances() {
        let mut v = viewer(3, 2);
        v.tick(Duration::from_secs(30));
        assert_eq!(v.index(), 2);

        v.start_slideshow(Duration::ZERO);
        v.tick(Duration::from_secs(4));
        assert_eq!(v.index(), 2);
        v.tick(Duration::from_secs(5));
        assert_eq!(v.index(), 0);
        v.tick(Duration::from_secs(15));
        assert_eq!(v.index(), 2);
    }

    #[test]
    fn test_set_items_clamps_index() {
        let mut v = viewer(5, 4);
        v.set_items(items(2));
        assert_eq!(v.index(), 1);
        assert_eq!(v.counter(), "2 / 2");

        v.set_items(Vec::new());
        assert_eq!(v.index(), 0);
        assert!(v.current().is_none());
        assert_eq!(v.counter(), "0 / 0");
    }

    #[test]
    fn test_effects() {
        let mut v = viewer(2, 1);
        assert_eq!(
            v.copy_prompt(),
            Some(ViewerEffect::CopyPrompt("prompt 1".into()))
        );
        assert_eq!(
            v.toggle_favorite(),
            Some(ViewerEffect::ToggleFavorite { id: "id1".into() })
        );
        assert_eq!(
            v.download(),
            Some(ViewerEffect::Download {
                url: "https://img.test/1".into(),
                filename: "mimesis_anime_id1.png".into(),
            })
        );
        assert_eq!(v.toggle_fullscreen(), ViewerEffect::RequestFullscreen);
        assert_eq!(v.toggle_fullscreen(), ViewerEffect::ExitFullscreen);

        v.set_favorite("id1", true);
        assert!(v.current().unwrap().is_favorite);
    }

    #[test]
    fn test_unsaved_items() {
        let generated = GeneratedImage {
            url: "https://img.test/x".into(),
            label: "Digital Art".into(),
            style: Style::DigitalArt,
            prompt: "neon city".into(),
            is_loading: false,
            error: false,
        };
        let failed = GeneratedImage {
            url: String::new(),
            error: true,
            ..generated.clone()
        };
        let items = GalleryItem::from_run(&[generated, failed]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].filename(42), "neon_city_digital_art_42.png");

        let v = GalleryViewer::with_slideshow(items, 0, Slideshow::new(1));
        assert_eq!(v.toggle_favorite(), None);
    }
}
