//! Image generation studio.
//!
//! Builds one prompt per visual style, renders them concurrently through an
//! [`ImageSource`], and manages the saved images: a repository for durable
//! records, an [`ImageStore`] cache that every view reads, history sets, and
//! a gallery viewer with a slideshow.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mimesis_studio::{
//!     ImageStore, Library, MemoryRepository, Orchestrator, SizePreset,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = mimesis_pollinations::Client::new()?;
//!     let orchestrator = Orchestrator::new(Arc::new(client));
//!     let library = Library::new(Arc::new(MemoryRepository::new()), ImageStore::in_memory());
//!
//!     let run = orchestrator
//!         .run("a red fox in snow", SizePreset::Square.size())
//!         .await?;
//!     if run.can_save() {
//!         library.save_run(&run).await?;
//!     }
//!     println!("{} images saved", library.store().len());
//!     Ok(())
//! }
//! ```

mod download;
mod error;
pub mod gallery;
mod generation;
pub mod history;
mod library;
mod notice;
pub mod prompt;
mod record;
mod repository;
mod size;
mod source;
mod store;
mod style;

pub use download::{gallery_filename, generated_filename};
pub use error::{Error, Result};
pub use gallery::{GalleryItem, GalleryViewer, Rotation, ViewerEffect, ViewerKey, ViewerState};
pub use generation::{
    GeneratedImage, GenerationConfig, GenerationRun, Orchestrator, RunPhase, VariationStatus,
    BATCH_RETRY_DELAY, DEFAULT_RUN_TIMEOUT,
};
pub use history::{HistoryFilter, ImageSet, StyleFilter};
pub use library::{Deleted, Library};
pub use notice::{Notice, NoticeVariant};
pub use prompt::{PromptMode, PromptVariation};
pub use record::{NewImage, PersistedImage};
pub use repository::{ImageRepository, MemoryRepository, RedbRepository};
pub use size::{
    CustomSizeInput, ImageSize, SelectedSize, SizeField, SizePreset, SizeSelector, CUSTOM_LABEL,
    MAX_HEIGHT, MAX_WIDTH, MIN_SIZE, validate_dimension, validate_size,
};
pub use source::ImageSource;
pub use store::{ImageStore, StoreSnapshot};
pub use style::{Style, StyleInfo};
