//! Durable image repository.
//!
//! The repository is authoritative for saved images. [`ImageRepository`] is
//! implemented by [`MemoryRepository`] for tests and short sessions, and by
//! [`RedbRepository`] for on-disk storage.

mod memory;
mod redb;

pub use memory::MemoryRepository;
pub use self::redb::RedbRepository;

use async_trait::async_trait;

use crate::error::Result;
use crate::record::{NewImage, PersistedImage};

/// CRUD access to saved images.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Saves a new image with a fresh id, `is_favorite = false` and
    /// `created_at = now`.
    async fn create(&self, image: NewImage) -> Result<PersistedImage>;

    /// Returns every image, newest first.
    async fn list(&self) -> Result<Vec<PersistedImage>>;

    /// Flips the favorite flag and returns the updated record.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if `id` is absent.
    async fn toggle_favorite(&self, id: &str) -> Result<PersistedImage>;

    /// Deletes the image.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if `id` is absent.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Orders records newest first. Ties keep their id order so listings are
/// stable.
pub(crate) fn sort_newest_first(images: &mut [PersistedImage]) {
    images.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
