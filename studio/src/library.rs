//! Saved-image operations that keep the store in sync with the repository.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::generation::GenerationRun;
use crate::history;
use crate::record::PersistedImage;
use crate::repository::ImageRepository;
use crate::store::ImageStore;

/// What a delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deleted {
    /// Every image of the history set holding the requested id.
    Set(Vec<String>),
    /// Only the requested image; it was outside the history sets.
    Single(String),
}

impl Deleted {
    pub fn ids(&self) -> Vec<String> {
        match self {
            Deleted::Set(ids) => ids.clone(),
            Deleted::Single(id) => vec![id.clone()],
        }
    }
}

/// Repository plus the store that caches it.
///
/// The repository is authoritative. Local store changes happen only after
/// the repository call succeeded, so a failed call leaves the store as it
/// was.
#[derive(Clone)]
pub struct Library {
    repo: Arc<dyn ImageRepository>,
    store: ImageStore,
}

impl Library {
    pub fn new(repo: Arc<dyn ImageRepository>, store: ImageStore) -> Self {
        Self { repo, store }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn repository(&self) -> &Arc<dyn ImageRepository> {
        &self.repo
    }

    /// Reloads the store from the repository. Returns the image count.
    pub async fn refresh(&self) -> Result<usize> {
        let images = self.repo.list().await?;
        let count = images.len();
        self.store.set_images(images);
        Ok(count)
    }

    /// Persists the succeeded variations of a settled run.
    ///
    /// Records are created one after another with the run's size, prepended
    /// to the store, then the store is reloaded from the repository.
    pub async fn save_run(&self, run: &GenerationRun) -> Result<Vec<PersistedImage>> {
        if !run.can_save() {
            return Err(Error::Other("run has no generated images to save".into()));
        }

        let mut saved = Vec::new();
        for image in run.to_new_images() {
            saved.push(self.repo.create(image).await?);
        }
        self.store.add_images(saved.clone());

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "failed to reload images after save");
        }
        info!(count = saved.len(), "saved generated images");
        Ok(saved)
    }

    /// Flips the favorite flag in the repository, then locally.
    pub async fn toggle_favorite(&self, id: &str) -> Result<PersistedImage> {
        let record = self.repo.toggle_favorite(id).await?;
        self.store.toggle_favorite(id);
        Ok(record)
    }

    /// Deletes one image.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.repo.delete(id).await?;
        self.store.delete_image(id);
        Ok(())
    }

    /// Deletes the whole history set holding `id`, or just `id` when it is
    /// not part of a set.
    ///
    /// Set members are deleted concurrently. Members whose delete succeeded
    /// are removed locally even if another member failed; the first failure
    /// is returned.
    pub async fn delete_set(&self, id: &str) -> Result<Deleted> {
        let Some(set) = history::set_containing(&self.store.images(), id) else {
            self.delete(id).await?;
            return Ok(Deleted::Single(id.to_string()));
        };

        let ids = set.ids();
        let results = join_all(ids.iter().map(|id| self.repo.delete(id))).await;

        let mut first_err = None;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => self.store.delete_image(id),
                Err(e) => {
                    warn!(id = %id, error = %e, "failed to delete image");
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(Deleted::Set(ids)),
        }
    }
}
