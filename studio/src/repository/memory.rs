//! In-memory image repository.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use super::{sort_newest_first, ImageRepository};
use crate::error::{Error, Result};
use crate::record::{NewImage, PersistedImage};

/// An image repository backed by a HashMap.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    images: Arc<Mutex<HashMap<String, PersistedImage>>>,
}

impl MemoryRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageRepository for MemoryRepository {
    async fn create(&self, image: NewImage) -> Result<PersistedImage> {
        let record = PersistedImage::create(image, Utc::now());
        let mut images = self.images.lock().map_err(Error::storage)?;
        images.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<PersistedImage>> {
        let images = self.images.lock().map_err(Error::storage)?;
        let mut list: Vec<_> = images.values().cloned().collect();
        sort_newest_first(&mut list);
        Ok(list)
    }

    async fn toggle_favorite(&self, id: &str) -> Result<PersistedImage> {
        let mut images = self.images.lock().map_err(Error::storage)?;
        let record = images
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        record.is_favorite = !record.is_favorite;
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut images = self.images.lock().map_err(Error::storage)?;
        images
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}
