//! Redb-backed image repository.

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use redb::{Database, ReadableTable, TableDefinition};

use super::{sort_newest_first, ImageRepository};
use crate::error::{Error, Result};
use crate::record::{NewImage, PersistedImage};

/// Records keyed by id, stored as JSON.
const IMAGES: TableDefinition<&str, &[u8]> = TableDefinition::new("images");

/// A persistent image repository backed by redb.
///
/// Every operation is one short local transaction.
pub struct RedbRepository {
    db: Database,
}

impl RedbRepository {
    /// Open or create a repository at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let db = Database::create(path).map_err(Error::storage)?;

        // Create the table if it doesn't exist
        let tx = db.begin_write().map_err(Error::storage)?;
        {
            let _ = tx.open_table(IMAGES).map_err(Error::storage)?;
        }
        tx.commit().map_err(Error::storage)?;

        Ok(Self { db })
    }

    fn put(&self, record: &PersistedImage) -> Result<()> {
        let value = serde_json::to_vec(record)?;
        let tx = self.db.begin_write().map_err(Error::storage)?;
        {
            let mut table = tx.open_table(IMAGES).map_err(Error::storage)?;
            table
                .insert(record.id.as_str(), value.as_slice())
                .map_err(Error::storage)?;
        }
        tx.commit().map_err(Error::storage)?;
        Ok(())
    }
}

#[async_trait]
impl ImageRepository for RedbRepository {
    async fn create(&self, image: NewImage) -> Result<PersistedImage> {
        let record = PersistedImage::create(image, Utc::now());
        self.put(&record)?;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<PersistedImage>> {
        let tx = self.db.begin_read().map_err(Error::storage)?;
        let table = tx.open_table(IMAGES).map_err(Error::storage)?;

        let mut images = Vec::new();
        for item in table.iter().map_err(Error::storage)? {
            let (_, value) = item.map_err(Error::storage)?;
            images.push(serde_json::from_slice::<PersistedImage>(value.value())?);
        }
        sort_newest_first(&mut images);
        Ok(images)
    }

    async fn toggle_favorite(&self, id: &str) -> Result<PersistedImage> {
        let tx = self.db.begin_write().map_err(Error::storage)?;
        let record = {
            let mut table = tx.open_table(IMAGES).map_err(Error::storage)?;
            let current = table
                .get(id)
                .map_err(Error::storage)?
                .map(|value| value.value().to_vec())
                .ok_or_else(|| Error::NotFound(id.to_string()))?;

            let mut record: PersistedImage = serde_json::from_slice(&current)?;
            record.is_favorite = !record.is_favorite;
            let value = serde_json::to_vec(&record)?;
            table
                .insert(id, value.as_slice())
                .map_err(Error::storage)?;
            record
        };
        tx.commit().map_err(Error::storage)?;
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let tx = self.db.begin_write().map_err(Error::storage)?;
        {
            let mut table = tx.open_table(IMAGES).map_err(Error::storage)?;
            let removed = table.remove(id).map_err(Error::storage)?;
            if removed.is_none() {
                return Err(Error::NotFound(id.to_string()));
            }
        }
        tx.commit().map_err(Error::storage)?;
        Ok(())
    }
}
