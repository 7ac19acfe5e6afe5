//! Client-side image store.
//!
//! [`ImageStore`] is the session cache every view reads from. It is a cheap
//! cloneable handle; all clones share the same state. Mutations are
//! synchronous and infallible; when the store was opened with a snapshot
//! path, each mutation also rewrites the JSON snapshot.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::record::PersistedImage;

/// Persisted form of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub images: Vec<PersistedImage>,
    /// Unix millis of the last mutation, 0 if never mutated.
    #[serde(default)]
    pub last_updated: i64,
}

/// Shared, optionally persisted collection of saved images.
#[derive(Clone, Default)]
pub struct ImageStore {
    state: Arc<RwLock<StoreSnapshot>>,
    path: Option<Arc<PathBuf>>,
}

impl ImageStore {
    /// Creates an empty store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a store backed by the snapshot file at `path`.
    ///
    /// A missing or corrupt snapshot yields an empty store; the file is
    /// rewritten on the first mutation. Read errors other than a missing
    /// file are still returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = match std::fs::read(&path) {
            Ok(data) => serde_json::from_slice(&data).unwrap_or_else(|e| {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "discarding corrupt image store snapshot"
                );
                StoreSnapshot::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreSnapshot::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            state: Arc::new(RwLock::new(snapshot)),
            path: Some(Arc::new(path)),
        })
    }

    /// Snapshot file path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// All images, most recent first.
    pub fn images(&self) -> Vec<PersistedImage> {
        self.state.read().images.clone()
    }

    pub fn get(&self, id: &str) -> Option<PersistedImage> {
        self.state.read().images.iter().find(|img| img.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().images.is_empty()
    }

    pub fn last_updated(&self) -> i64 {
        self.state.read().last_updated
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().clone()
    }

    /// Replaces the whole collection.
    pub fn set_images(&self, images: Vec<PersistedImage>) {
        self.mutate(|state| {
            state.images = images;
            true
        });
    }

    /// Prepends `images`, keeping their order.
    pub fn add_images(&self, images: Vec<PersistedImage>) {
        if images.is_empty() {
            return;
        }
        self.mutate(|state| {
            state.images.splice(0..0, images);
            true
        });
    }

    /// Removes the image with `id`. No-op if absent.
    pub fn delete_image(&self, id: &str) {
        self.mutate(|state| {
            let before = state.images.len();
            state.images.retain(|img| img.id != id);
            state.images.len() != before
        });
    }

    /// Flips the favorite flag of `id`. No-op if absent.
    pub fn toggle_favorite(&self, id: &str) {
        self.mutate(|state| match state.images.iter_mut().find(|img| img.id == id) {
            Some(img) => {
                img.is_favorite = !img.is_favorite;
                true
            }
            None => false,
        });
    }

    /// Applies `f`; a `true` return marks the state changed.
    fn mutate(&self, f: impl FnOnce(&mut StoreSnapshot) -> bool) {
        let snapshot = {
            let mut state = self.state.write();
            if !f(&mut state) {
                return;
            }
            state.last_updated = Utc::now().timestamp_millis();
            match self.path {
                Some(_) => state.clone(),
                None => return,
            }
        };
        if let Some(path) = &self.path {
            if let Err(e) = write_snapshot(path, &snapshot) {
                warn!(path = %path.display(), error = %e, "failed to persist image store");
            }
        }
    }
}

fn write_snapshot(path: &Path, snapshot: &StoreSnapshot) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let data = serde_json::to_vec_pretty(snapshot)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Style;

    fn image(id: &str) -> PersistedImage {
        PersistedImage {
            id: id.into(),
            url: format!("https://img.test/{id}"),
            prompt: format!("prompt {id}"),
            style: Some(Style::Cinematic),
            width: 512,
            height: 512,
            is_favorite: false,
            created_at: Utc::now(),
        }
    }

    fn ids(store: &ImageStore) -> Vec<String> {
        store.images().into_iter().map(|img| img.id).collect()
    }

    #[test]
    fn test_add_prepends() {
        let store = ImageStore::in_memory();
        store.add_images(vec![image("a")]);
        store.add_images(vec![image("b")]);
        assert_eq!(ids(&store), ["b", "a"]);

        store.add_images(vec![image("c"), image("d")]);
        assert_eq!(ids(&store), ["c", "d", "b", "a"]);
    }

    #[test]
    fn test_toggle_is_involution() {
        let store = ImageStore::in_memory();
        store.set_images(vec![image("a")]);

        store.toggle_favorite("a");
        assert!(store.get("a").unwrap().is_favorite);
        store.toggle_favorite("a");
        assert!(!store.get("a").unwrap().is_favorite);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = ImageStore::in_memory();
        store.set_images(vec![image("a"), image("b")]);

        store.delete_image("a");
        let after_first = store.snapshot();
        store.delete_image("a");
        assert_eq!(store.snapshot(), after_first);
        assert_eq!(ids(&store), ["b"]);
    }

    #[test]
    fn test_missing_ids_do_not_bump_last_updated() {
        let store = ImageStore::in_memory();
        assert_eq!(store.last_updated(), 0);
        store.toggle_favorite("ghost");
        store.delete_image("ghost");
        store.add_images(Vec::new());
        assert_eq!(store.last_updated(), 0);

        store.set_images(vec![image("a")]);
        assert!(store.last_updated() > 0);
    }

    #[test]
    fn test_clones_share_state() {
        let store = ImageStore::in_memory();
        let view = store.clone();
        store.add_images(vec![image("a")]);
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"{\"images\": [trunc").unwrap();

        let store = ImageStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.last_updated(), 0);

        store.add_images(vec![image("a")]);
        let reopened = ImageStore::open(&path).unwrap();
        assert_eq!(ids(&reopened), ["a"]);
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store").join("images.json");

        let store = ImageStore::open(&path).unwrap();
        assert!(store.is_empty());
        store.add_images(vec![image("a")]);
        store.add_images(vec![image("b")]);
        store.toggle_favorite("a");

        let reopened = ImageStore::open(&path).unwrap();
        assert_eq!(ids(&reopened), ["b", "a"]);
        assert!(reopened.get("a").unwrap().is_favorite);
        assert_eq!(reopened.last_updated(), store.last_updated());

        let json: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(json["lastUpdated"].is_i64());
        assert_eq!(json["images"][0]["id"], "b");
    }
}
