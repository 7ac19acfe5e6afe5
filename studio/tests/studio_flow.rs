//! End-to-end flows over the studio: generate, save, browse, delete.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mimesis_pollinations::RetryPolicy;
use mimesis_studio::{
    Deleted, Error, GalleryItem, GalleryViewer, GenerationConfig, HistoryFilter, ImageRepository,
    ImageSize, ImageSource, ImageStore, Library, MemoryRepository, NewImage, Orchestrator,
    RedbRepository, Result, RunPhase, Style, VariationStatus, ViewerEffect, history,
};
use parking_lot::Mutex;

/// Scripted source: styles listed in `failures` fail that many times.
struct ScriptedSource {
    failures: Mutex<HashMap<Style, u32>>,
    requests: Mutex<Vec<(Style, ImageSize)>>,
}

impl ScriptedSource {
    fn new(failures: &[(Style, u32)]) -> Self {
        Self {
            failures: Mutex::new(failures.iter().copied().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests_for(&self, style: Style) -> usize {
        self.requests.lock().iter().filter(|(s, _)| *s == style).count()
    }
}

#[async_trait]
impl ImageSource for ScriptedSource {
    async fn render(
        &self,
        prompt: &str,
        size: ImageSize,
        seed: u64,
        _timeout: Duration,
    ) -> Result<String> {
        let style = Style::ALL
            .into_iter()
            .find(|s| prompt.ends_with(s.suffix()))
            .ok_or_else(|| Error::Source(format!("no style in {prompt}")))?;
        self.requests.lock().push((style, size));

        if let Some(left) = self.failures.lock().get_mut(&style) {
            if *left > 0 {
                *left -= 1;
                return Err(Error::Source(format!("{} failed", style.id())));
            }
        }
        Ok(format!("https://img.test/{}/{seed}.png", style.id()))
    }
}

fn orchestrator(source: Arc<ScriptedSource>) -> Orchestrator {
    Orchestrator::with_config(
        source,
        GenerationConfig {
            timeout: Duration::from_secs(1),
            batch_retry: RetryPolicy::fixed(1, Duration::from_millis(10)),
        },
    )
}

fn library() -> Library {
    Library::new(Arc::new(MemoryRepository::new()), ImageStore::in_memory())
}

#[tokio::test]
async fn test_anime_failing_twice_saves_three() {
    let source = Arc::new(ScriptedSource::new(&[(Style::Anime, 2)]));
    let orchestrator = orchestrator(source.clone());
    let size = ImageSize::new(1280, 720);

    let run = orchestrator.run("a red fox in snow", size).await.unwrap();

    assert_eq!(run.phase, RunPhase::Settled);
    assert_eq!(run.images.len(), 4);
    assert_eq!(run.succeeded().count(), 3);
    let failed: Vec<_> = run.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].style, Style::Anime);
    assert_eq!(failed[0].status(), VariationStatus::Failed);
    assert!(failed[0].url.is_empty());

    // Initial pass plus exactly one retry pass for anime.
    assert_eq!(source.requests_for(Style::Anime), 2);
    assert_eq!(source.requests_for(Style::Cinematic), 1);
    assert_eq!(source.requests.lock().len(), 5);
    assert!(source.requests.lock().iter().all(|(_, s)| *s == size));

    let library = library();
    let saved = library.save_run(&run).await.unwrap();
    assert_eq!(saved.len(), 3);
    assert!(saved.iter().all(|img| img.style != Some(Style::Anime)));
    assert!(saved.iter().all(|img| img.width == 1280 && img.height == 720));
    assert!(saved.iter().all(|img| img.prompt.starts_with("a red fox in snow, ")));

    let stored = library.store().images();
    assert_eq!(stored.len(), 3);
    assert_eq!(library.repository().list().await.unwrap(), stored);
}

#[tokio::test]
async fn test_run_with_no_successes_cannot_be_saved() {
    let failures: Vec<_> = Style::ALL.iter().map(|s| (*s, 2)).collect();
    let source = Arc::new(ScriptedSource::new(&failures));
    let run = orchestrator(source)
        .run("storm", ImageSize::new(512, 512))
        .await
        .unwrap();

    assert_eq!(run.failed().count(), 4);
    assert!(!run.can_save());
    assert!(library().save_run(&run).await.is_err());
}

#[tokio::test]
async fn test_watch_reports_progress() {
    let source = Arc::new(ScriptedSource::new(&[(Style::Cinematic, 1)]));
    let orchestrator = Arc::new(orchestrator(source));
    let mut rx = orchestrator.subscribe();

    let handle = {
        let orchestrator = orchestrator.clone();
        tokio::spawn(async move { orchestrator.run("glacier", ImageSize::new(512, 512)).await })
    };

    let mut phases = Vec::new();
    while rx.changed().await.is_ok() {
        let phase = rx.borrow_and_update().phase;
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
        if phase == RunPhase::Settled {
            break;
        }
    }
    let run = handle.await.unwrap().unwrap();

    assert_eq!(phases.last(), Some(&RunPhase::Settled));
    assert!(phases.contains(&RunPhase::PartiallyFailed));
    assert_eq!(run.succeeded().count(), 4);
}

fn new_image(i: usize) -> NewImage {
    NewImage {
        url: format!("https://img.test/{i}.png"),
        prompt: format!("prompt {i}"),
        style: Some(Style::ALL[i % 4]),
        width: 512,
        height: 512,
    }
}

async fn seeded_library(count: usize) -> Library {
    let library = library();
    for i in 0..count {
        library.repository().create(new_image(i)).await.unwrap();
        // Distinct creation times keep the listing order predictable.
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    library.refresh().await.unwrap();
    library
}

#[tokio::test]
async fn test_delete_set_removes_whole_set() {
    let library = seeded_library(8).await;
    let images = library.store().images();
    let target = images[5].id.clone();
    let expected = history::set_containing(&images, &target).unwrap().ids();

    let deleted = library.delete_set(&target).await.unwrap();

    assert_eq!(deleted, Deleted::Set(expected.clone()));
    assert_eq!(library.store().len(), 4);
    assert!(expected.iter().all(|id| library.store().get(id).is_none()));
    assert_eq!(library.repository().list().await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_delete_outside_history_window_is_single() {
    let library = seeded_library(34).await;
    let oldest = library.store().images().last().unwrap().id.clone();

    let deleted = library.delete_set(&oldest).await.unwrap();

    assert_eq!(deleted, Deleted::Single(oldest));
    assert_eq!(library.store().len(), 33);
}

#[tokio::test]
async fn test_missing_ids_leave_store_untouched() {
    let library = seeded_library(2).await;
    let before = library.store().snapshot();

    let err = library.toggle_favorite("missing").await.unwrap_err();
    assert!(err.is_not_found());
    let err = library.delete_set("missing").await.unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(library.store().snapshot(), before);
}

#[tokio::test]
async fn test_favorites_flow_through_history_and_gallery() {
    let library = seeded_library(8).await;
    let images = library.store().images();

    let record = library.toggle_favorite(&images[6].id).await.unwrap();
    assert!(record.is_favorite);
    assert!(library.store().get(&images[6].id).unwrap().is_favorite);

    let sets = HistoryFilter::Favorites.apply(history::image_sets(&library.store().images()));
    assert_eq!(sets.len(), 1);
    assert!(sets[0].contains(&images[6].id));

    let items: Vec<GalleryItem> = library.store().images().iter().map(GalleryItem::from).collect();
    let mut viewer = GalleryViewer::new(items, 6);
    let Some(ViewerEffect::ToggleFavorite { id }) = viewer.toggle_favorite() else {
        panic!("expected a favorite effect");
    };
    let record = library.toggle_favorite(&id).await.unwrap();
    viewer.set_favorite(&id, record.is_favorite);
    assert!(!viewer.current().unwrap().is_favorite);
}

#[tokio::test]
async fn test_redb_library_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("images.redb");
    let snapshot = dir.path().join("store.json");

    let source = Arc::new(ScriptedSource::new(&[]));
    let run = orchestrator(source)
        .run("paper lanterns", ImageSize::new(768, 1024))
        .await
        .unwrap();

    {
        let library = Library::new(
            Arc::new(RedbRepository::open(&db).unwrap()),
            ImageStore::open(&snapshot).unwrap(),
        );
        library.save_run(&run).await.unwrap();
        assert_eq!(library.store().len(), 4);
    }

    let store = ImageStore::open(&snapshot).unwrap();
    assert_eq!(store.len(), 4);

    let library = Library::new(Arc::new(RedbRepository::open(&db).unwrap()), store);
    assert_eq!(library.refresh().await.unwrap(), 4);
    assert!(library
        .store()
        .images()
        .iter()
        .all(|img| img.width == 768 && img.height == 1024));
}
