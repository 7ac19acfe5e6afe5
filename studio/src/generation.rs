//! Generation runs: one image per style, rendered concurrently.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use mimesis_pollinations::{RetryPolicy, MAX_TIMEOUT};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::prompt::{self, PromptVariation};
use crate::record::NewImage;
use crate::size::ImageSize;
use crate::source::ImageSource;
use crate::style::Style;

/// Per-request timeout used for run requests.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay before failed variations are tried again.
pub const BATCH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Exclusive upper bound of per-variation seeds.
const SEED_RANGE: u64 = 1_000_000;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Requested,
    Running,
    PartiallyFailed,
    Settled,
}

/// State of one variation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationStatus {
    Loading,
    Succeeded,
    Failed,
}

/// One style variation of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    /// Empty until the variation succeeds.
    pub url: String,
    pub label: String,
    pub style: Style,
    /// Prompt actually sent, base prompt plus style suffix.
    pub prompt: String,
    pub is_loading: bool,
    pub error: bool,
}

impl GeneratedImage {
    fn pending(variation: &PromptVariation) -> Self {
        Self {
            url: String::new(),
            label: variation.label.clone(),
            style: variation.style,
            prompt: variation.prompt.clone(),
            is_loading: true,
            error: false,
        }
    }

    pub fn status(&self) -> VariationStatus {
        if self.is_loading {
            VariationStatus::Loading
        } else if self.error {
            VariationStatus::Failed
        } else {
            VariationStatus::Succeeded
        }
    }

    fn start(&mut self) {
        self.is_loading = true;
        self.error = false;
    }

    fn succeed(&mut self, url: String) {
        self.url = url;
        self.is_loading = false;
        self.error = false;
    }

    fn fail(&mut self) {
        self.url.clear();
        self.is_loading = false;
        self.error = true;
    }
}

/// Snapshot of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenerationRun {
    /// Prompt as submitted.
    pub prompt: String,
    pub size: Option<ImageSize>,
    pub phase: RunPhase,
    pub images: Vec<GeneratedImage>,
}

impl GenerationRun {
    pub fn succeeded(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.images
            .iter()
            .filter(|img| img.status() == VariationStatus::Succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &GeneratedImage> {
        self.images
            .iter()
            .filter(|img| img.status() == VariationStatus::Failed)
    }

    /// Saving is offered once at least one variation succeeded.
    pub fn can_save(&self) -> bool {
        self.phase == RunPhase::Settled && self.succeeded().next().is_some()
    }

    /// Records to persist for the succeeded variations.
    pub fn to_new_images(&self) -> Vec<NewImage> {
        let size = self.size.unwrap_or(ImageSize::new(0, 0));
        self.succeeded()
            .map(|img| NewImage {
                url: img.url.clone(),
                prompt: img.prompt.clone(),
                style: Some(img.style),
                width: size.width,
                height: size.height,
            })
            .collect()
    }

    fn failed_indices(&self) -> Vec<usize> {
        self.images
            .iter()
            .enumerate()
            .filter(|(_, img)| img.status() == VariationStatus::Failed)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Orchestrator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Timeout handed to the source for every request, at most 30s.
    pub timeout: Duration,
    /// Delayed passes over failed variations.
    pub batch_retry: RetryPolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RUN_TIMEOUT,
            batch_retry: RetryPolicy::fixed(1, BATCH_RETRY_DELAY),
        }
    }
}

/// Drives generation runs and publishes their progress.
///
/// Only one run may be in flight at a time; a concurrent call to
/// [`Orchestrator::run`] fails with [`Error::RunInProgress`].
pub struct Orchestrator {
    source: Arc<dyn ImageSource>,
    config: GenerationConfig,
    running: AtomicBool,
    updates: watch::Sender<GenerationRun>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn ImageSource>) -> Self {
        Self::with_config(source, GenerationConfig::default())
    }

    pub fn with_config(source: Arc<dyn ImageSource>, mut config: GenerationConfig) -> Self {
        config.timeout = config.timeout.min(MAX_TIMEOUT);
        let (updates, _) = watch::channel(GenerationRun::default());
        Self {
            source,
            config,
            running: AtomicBool::new(false),
            updates,
        }
    }

    /// Subscribes to run snapshots. The receiver starts at the latest one.
    pub fn subscribe(&self) -> watch::Receiver<GenerationRun> {
        self.updates.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Current phase; `Idle` whenever no run is in flight.
    pub fn phase(&self) -> RunPhase {
        if self.is_running() {
            self.updates.borrow().phase
        } else {
            RunPhase::Idle
        }
    }

    /// Renders every style variation of `prompt` at `size`.
    ///
    /// Variations settle independently. Failed ones get the configured
    /// delayed retry passes; whatever still fails stays failed in the
    /// returned run.
    pub async fn run(&self, prompt: &str, size: ImageSize) -> Result<GenerationRun> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| Error::RunInProgress)?;
        let _guard = RunningGuard(&self.running);

        let variations = prompt::variations(prompt);
        let mut run = GenerationRun {
            prompt: prompt.to_string(),
            size: Some(size),
            phase: RunPhase::Requested,
            images: variations.iter().map(GeneratedImage::pending).collect(),
        };
        self.publish(&run);

        run.phase = RunPhase::Running;
        let all: Vec<usize> = (0..variations.len()).collect();
        self.render(&mut run, &variations, &all).await;

        let policy = self.config.batch_retry;
        let mut failed = run.failed_indices();
        let mut pass = 1;
        while !failed.is_empty() && pass <= policy.max_retries {
            run.phase = RunPhase::PartiallyFailed;
            self.publish(&run);
            debug!(failed = failed.len(), pass, "retrying failed variations");

            tokio::time::sleep(policy.backoff(pass)).await;
            self.render(&mut run, &variations, &failed).await;
            failed = run.failed_indices();
            pass += 1;
        }

        run.phase = RunPhase::Settled;
        self.publish(&run);
        info!(
            succeeded = run.succeeded().count(),
            failed = failed.len(),
            "generation run settled"
        );
        Ok(run)
    }

    /// Renders the given variations concurrently, applying each result as
    /// it arrives. Waits for all of them.
    async fn render(
        &self,
        run: &mut GenerationRun,
        variations: &[PromptVariation],
        indices: &[usize],
    ) {
        for &i in indices {
            run.images[i].start();
        }
        self.publish(run);

        let size = run.size.unwrap_or(ImageSize::new(0, 0));
        let timeout = self.config.timeout;
        let mut pending: FuturesUnordered<_> = indices
            .iter()
            .map(|&i| {
                let source = self.source.clone();
                let prompt = variations[i].prompt.clone();
                let seed = rand::thread_rng().gen_range(0..SEED_RANGE);
                async move { (i, source.render(&prompt, size, seed, timeout).await) }
            })
            .collect();

        while let Some((i, result)) = pending.next().await {
            let image = &mut run.images[i];
            match result {
                Ok(url) if !url.is_empty() => image.succeed(url),
                Ok(_) => {
                    warn!(style = %image.style, "variation returned an empty url");
                    image.fail();
                }
                Err(e) => {
                    warn!(style = %image.style, error = %e, "variation failed");
                    image.fail();
                }
            }
            self.publish(run);
        }
    }

    fn publish(&self, run: &GenerationRun) {
        self.updates.send_replace(run.clone());
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
