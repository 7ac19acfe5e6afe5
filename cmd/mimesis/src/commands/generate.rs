//! Image generation command.

use std::collections::HashSet;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;

use mimesis_studio::{
    GeneratedImage, GenerationConfig, Notice, Orchestrator, PersistedImage, PromptMode, RunPhase,
    SelectedSize, SizeField, SizePreset, SizeSelector, Style, validate_dimension,
};

use super::{
    create_client, get_context, open_library, output, print_info, print_notice, print_verbose,
    run_timeout,
};
use super::enhance::enhance;
use crate::Cli;

/// Generate one image per style from a prompt.
///
/// Styles: photographic, digital art, cinematic and anime. Failed styles
/// are retried once after a short delay.
#[derive(Args)]
pub struct GenerateCommand {
    /// Image prompt
    prompt: String,

    /// Size preset: landscape, square, portrait, desktop or mobile
    #[arg(long, default_value = "landscape")]
    size: SizePreset,

    /// Custom width in pixels (64-1704)
    #[arg(long, requires = "height")]
    width: Option<String>,

    /// Custom height in pixels (64-960)
    #[arg(long, requires = "width")]
    height: Option<String>,

    /// Prompt mode: enhanced or direct
    #[arg(long, default_value = "enhanced")]
    mode: PromptMode,

    /// Save the generated images to history
    #[arg(long)]
    save: bool,
}

#[derive(Serialize)]
struct GenerateResult {
    prompt: String,
    mode: PromptMode,
    size: SelectedSize,
    images: Vec<GeneratedImage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    saved: Vec<PersistedImage>,
}

impl GenerateCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let selected = self.select_size()?;
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;

        print_verbose(cli, &format!("Using context: {}", ctx.name));
        print_verbose(cli, &format!("Size: {} ({})", selected.size, selected.label));

        let mut prompt = self.prompt.clone();
        if self.mode == PromptMode::Enhanced {
            // A failed enhancement is reported and the prompt is used as typed.
            if let Ok(Some(enhanced)) = enhance(&client, &self.prompt).await {
                prompt = enhanced;
            }
        }
        print_verbose(cli, &format!("Prompt: {}", prompt));

        let orchestrator = Orchestrator::with_config(
            Arc::new(client),
            GenerationConfig {
                timeout: run_timeout(&ctx),
                ..GenerationConfig::default()
            },
        );
        let progress = tokio::spawn(report_failures(orchestrator.subscribe()));

        let run = orchestrator.run(&prompt, selected.size).await?;
        drop(orchestrator);
        let _ = progress.await;

        let succeeded = run.succeeded().count();
        if succeeded == 0 {
            print_notice(&Notice::generation_failed());
        } else {
            print_info(&format!("Generated {} of {} images", succeeded, run.images.len()));
        }

        let mut saved = Vec::new();
        if self.save {
            if run.can_save() {
                let library = open_library(&ctx)?;
                match library.save_run(&run).await {
                    Ok(records) => {
                        print_notice(&Notice::saved());
                        saved = records;
                    }
                    Err(e) => {
                        print_notice(&Notice::save_failed());
                        return Err(e.into());
                    }
                }
            } else {
                print_info("Nothing to save");
            }
        }

        output(cli).write(&GenerateResult {
            prompt,
            mode: self.mode,
            size: selected,
            images: run.images,
            saved,
        })
    }

    /// Resolves the size; custom dimensions are validated before any request.
    fn select_size(&self) -> anyhow::Result<SelectedSize> {
        let mut selector = SizeSelector::new();
        selector.select_preset(self.size);

        if let (Some(width), Some(height)) = (&self.width, &self.height) {
            selector.set_custom_width(width);
            selector.set_custom_height(height);

            // Both fields must pass before either blur may commit.
            let custom = selector.custom();
            let errors: Vec<String> = [
                validate_dimension(custom.width(), SizeField::Width).err().map(|e| format!("width: {e}")),
                validate_dimension(custom.height(), SizeField::Height).err().map(|e| format!("height: {e}")),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !errors.is_empty() {
                anyhow::bail!("invalid custom size: {}", errors.join(", "));
            }

            selector.blur_custom_width();
            selector.blur_custom_height();
        }
        Ok(selector.selected().clone())
    }
}

/// Prints a notice the first time each style fails.
async fn report_failures(mut rx: tokio::sync::watch::Receiver<mimesis_studio::GenerationRun>) {
    let mut reported: HashSet<Style> = HashSet::new();
    while rx.changed().await.is_ok() {
        let run = rx.borrow_and_update().clone();
        for image in run.failed() {
            if reported.insert(image.style) && run.phase != RunPhase::Settled {
                print_notice(&Notice::variation_failed(&image.label));
            }
        }
        if run.phase == RunPhase::Settled {
            break;
        }
    }
}
