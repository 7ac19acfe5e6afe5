//! Interactive gallery viewer.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};

use mimesis_cli::write_binary;
use mimesis_pollinations::Client;
use mimesis_studio::{
    GalleryItem, GalleryViewer, Library, Notice, StyleFilter, ViewerEffect, ViewerKey, history,
};

use super::{
    app_paths, create_client, get_context, open_library, output, print_info, print_notice,
    print_verbose,
};
use crate::Cli;

/// Browse saved images.
///
/// Reads one command per line from stdin:
///   next, prev, zoom-in, zoom-out, rotate, fullscreen, favorite,
///   download, copy, slideshow, stop, refresh, esc, quit
///
/// The viewer state is printed after every command.
#[derive(Args)]
pub struct GalleryCommand {
    /// Style filter: all, realistic, digital, cinematic or anime
    #[arg(long, default_value = "all")]
    style: StyleFilter,

    /// Index of the first image to show
    #[arg(long, default_value_t = 0)]
    start: usize,

    /// Slideshow frame interval in milliseconds
    #[arg(long, default_value_t = 500)]
    frame_ms: u64,
}

enum Step {
    Continue,
    Quit,
}

struct Session<'a> {
    cli: &'a Cli,
    style: StyleFilter,
    client: Client,
    library: Library,
    downloads: PathBuf,
    viewer: GalleryViewer,
    clock: Instant,
}

impl GalleryCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let library = open_library(&ctx)?;
        if let Err(e) = library.refresh().await {
            tracing::warn!(error = %e, "showing cached images");
            print_notice(&Notice::refresh_failed());
        }

        let images = library.store().images();
        for (filter, count) in history::style_counts(&images) {
            print_verbose(cli, &format!("{}: {}", filter, count));
        }
        let items: Vec<GalleryItem> = self.style.apply(&images).iter().map(GalleryItem::from).collect();
        print_info(&format!("{} {}", items.len(), if items.len() == 1 { "image" } else { "images" }));
        if items.is_empty() {
            return Ok(());
        }

        let mut session = Session {
            cli,
            style: self.style,
            client: create_client(&ctx)?,
            library,
            downloads: app_paths()?.downloads_dir(),
            viewer: GalleryViewer::new(items, self.start),
            clock: Instant::now(),
        };
        session.show()?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut frames = tokio::time::interval(Duration::from_millis(self.frame_ms.max(16)));
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if let Step::Quit = session.command(line.trim()).await? {
                        break;
                    }
                }
                _ = frames.tick(), if session.viewer.is_slideshow_active() => {
                    session.frame();
                }
            }
        }
        Ok(())
    }
}

impl Session<'_> {
    fn now(&self) -> Duration {
        self.clock.elapsed()
    }

    fn show(&self) -> anyhow::Result<()> {
        output(self.cli).write(&self.viewer.state())
    }

    fn frame(&mut self) {
        let before = self.viewer.index();
        self.viewer.tick(self.now());
        let camera = self.viewer.slideshow().camera();
        let moved = if self.viewer.index() != before {
            let keys = self.viewer.slideshow().keyframes();
            print_verbose(
                self.cli,
                &format!(
                    "slide {}: zoom {:.3} -> {:.3}",
                    self.viewer.counter(),
                    keys.from.zoom,
                    keys.to.zoom
                ),
            );
            " *"
        } else {
            ""
        };
        eprintln!(
            "{}  zoom {:.3}  pan ({:+.1}, {:+.1})  tilt {:+.2}°{}",
            self.viewer.counter(),
            camera.zoom,
            camera.pan_x,
            camera.pan_y,
            camera.rotation,
            moved
        );
    }

    async fn command(&mut self, command: &str) -> anyhow::Result<Step> {
        let effects = match command {
            "" => return Ok(Step::Continue),
            "next" | "right" => self.viewer.key(ViewerKey::ArrowRight),
            "prev" | "left" => self.viewer.key(ViewerKey::ArrowLeft),
            "zoom-in" => {
                self.viewer.zoom_in();
                Vec::new()
            }
            "zoom-out" => {
                self.viewer.zoom_out();
                Vec::new()
            }
            "rotate" => {
                self.viewer.rotate();
                Vec::new()
            }
            "fullscreen" => vec![self.viewer.toggle_fullscreen()],
            "favorite" => self.viewer.toggle_favorite().into_iter().collect(),
            "download" => self.viewer.download().into_iter().collect(),
            "copy" => self.viewer.copy_prompt().into_iter().collect(),
            "slideshow" => {
                let now = self.now();
                self.viewer.start_slideshow(now)
            }
            "stop" => self.viewer.stop_slideshow(),
            "refresh" => {
                self.reload().await;
                Vec::new()
            }
            "esc" | "escape" => self.viewer.key(ViewerKey::Escape),
            "quit" | "q" => self.viewer.close(),
            other => {
                print_info(&format!("Unknown command: {}", other));
                return Ok(Step::Continue);
            }
        };

        let mut step = Step::Continue;
        for effect in effects {
            if let Step::Quit = self.apply(effect).await {
                step = Step::Quit;
            }
        }
        if let Step::Continue = step {
            self.show()?;
        }
        Ok(step)
    }

    async fn apply(&mut self, effect: ViewerEffect) -> Step {
        match effect {
            ViewerEffect::Close => return Step::Quit,
            ViewerEffect::RequestFullscreen => print_info("Fullscreen on"),
            ViewerEffect::ExitFullscreen => print_info("Fullscreen off"),
            ViewerEffect::CopyPrompt(prompt) => {
                println!("{}", prompt);
                print_notice(&Notice::copied());
            }
            ViewerEffect::ToggleFavorite { id } => match self.library.toggle_favorite(&id).await {
                Ok(record) => {
                    self.viewer.set_favorite(&id, record.is_favorite);
                    print_notice(&Notice::favorite_updated());
                }
                Err(e) => {
                    tracing::warn!(id = %id, error = %e, "favorite toggle failed");
                    print_notice(&Notice::favorite_failed());
                }
            },
            ViewerEffect::Download { url, filename } => {
                let label = self
                    .viewer
                    .current()
                    .and_then(|item| item.style)
                    .map_or("generated", |style| style.label());
                let path = self.downloads.join(&filename);
                match self.download(&url, &path).await {
                    Ok(()) => {
                        print_notice(&Notice::download_started(label));
                        print_info(&format!("Saved to {}", path.display()));
                    }
                    Err(e) => {
                        tracing::warn!(url = %url, error = %e, "download failed");
                        print_notice(&Notice::download_failed());
                    }
                }
            }
        }
        Step::Continue
    }

    /// Reloads the library and replaces the viewer's items.
    async fn reload(&mut self) {
        match self.library.refresh().await {
            Ok(_) => print_notice(&Notice::refreshed()),
            Err(e) => {
                tracing::warn!(error = %e, "gallery refresh failed");
                print_notice(&Notice::refresh_failed());
                return;
            }
        }
        let images = self.library.store().images();
        let items = self.style.apply(&images).iter().map(GalleryItem::from).collect();
        self.viewer.set_items(items);
    }

    async fn download(&self, url: &str, path: &std::path::Path) -> anyhow::Result<()> {
        let bytes = self.client.image().download(url).await?;
        write_binary(path, &bytes)
    }
}
