//! History commands: saved image sets, favorites and deletion.

use clap::{Args, Subcommand};
use serde::Serialize;

use mimesis_studio::{Deleted, HistoryFilter, ImageSet, Library, Notice, history};

use super::{get_context, open_library, output, print_info, print_notice};
use crate::Cli;

/// Show and manage saved images.
///
/// Lists the 32 most recent images in sets of four, one set per
/// generation run.
#[derive(Args)]
pub struct HistoryCommand {
    #[command(subcommand)]
    command: Option<HistorySubcommand>,

    /// Only show sets containing a favorite
    #[arg(long)]
    favorites: bool,

    /// Reload from the database before listing
    #[arg(long)]
    refresh: bool,
}

#[derive(Subcommand)]
enum HistorySubcommand {
    /// Toggle the favorite flag of an image
    Favorite {
        /// Image ID
        id: String,
    },
    /// Delete the set containing an image
    Delete {
        /// Image ID
        id: String,
    },
}

#[derive(Serialize)]
struct HistoryView {
    filter: HistoryFilter,
    total: usize,
    sets: Vec<ImageSet>,
}

impl HistoryCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let library = open_library(&ctx)?;

        match &self.command {
            None => self.list(cli, &library).await,
            Some(HistorySubcommand::Favorite { id }) => toggle_favorite(&library, id).await,
            Some(HistorySubcommand::Delete { id }) => delete(&library, id).await,
        }
    }

    async fn list(&self, cli: &Cli, library: &Library) -> anyhow::Result<()> {
        if self.refresh || library.store().is_empty() {
            match library.refresh().await {
                Ok(_) if self.refresh => print_notice(&Notice::refreshed()),
                Ok(_) => {}
                Err(e) => {
                    print_notice(&Notice::refresh_failed());
                    return Err(e.into());
                }
            }
        }

        let images = library.store().images();
        let filter = if self.favorites {
            HistoryFilter::Favorites
        } else {
            HistoryFilter::All
        };
        let sets = filter.apply(history::image_sets(&images));
        if sets.is_empty() {
            print_info("No images in history");
        }

        output(cli).write(&HistoryView {
            filter,
            total: images.len(),
            sets,
        })
    }
}

async fn toggle_favorite(library: &Library, id: &str) -> anyhow::Result<()> {
    // Resync first so the local echo applies to current records.
    library.refresh().await?;
    match library.toggle_favorite(id).await {
        Ok(record) => {
            print_notice(&Notice::favorite_updated());
            print_info(&format!(
                "{} is {}",
                record.id,
                if record.is_favorite { "a favorite" } else { "no longer a favorite" }
            ));
            Ok(())
        }
        Err(e) => {
            print_notice(&Notice::favorite_failed());
            Err(e.into())
        }
    }
}

async fn delete(library: &Library, id: &str) -> anyhow::Result<()> {
    library.refresh().await?;
    match library.delete_set(id).await {
        Ok(Deleted::Set(ids)) => {
            print_notice(&Notice::set_deleted());
            print_info(&format!("Deleted {} images", ids.len()));
            Ok(())
        }
        Ok(Deleted::Single(_)) => {
            print_notice(&Notice::image_deleted());
            Ok(())
        }
        Err(e) => {
            print_notice(&Notice::delete_failed());
            Err(e.into())
        }
    }
}
