//! Image download command.

use std::path::PathBuf;

use clap::Args;

use mimesis_cli::write_binary;

use super::{app_paths, create_client, get_context, print_success, print_verbose};
use crate::Cli;

/// Download an image by URL.
///
/// Saves to the path given with -o, otherwise into the downloads
/// directory under ~/.mimesis/mimesis/.
#[derive(Args)]
pub struct DownloadCommand {
    /// Image URL
    url: String,

    /// File name inside the downloads directory
    #[arg(long)]
    name: Option<String>,
}

impl DownloadCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;

        let path = match &cli.output {
            Some(path) => PathBuf::from(path),
            None => {
                let name = self.name.clone().unwrap_or_else(|| {
                    format!("mimesis_{}.png", chrono::Utc::now().timestamp_millis())
                });
                app_paths()?.downloads_dir().join(name)
            }
        };

        print_verbose(cli, &format!("Downloading {}", self.url));
        let bytes = client.image().download(&self.url).await?;
        write_binary(&path, &bytes)?;

        print_success(&format!("Saved {} bytes to {}", bytes.len(), path.display()));
        Ok(())
    }
}
