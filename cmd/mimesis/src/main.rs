//! Mimesis CLI - generate, browse and manage AI images from the terminal.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    ConfigCommand, DownloadCommand, EnhanceCommand, GalleryCommand, GenerateCommand,
    HistoryCommand,
};

/// Mimesis CLI - generate, browse and manage AI images.
///
/// Every prompt is rendered in four styles (photographic, digital art,
/// cinematic, anime). Saved images live in a local database and can be
/// browsed in the history and the interactive gallery.
///
/// Configuration is stored in ~/.mimesis/mimesis/ and supports multiple contexts,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "mimesis")]
#[command(about = "Mimesis image studio CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.mimesis/mimesis/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Enhance a prompt with visual detail
    Enhance(EnhanceCommand),
    /// Generate one image per style
    Generate(GenerateCommand),
    /// Show and manage saved image sets
    History(HistoryCommand),
    /// Browse saved images interactively
    Gallery(GalleryCommand),
    /// Download an image
    Download(DownloadCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Enhance(cmd) => cmd.run(&cli).await,
        Commands::Generate(cmd) => cmd.run(&cli).await,
        Commands::History(cmd) => cmd.run(&cli).await,
        Commands::Gallery(cmd) => cmd.run(&cli).await,
        Commands::Download(cmd) => cmd.run(&cli).await,
    }
}
