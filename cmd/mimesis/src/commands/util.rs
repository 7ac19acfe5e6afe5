//! Utility functions for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use mimesis_cli::{Config, Context, Output, OutputFormat, Paths, load_config};
use mimesis_pollinations::Client;
use mimesis_studio::{
    DEFAULT_RUN_TIMEOUT, ImageStore, Library, Notice, NoticeVariant, RedbRepository,
};

use crate::Cli;

const APP_NAME: &str = "mimesis";

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context to use, with environment overrides applied.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    get_config(cli)?.resolve_context(cli.context.as_deref())
}

pub fn app_paths() -> anyhow::Result<Paths> {
    Ok(Paths::new(APP_NAME)?)
}

/// Output for structured command results.
pub fn output(cli: &Cli) -> Output {
    Output::new(OutputFormat::from_json_flag(cli.json), cli.output.clone())
}

/// Creates a Pollinations client from context configuration.
pub fn create_client(ctx: &Context) -> anyhow::Result<Client> {
    let mut builder = Client::builder();

    if !ctx.image_host.is_empty() {
        builder = builder.image_host(&ctx.image_host);
    }
    if !ctx.text_host.is_empty() {
        builder = builder.text_host(&ctx.text_host);
    }
    if ctx.timeout > 0 {
        builder = builder.timeout(Duration::from_secs(ctx.timeout));
    }
    if let Some(retries) = ctx.max_retries {
        builder = builder.max_retries(retries);
    }

    Ok(builder.build()?)
}

/// Per-request timeout for generation runs.
pub fn run_timeout(ctx: &Context) -> Duration {
    if ctx.timeout > 0 {
        Duration::from_secs(ctx.timeout)
    } else {
        DEFAULT_RUN_TIMEOUT
    }
}

/// Opens the image library: the context's database plus the store snapshot.
pub fn open_library(ctx: &Context) -> anyhow::Result<Library> {
    let paths = app_paths()?;
    let database = ctx.database_path(&paths);
    tracing::debug!(database = %database.display(), "opening image library");
    paths.ensure_data_dir()?;

    let repo = RedbRepository::open(&database)?;
    let store = ImageStore::open(paths.store_file())?;
    Ok(Library::new(Arc::new(repo), store))
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    if cli.verbose {
        eprintln!("[verbose] {}", msg);
    }
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Prints error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m✗\x1b[0m {}", msg);
}

/// Prints info message.
pub fn print_info(msg: &str) {
    eprintln!("\x1b[34mℹ\x1b[0m {}", msg);
}

/// Prints a notice with the marker of its variant.
pub fn print_notice(notice: &Notice) {
    match notice.variant {
        NoticeVariant::Default => print_success(&notice.to_string()),
        NoticeVariant::Destructive => print_error(&notice.to_string()),
    }
}
