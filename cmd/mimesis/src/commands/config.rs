//! Configuration management commands.

use clap::{Args, Subcommand};

use mimesis_cli::Context as CliContext;
use mimesis_pollinations::{DEFAULT_IMAGE_HOST, DEFAULT_TEXT_HOST};

use super::{app_paths, get_config, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Contexts allow you to switch between image hosts and databases,
/// similar to kubectl's context management.
///
/// Configuration is stored in ~/.mimesis/mimesis/config.yaml
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add a new context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// Image host base URL
        #[arg(long)]
        image_host: Option<String>,
        /// Text host base URL
        #[arg(long)]
        text_host: Option<String>,
        /// Image database path
        #[arg(long)]
        database: Option<String>,
        /// Request timeout in seconds (at most 30)
        #[arg(long)]
        timeout: Option<u64>,
        /// Maximum existence-check retries per image
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Display the current context
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View the current configuration
    View,
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                image_host,
                text_host,
                database,
                timeout,
                max_retries,
            } => {
                let mut cfg = get_config(cli)?;

                let ctx = CliContext {
                    image_host: image_host.clone().unwrap_or_default(),
                    text_host: text_host.clone().unwrap_or_default(),
                    database: database.clone().unwrap_or_default(),
                    timeout: timeout.unwrap_or(0),
                    max_retries: *max_retries,
                    ..Default::default()
                };

                cfg.add_context(name, ctx)?;
                print_success(&format!("Context \"{}\" added successfully", name));
                Ok(())
            }

            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context \"{}\" deleted", name));
                Ok(())
            }

            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context \"{}\"", name));
                Ok(())
            }

            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }

            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;

                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<8} {:<16} {:<32} {}", "CURRENT", "NAME", "IMAGE_HOST", "DATABASE");
                for (name, ctx) in &cfg.contexts {
                    let current = if *name == cfg.current_context { "*" } else { "" };
                    println!(
                        "{:<8} {:<16} {:<32} {}",
                        current,
                        name,
                        or_default(&ctx.image_host),
                        or_default(&ctx.database)
                    );
                }
                Ok(())
            }

            ConfigSubcommand::View => {
                let cfg = get_config(cli)?;
                let paths = app_paths()?;

                println!("Config file: {}", cfg.path().display());
                println!("Current context: {}", cfg.current_context);
                println!("Contexts: {}", cfg.contexts.len());

                for (name, ctx) in &cfg.contexts {
                    println!("\n  {}:", name);
                    println!("    Image host: {}", host_or(&ctx.image_host, DEFAULT_IMAGE_HOST));
                    println!("    Text host: {}", host_or(&ctx.text_host, DEFAULT_TEXT_HOST));
                    println!("    Database: {}", ctx.database_path(&paths).display());
                    if ctx.timeout > 0 {
                        println!("    Timeout: {}s", ctx.timeout);
                    }
                    if let Some(retries) = ctx.max_retries {
                        println!("    Max retries: {}", retries);
                    }
                    for (key, value) in &ctx.extra {
                        println!("    {}: {}", key, value);
                    }
                }
                Ok(())
            }
        }
    }
}

fn or_default(value: &str) -> &str {
    if value.is_empty() { "(default)" } else { value }
}

fn host_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}
