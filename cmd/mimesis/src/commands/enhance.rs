//! Prompt enhancement command.

use clap::Args;
use serde::Serialize;

use mimesis_pollinations::Client;
use mimesis_studio::{Notice, prompt};

use super::{create_client, get_context, output, print_info, print_notice, print_verbose};
use crate::Cli;

/// Enhance a prompt with detailed visual descriptions.
#[derive(Args)]
pub struct EnhanceCommand {
    /// Prompt to enhance
    prompt: String,
}

#[derive(Serialize)]
struct EnhanceResult {
    original: String,
    enhanced: String,
    applied: bool,
}

impl EnhanceCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        print_verbose(cli, &format!("Using context: {}", ctx.name));

        let client = create_client(&ctx)?;
        let enhanced = enhance(&client, &self.prompt).await?;

        output(cli).write(&EnhanceResult {
            original: self.prompt.clone(),
            applied: enhanced.is_some(),
            enhanced: enhanced.unwrap_or_else(|| self.prompt.clone()),
        })
    }
}

/// Enhances `prompt`, reporting progress as notices.
///
/// `Ok(None)` means the text host answered with nothing usable.
pub(crate) async fn enhance(client: &Client, prompt: &str) -> anyhow::Result<Option<String>> {
    print_notice(&Notice::enhancing());
    match prompt::enhance_prompt(&client.text(), prompt).await {
        Ok(Some(enhanced)) => {
            print_notice(&Notice::enhanced());
            Ok(Some(enhanced))
        }
        Ok(None) => {
            print_info("Enhancement returned no usable text, keeping the prompt");
            Ok(None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "prompt enhancement failed");
            print_notice(&Notice::enhancement_failed());
            Err(e.into())
        }
    }
}
