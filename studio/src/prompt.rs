//! Prompt cleaning, style variations and prompt enhancement.

use std::fmt;
use std::str::FromStr;

use mimesis_pollinations::TextService;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::style::Style;

static SCAFFOLD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Image Prompt Description:|Prompt:|Description:").unwrap());
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*").unwrap());
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").unwrap());
static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s,.\-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static CONVERSATIONAL: Lazy<[Regex; 5]> = Lazy::new(|| {
    [
        Regex::new(
            r"(?i)Certainly!|Here's|I'll|Let me|Would you like|Should I|Can I|Please|Note:|Remember:",
        )
        .unwrap(),
        Regex::new(
            r"(?i)Here is|This is|I've created|I have created|I think|You might|You may|You could",
        )
        .unwrap(),
        Regex::new(
            r"(?i)a detailed image generation prompt for|an image generation prompt for|a prompt for|an enhanced prompt for",
        )
        .unwrap(),
        Regex::new(r"(?i)with a strong focus on|focusing on|emphasizing|highlighting").unwrap(),
        Regex::new(r"(?i)visual and artistic elements:|visual elements:|artistic elements:")
            .unwrap(),
    ]
});
static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r]+").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());
static LEADING_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[,\s]+").unwrap());
static TRAILING_JUNK: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+$").unwrap());
static SENTENCE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[?!:]").unwrap());

/// Instruction sent to the text host ahead of the cleaned prompt.
pub const ENHANCEMENT_INSTRUCTION: &str = "Enhance this image prompt with detailed visual descriptions, focusing only on appearance, lighting, style, and atmosphere. No introductions or questions: ";

/// Normalizes a user prompt before it is combined with style suffixes.
///
/// Removes label prefixes, code fences, bold markers, bracketed asides and
/// punctuation other than `,` `.` `-`, then collapses whitespace.
pub fn clean_prompt(text: &str) -> String {
    let text = SCAFFOLD_PREFIX.replace_all(text, "");
    let text = CODE_FENCE.replace_all(&text, "");
    let text = BOLD.replace_all(&text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = DISALLOWED.replace_all(&text, "");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Strips conversational scaffolding from text returned by the text host.
pub fn clean_enhanced_text(text: &str) -> String {
    let mut text = CODE_FENCE.replace_all(text, "").into_owned();
    text = BOLD.replace_all(&text, "").into_owned();
    text = BRACKETED.replace_all(&text, "").into_owned();
    for pattern in CONVERSATIONAL.iter() {
        text = pattern.replace_all(&text, "").into_owned();
    }
    text = NEWLINES.replace_all(&text, " ").into_owned();
    text = MULTI_SPACE.replace_all(&text, " ").into_owned();
    text = LEADING_JUNK.replace_all(&text, "").into_owned();
    text = TRAILING_JUNK.replace_all(&text, "").into_owned();
    text = SENTENCE_BREAKS.replace_all(&text, ",").into_owned();
    text.trim().to_string()
}

/// Builds the full enhancement request for a user prompt.
pub fn enhancement_request(prompt: &str) -> String {
    format!("{ENHANCEMENT_INSTRUCTION}{}", clean_prompt(prompt))
}

/// Asks the text host for a richer version of `prompt`.
///
/// Returns `Ok(None)` when the cleaned answer is empty; the caller keeps the
/// original prompt in that case.
pub async fn enhance_prompt(text: &TextService, prompt: &str) -> Result<Option<String>> {
    let raw = text.generate(&enhancement_request(prompt)).await?;
    let enhanced = clean_enhanced_text(&raw);
    Ok((!enhanced.is_empty()).then_some(enhanced))
}

/// A prompt tagged with the style it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptVariation {
    pub style: Style,
    pub label: String,
    /// Cleaned base prompt followed by the style suffix.
    pub prompt: String,
}

/// Produces one variation per style for a user prompt.
pub fn variations(base: &str) -> Vec<PromptVariation> {
    let cleaned = clean_prompt(base);
    Style::ALL
        .iter()
        .map(|style| PromptVariation {
            style: *style,
            label: style.label().to_string(),
            prompt: format!("{cleaned}, {}", style.suffix()),
        })
        .collect()
}

/// Whether the prompt is enhanced before generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    #[default]
    Enhanced,
    Direct,
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptMode::Enhanced => f.write_str("enhanced"),
            PromptMode::Direct => f.write_str("direct"),
        }
    }
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "enhanced" => Ok(PromptMode::Enhanced),
            "direct" => Ok(PromptMode::Direct),
            other => Err(format!("unknown prompt mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_prompt() {
        assert_eq!(
            clean_prompt("Prompt: **a red fox** [draft]   in  snow!!"),
            "a red fox in snow"
        );
        assert_eq!(
            clean_prompt("Image Prompt Description: ```ignored\nblock``` calm lake, dawn."),
            "calm lake, dawn."
        );
        assert_eq!(clean_prompt("   "), "");
    }

    #[test]
    fn test_variations_cover_every_style() {
        let vars = variations("  a red fox   in snow ");
        assert_eq!(vars.len(), Style::ALL.len());
        for (var, style) in vars.iter().zip(Style::ALL) {
            assert_eq!(var.style, style);
            assert_eq!(var.label, style.label());
            assert!(var.prompt.starts_with("a red fox in snow, "));
            assert!(var.prompt.ends_with(style.suffix()));
        }
    }

    #[test]
    fn test_variations_are_deterministic() {
        assert_eq!(variations("koi pond"), variations("koi pond"));
    }

    #[test]
    fn test_clean_enhanced_text() {
        let raw = "Certainly! Here is an enhanced prompt for your image:\n\n**A misty forest** at dawn [v2]\nwith soft light?";
        let cleaned = clean_enhanced_text(raw);
        assert!(!cleaned.contains("Certainly"));
        assert!(!cleaned.contains("**"));
        assert!(!cleaned.contains("[v2]"));
        assert!(!cleaned.contains('\n'));
        assert!(!cleaned.contains('?'));
        assert!(cleaned.contains("A misty forest at dawn"));
        assert!(!cleaned.starts_with(','));
    }

    #[test]
    fn test_enhancement_request_embeds_cleaned_prompt() {
        let request = enhancement_request("Prompt: koi **pond**");
        assert!(request.starts_with(ENHANCEMENT_INSTRUCTION));
        assert!(request.ends_with("koi pond"));
    }

    #[test]
    fn test_prompt_mode_parse() {
        assert_eq!("Direct".parse::<PromptMode>().unwrap(), PromptMode::Direct);
        assert!("loud".parse::<PromptMode>().is_err());
    }
}
