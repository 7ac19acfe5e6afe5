//! File names for downloaded images.

use crate::style::Style;

const PROMPT_CHARS: usize = 30;

/// Name used when saving a gallery image: `mimesis_<style>_<id>.png`.
pub fn gallery_filename(id: &str, style: Option<Style>) -> String {
    let style = style.map_or("generated", Style::id);
    format!("mimesis_{style}_{id}.png")
}

/// Name used when saving a freshly generated variation:
/// `<prompt>_<label>_<unix millis>.png`.
///
/// The prompt is cut to its first 30 characters with everything but ASCII
/// letters and digits replaced by `_`; the label is lowercased with
/// whitespace runs replaced by `_`.
pub fn generated_filename(prompt: &str, label: &str, unix_millis: i64) -> String {
    let prompt: String = prompt
        .chars()
        .take(PROMPT_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    let label = label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    format!("{prompt}_{label}_{unix_millis}.png")
}
