use crate::domain::errors::GenerationError;
use crate::core::merge::strip_marker_literals;
use crate::domain::models::EvidencePackage;
use log::debug;

/// Turns an evidence package into document text.
pub trait TextGenerator {
    fn generate(
        &self,
        evidence: &EvidencePackage,
        guidance: &str,
        model: &str,
    ) -> Result<String, GenerationError>;
}

const FENCE: &str = "```";
const FENCE_LANGUAGES: &[&str] = &["", "markdown", "md"];

/// Removes one code fence wrapping the whole text, if there is one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };
    let Some((language, body)) = after_open.split_once('\n') else {
        return trimmed;
    };
    if !FENCE_LANGUAGES.contains(&language.trim().to_ascii_lowercase().as_str()) {
        return trimmed;
    }
    match body.trim_end().strip_suffix(FENCE) {
        Some(inner) => {
            debug!("Stripped code fence from generated text");
            inner.trim()
        }
        None => trimmed,
    }
}

/// Cleans raw provider output so it can be placed between the markers.
pub fn prepare_generated_text(raw: &str) -> String {
    let text = strip_code_fence(raw);
    let cleaned = strip_marker_literals(text);
    if cleaned.len() != text.len() {
        debug!("Removed marker literals from generated text");
    }
    cleaned.trim().to_string()
}
