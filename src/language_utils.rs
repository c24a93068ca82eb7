use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// This module provides functions for validating and naming ISO 639-1
/// language codes, plus the per-language token multipliers used by the
/// token budget estimator. Caption tracks and summarization prompts both
/// work with 2-letter codes.
/// Default multiplier applied when a language has no entry of its own
pub const DEFAULT_TOKEN_MULTIPLIER: f32 = 1.3;

/// Validate that a language code is a known ISO 639-1 (2-letter) code
pub fn validate_language_code(code: &str) -> Result<()> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 && Language::from_639_1(&normalized_code).is_some() {
        return Ok(());
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Check if two language codes match (represent the same language)
///
/// Caption track tags sometimes carry a regional suffix ("en-US", "pt-BR");
/// only the primary subtag is compared.
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    let primary1 = primary_subtag(code1);
    let primary2 = primary_subtag(code2);

    !primary1.is_empty() && primary1 == primary2
}

/// Extract the lowercase primary subtag from a language tag
pub fn primary_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let primary = primary_subtag(code);
    let lang = Language::from_639_1(&primary)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}

/// Token-per-word multiplier for a language.
///
/// Latin-script languages tokenize close to their word count; inflected and
/// CJK languages expand noticeably. Unknown codes fall back to the English
/// multiplier.
pub fn token_multiplier(code: &str) -> f32 {
    match primary_subtag(code).as_str() {
        "en" => 1.3,
        "es" | "fr" | "it" | "pt" => 1.4,
        "de" => 1.5,
        "ru" => 1.6,
        "zh" | "ja" | "ko" => 2.0,
        _ => DEFAULT_TOKEN_MULTIPLIER,
    }
}
