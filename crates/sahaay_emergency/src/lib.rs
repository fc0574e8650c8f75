//! Deterministic detection of emergency phrases in user input.
//!
//! Detection is a case-insensitive substring scan over a fixed, multilingual
//! phrase list. False positives are accepted; an exact phrase (case aside) is
//! never missed.

mod signal;

pub use signal::SafetySignal;
use tracing::debug;

/// Phrases that flag a message as a possible emergency.
///
/// Entries are stored lowercase. Non-Latin scripts are matched verbatim.
pub const KEYWORDS: &[&str] = &[
    // English
    "chest pain",
    "suicide",
    "kill myself",
    "want to die",
    "severe bleeding",
    "trouble breathing",
    "can't breathe",
    "heart attack",
    "stroke",
    "unconscious",
    "overdose",
    "poisoning",
    // Hindi
    "सीने में दर्द",
    "आत्महत्या",
    "सांस लेने में तकलीफ",
    // Tamil
    "மார்பு வலி",
    "தற்கொலை",
    "மூச்சுத் திணறல்",
    // Bengali
    "বুকে ব্যথা",
    "আত্মহত্যা",
    "শ্বাসকষ্ট",
];

/// Returns `true` if `text` contains any emergency phrase.
#[must_use]
pub fn detect(text: &str) -> bool {
    let text = normalize(text);
    KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

/// Returns every emergency phrase found in `text`, in list order.
#[must_use]
pub fn matches(text: &str) -> Vec<&'static str> {
    let text = normalize(text);
    let found: Vec<_> = KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| text.contains(keyword))
        .collect();

    if !found.is_empty() {
        debug!(keywords = ?found, "Emergency phrases detected.");
    }

    found
}

/// The English phrases, for rendering into model instructions.
pub fn english_keywords() -> impl Iterator<Item = &'static str> {
    KEYWORDS
        .iter()
        .copied()
        .filter(|keyword| keyword.is_ascii())
}

fn normalize(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
