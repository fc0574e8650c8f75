use pretty_assertions::assert_eq;

use super::*;

#[test]
fn detects_english_phrases_in_context() {
    assert!(detect("I have severe chest pain"));
    assert!(detect("my dad might be having a heart attack?"));
    assert!(detect("chest pain, help"));
}

#[test]
fn ignores_everyday_complaints() {
    assert!(!detect("I have a headache"));
    assert!(!detect("how much water should I drink"));
    assert!(!detect(""));
}

#[test]
fn matching_is_case_insensitive() {
    assert!(detect("CHEST PAIN"));
    assert!(detect("Trouble Breathing since morning"));
}

#[test]
fn curly_apostrophe_matches() {
    assert!(detect("I can’t breathe"));
    assert!(detect("I CAN'T BREATHE"));
}

#[test]
fn detects_other_scripts() {
    assert!(detect("मुझे सीने में दर्द है"));
    assert!(detect("எனக்கு மார்பு வலி"));
    assert!(detect("আমার শ্বাসকষ্ট হচ্ছে"));
}

#[test]
fn false_positives_are_accepted() {
    // "stroke" also matches harmless text.
    assert!(detect("tips to improve my swimming stroke"));
}

#[test]
fn every_keyword_is_detected_on_its_own() {
    for keyword in KEYWORDS {
        assert!(detect(keyword), "{keyword} not detected");
        assert!(detect(&format!("..{}..", keyword.to_uppercase())));
    }
}

#[test]
fn matches_lists_all_hits_in_order() {
    assert_eq!(
        matches("Overdose and now unconscious"),
        vec!["unconscious", "overdose"]
    );
    assert!(matches("a sore throat").is_empty());
}

#[test]
fn english_keywords_are_ascii_only() {
    let english: Vec<_> = english_keywords().collect();
    assert_eq!(english.len(), 12);
    assert!(english.contains(&"chest pain"));
}
