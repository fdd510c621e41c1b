//! Transcript corrector for Indian-English speech
//!
//! A fixed, ordered table of regex substitutions targeting common phonetic
//! misrecognitions: spaced-out syllables of Indian city names, v/w
//! confusions, and "th" heard as "t". Substitutions run in table order, so
//! later rules see the output of earlier ones. After substitution the text
//! gets sentence-initial capitalization and a whole-word recapitalization
//! pass over a fixed proper-noun list.
//!
//! This is a best-effort heuristic layer with no awareness of context
//! beyond the listed patterns; it is not a grammar or spell checker.

use once_cell::sync::Lazy;
use regex::Regex;

/// (pattern, replacement) table applied in order
const CORRECTION_RULES: &[(&str, &str)] = &[
    (r"\bbang\s*lor\b", "bangalore"),
    (r"\bmum\s*bai\b", "mumbai"),
    (r"\bbom\s*bay\b", "mumbai"),
    (r"\bdel\s*hi\b", "delhi"),
    (r"\bhi\s*dra\s*bad\b", "hyderabad"),
    (r"\bchen\s*nai\b", "chennai"),
    (r"\bkol\s*kata\b", "kolkata"),
    (r"\bcal\s*cutta\b", "kolkata"),
    (r"\bwery\b", "very"),
    (r"\btink\b", "think"),
    (r"\btank\s*you\b", "thank you"),
    (r"\bvat\b", "what"),
];

/// Proper nouns recapitalized wherever they appear as whole words
const PROPER_NOUNS: &[&str] = &[
    "india",
    "mumbai",
    "delhi",
    "bangalore",
    "chennai",
    "hyderabad",
];

static COMPILED_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    CORRECTION_RULES
        .iter()
        .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid rule"), *replacement))
        .collect()
});

static COMPILED_NOUNS: Lazy<Vec<(Regex, String)>> = Lazy::new(|| {
    PROPER_NOUNS
        .iter()
        .map(|noun| {
            let pattern = Regex::new(&format!(r"(?i)\b{}\b", noun)).expect("valid noun");
            (pattern, capitalize(noun))
        })
        .collect()
});

/// Heuristic corrector applied to every decoded transcript
#[derive(Debug, Clone, Default)]
pub struct TranscriptCorrector;

impl TranscriptCorrector {
    pub fn new() -> Self {
        Self
    }

    /// Correct a raw decoded transcript
    pub fn correct(&self, text: &str) -> String {
        let mut processed = text.to_lowercase();

        for (pattern, replacement) in COMPILED_RULES.iter() {
            processed = pattern.replace_all(&processed, *replacement).into_owned();
        }

        let processed = capitalize_sentences(&processed);

        let mut result = processed;
        for (pattern, replacement) in COMPILED_NOUNS.iter() {
            result = pattern.replace_all(&result, replacement.as_str()).into_owned();
        }

        result
    }
}

/// Capitalize the first letter of each period-terminated segment
fn capitalize_sentences(text: &str) -> String {
    let trimmed = text.trim();
    let had_trailing_period = trimmed.ends_with('.');

    let sentences: Vec<String> = trimmed
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(capitalize)
        .collect();

    let mut joined = sentences.join(". ");
    if had_trailing_period && !joined.is_empty() {
        joined.push('.');
    }
    joined
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_spaced_city_syllables() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(
            corrector.correct("bang lor is nice. i live in del hi."),
            "Bangalore is nice. I live in Delhi."
        );
    }

    #[test]
    fn corrects_uppercase_decoder_output() {
        // The CTC decoder emits uppercase characters
        let corrector = TranscriptCorrector::new();
        assert_eq!(
            corrector.correct("I WENT TO MUM BAI FROM CHEN NAI"),
            "I went to Mumbai from Chennai"
        );
    }

    #[test]
    fn is_idempotent() {
        let corrector = TranscriptCorrector::new();
        let once = corrector.correct("bang lor is nice. i live in del hi.");
        let twice = corrector.correct(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn normalizes_consonant_confusions() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(corrector.correct("vat do you tink"), "What do you think");
        assert_eq!(corrector.correct("tank you wery much"), "Thank you very much");
    }

    #[test]
    fn legacy_city_names_map_to_current_ones() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(corrector.correct("bom bay and cal cutta"), "Mumbai and kolkata");
    }

    #[test]
    fn recapitalizes_proper_nouns_as_whole_words_only() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(corrector.correct("i love india"), "I love India");
        // "indian" contains "india" but must not be rewritten
        assert_eq!(corrector.correct("indian food"), "Indian food");
    }

    #[test]
    fn proper_noun_at_sentence_start() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(
            corrector.correct("hyderabad is hot. delhi is cold."),
            "Hyderabad is hot. Delhi is cold."
        );
    }

    #[test]
    fn later_rules_see_earlier_output() {
        let corrector = TranscriptCorrector::new();
        // Substitution first merges the syllables, then the proper-noun pass
        // capitalizes the merged word
        assert_eq!(corrector.correct("hi dra bad"), "Hyderabad");
    }

    #[test]
    fn handles_empty_and_punctuation_only_input() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(corrector.correct(""), "");
        assert_eq!(corrector.correct("..."), "");
    }

    #[test]
    fn preserves_text_without_periods() {
        let corrector = TranscriptCorrector::new();
        assert_eq!(corrector.correct("hello there"), "Hello there");
    }
}
