//! Keyword extraction: pure text → ordered keyword list.
//!
//! No frequency ranking: keywords keep the order they appear in the text,
//! which is what the retrieval query relies on ("first N keywords").

use std::sync::OnceLock;

use regex::Regex;

/// Maximum number of keywords returned for any text.
pub const MAX_KEYWORDS: usize = 20;

/// Tokens no longer than this (in characters) are dropped.
const MIN_KEYWORD_CHARS: usize = 4;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

/// Lowercases, tokenizes on word boundaries, drops stop words and short tokens,
/// and caps the result at [`MAX_KEYWORDS`]. Empty input yields an empty list.
pub fn extract_keywords(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let lowered = text.to_lowercase();
    word_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| !STOP_WORDS.contains(word))
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .take(MAX_KEYWORDS)
        .map(String::from)
        .collect()
}

/// Concatenates keyword lists, keeps the first occurrence of each keyword,
/// and truncates to `cap`.
pub fn merge_keywords<'a, I>(lists: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut merged: Vec<String> = Vec::new();
    for keyword in lists.into_iter().flatten() {
        if merged.len() == cap {
            break;
        }
        if !merged.contains(keyword) {
            merged.push(keyword.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_keywords() {
        assert!(extract_keywords("").is_empty());
        assert!(extract_keywords("   \n").is_empty());
    }

    #[test]
    fn test_drops_stop_words_and_short_tokens() {
        let keywords = extract_keywords("I built the Payment API with Rust and Kafka");
        assert_eq!(keywords, vec!["built", "payment", "rust", "kafka"]);
    }

    #[test]
    fn test_preserves_original_order_and_duplicates() {
        let keywords = extract_keywords("Python scripts, more Python, then Docker");
        assert_eq!(keywords, vec!["python", "scripts", "more", "python", "then", "docker"]);
    }

    #[test]
    fn test_caps_at_twenty_keywords() {
        let text = (0..40)
            .map(|i| format!("keyword{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        let keywords = extract_keywords(&text);
        assert_eq!(keywords.len(), MAX_KEYWORDS);
        assert_eq!(keywords[0], "keyword0");
        assert_eq!(keywords[19], "keyword19");
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        let keywords = extract_keywords("micro-services/kubernetes");
        assert_eq!(keywords, vec!["micro", "services", "kubernetes"]);
    }

    #[test]
    fn test_merge_keywords_dedups_and_caps() {
        let a = vec!["rust".to_string(), "kafka".to_string()];
        let b = vec!["kafka".to_string(), "python".to_string(), "docker".to_string()];
        let merged = merge_keywords([a.as_slice(), b.as_slice()], 3);
        assert_eq!(merged, vec!["rust", "kafka", "python"]);
    }
}
