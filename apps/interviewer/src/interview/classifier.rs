//! Heuristics over candidate replies. Pure functions, no model calls.

use std::sync::OnceLock;

use regex::Regex;

/// Exact (trimmed, lowercased) replies that end the interview during closing.
const TERMINATION_PHRASES: &[&str] = &["no", "nah", "i'm good", "none", "nothing"];

fn question_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\?$|\b(?:how|what|why|when|where|who|can you|could you|tell me|does|do you)\b")
            .expect("static question regex")
    })
}

fn how_are_you_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\bhow\s+(?:are\s+you|you\s+doing|about\s+you)\b").expect("static how-are-you regex")
    })
}

fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase().replace('’', "'")
}

/// "No", "nah", "I'm good", "none" or "nothing" as the whole reply.
/// Substrings don't count: "no thanks" keeps the interview open.
pub fn is_termination_signal(answer: &str) -> bool {
    let normalized = normalize(answer);
    TERMINATION_PHRASES.contains(&normalized.as_str())
}

pub fn is_candidate_question(answer: &str) -> bool {
    question_pattern().is_match(&normalize(answer))
}

/// Whether the candidate returned the pleasantry ("how are you", "how about you").
pub fn asked_how_are_you(answer: &str) -> bool {
    how_are_you_pattern().is_match(&normalize(answer))
}
