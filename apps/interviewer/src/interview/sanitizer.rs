//! Response sanitizer: turns raw model text into something a recruiter would say.
//!
//! Question outputs are held to a hard contract: one sentence, at most
//! [`MAX_QUESTION_WORDS`] words, ending in `?`, no leading punctuation.
//! Greetings, first responses, candidate answers and feedback only get the
//! cleanup passes.

use std::sync::OnceLock;

use regex::Regex;

use crate::context::chunking::split_sentences;

pub const MAX_QUESTION_WORDS: usize = 25;

/// What a piece of generated text is for. Drives the length/punctuation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Greeting,
    FirstResponse,
    /// Reply to a question the candidate asked during closing.
    CandidateAnswer,
    Feedback,
    Question,
}

impl OutputKind {
    pub fn is_question(self) -> bool {
        self == OutputKind::Question
    }
}

struct Patterns {
    ai_disclosure: Regex,
    html_tag: Regex,
    bracketed: Regex,
    meta_lead_in: Regex,
    mechanics_aside: Regex,
    casual: Regex,
    leading_punctuation: Regex,
    fluff: Regex,
    praise: Regex,
    transition: Regex,
    whitespace: Regex,
    space_before_punctuation: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("static sanitizer regex");
        Patterns {
            ai_disclosure: re(r"(?im)^.*\bI['’]?m an AI\b.*$"),
            html_tag: re(r"<[^>]+>"),
            bracketed: re(r"\[.*?\]"),
            meta_lead_in: re(
                r"(?i)(?:here is the output|output:|here['’]s (?:my|the) (?:attempt|response|start)|note:)[^\w\n]*",
            ),
            mechanics_aside: re(r"(?i)\(.*?(?:recruiter|interview|response|phase).*?\)"),
            casual: re(
                r"(?i)\b(?:haha|lol|like a champ|rock star|super|mega|ultra|wizardry|magic|just-works)\b",
            ),
            leading_punctuation: re(r"^[^\w\s]+"),
            fluff: re(
                r"(?i)\b(?:great question|let['’]?s get started|excited to (?:chat|be here)|i['’]?m (?:with you|excited|here).*?(?:today|interview)|hello)\b",
            ),
            praise: re(
                r"(?i)\b(?:wow|that['’]?s|this is|i['’]?m) (?:really |so |quite )?(?:amazing|impressive|fascinating|interesting|great)[^!.]*[!.]",
            ),
            transition: re(r"(?i)\blet['’]?s (?:dive into|jump into|explore|unpack|that |the )?"),
            whitespace: re(r"\s+"),
            space_before_punctuation: re(r"\s+([?.!,;:])"),
        }
    })
}

/// Cleans raw generated text. Order of the passes matters: later passes
/// assume tags and asides are already gone.
pub fn sanitize(raw: &str, kind: OutputKind) -> String {
    let p = patterns();

    let mut text = raw.trim().to_string();
    text = p.ai_disclosure.replace_all(&text, "").into_owned();
    text = p.html_tag.replace_all(&text, "").into_owned();
    text = p.bracketed.replace_all(&text, "").into_owned();
    text = p.meta_lead_in.replace_all(&text, "").into_owned();
    text = p.mechanics_aside.replace_all(&text, "").into_owned();
    text = p.casual.replace_all(&text, "").into_owned();
    text = p.leading_punctuation.replace(text.trim_start(), "").into_owned();
    text = p.fluff.replace_all(&text, "").into_owned();
    text = p.praise.replace_all(&text, "").into_owned();
    text = p.transition.replace_all(&text, "").into_owned();

    if kind.is_question() {
        return shape_question(&text);
    }

    // fluff removal can expose fresh leading punctuation
    let text = collapse_whitespace(&text);
    p.leading_punctuation.replace(&text, "").trim_start().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    let p = patterns();
    let text = p.whitespace.replace_all(text, " ");
    p.space_before_punctuation
        .replace_all(&text, "$1")
        .trim()
        .to_string()
}

/// Reduces text to a single question sentence of bounded length.
fn shape_question(text: &str) -> String {
    let mut text = collapse_whitespace(text);
    if !text.ends_with('?') {
        text.push('?');
    }

    let sentence = {
        let sentences = split_sentences(&text);
        sentences
            .iter()
            .find(|s| s.contains('?'))
            .or_else(|| sentences.first())
            .map(|s| s.to_string())
            .unwrap_or_default()
    };

    let sentence = patterns()
        .leading_punctuation
        .replace(sentence.trim_start(), "")
        .into_owned();

    let words: Vec<&str> = sentence.split_whitespace().take(MAX_QUESTION_WORDS).collect();
    let mut question = words.join(" ");

    if !question.ends_with('?') {
        let trimmed_len = question
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '-'))
            .len();
        question.truncate(trimmed_len);
        question.push('?');
    }
    question
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_question_contract(text: &str) {
        assert!(text.ends_with('?'), "must end with '?': {text:?}");
        assert!(
            text.split_whitespace().count() <= MAX_QUESTION_WORDS,
            "too many words: {text:?}"
        );
        assert!(!text.contains('\n'), "embedded newline: {text:?}");
        assert_eq!(split_sentences(text).len(), 1, "more than one sentence: {text:?}");
        let first = text.chars().next().unwrap();
        assert!(
            first.is_alphanumeric() || first == '?',
            "leading punctuation: {text:?}"
        );
    }

    #[test]
    fn test_question_gets_trailing_question_mark() {
        let out = sanitize("Tell me about your work at Acme", OutputKind::Question);
        assert_eq!(out, "Tell me about your work at Acme?");
    }

    #[test]
    fn test_question_prefers_first_interrogative_sentence() {
        let out = sanitize(
            "Nice work on that pipeline. How did you handle backpressure? Also curious about tests.",
            OutputKind::Question,
        );
        assert_eq!(out, "How did you handle backpressure?");
    }

    #[test]
    fn test_question_truncated_to_25_words() {
        let raw = format!("Could you walk me through {} please?", "the design ".repeat(20));
        let out = sanitize(&raw, OutputKind::Question);
        assert_question_contract(&out);
        assert_eq!(out.split_whitespace().count(), MAX_QUESTION_WORDS);
    }

    #[test]
    fn test_strips_ai_disclosure_line() {
        let out = sanitize(
            "I'm an AI language model, but here goes.\nWhat drew you to Rust?",
            OutputKind::Question,
        );
        assert_eq!(out, "What drew you to Rust?");
    }

    #[test]
    fn test_strips_tags_brackets_and_meta_lead_ins() {
        let out = sanitize(
            "Here's my attempt: <b>What</b> [pause] did you ship last quarter?",
            OutputKind::Question,
        );
        assert_eq!(out, "What did you ship last quarter?");
    }

    #[test]
    fn test_strips_mechanics_asides() {
        let out = sanitize(
            "How do you test async code (moving to the technical phase)?",
            OutputKind::Question,
        );
        assert_eq!(out, "How do you test async code?");
    }

    #[test]
    fn test_strips_casual_tokens_and_fluff() {
        let out = sanitize(
            "Great question! Haha, that's really impressive work! What was the hardest bug?",
            OutputKind::Question,
        );
        assert_eq!(out, "What was the hardest bug?");
    }

    #[test]
    fn test_casual_tokens_do_not_mangle_longer_words() {
        let out = sanitize(
            "How did your supervisor review the ultrasound tool?",
            OutputKind::Question,
        );
        assert_eq!(out, "How did your supervisor review the ultrasound tool?");
    }

    #[test]
    fn test_strips_transition_cliches() {
        let out = sanitize("Let's dive into your Kafka work: how did it scale?", OutputKind::Question);
        assert_eq!(out, "your Kafka work: how did it scale?");
    }

    #[test]
    fn test_greeting_not_forced_to_question() {
        let out = sanitize("Hi Dana, nice to meet you!", OutputKind::Greeting);
        assert_eq!(out, "Hi Dana, nice to meet you!");
    }

    #[test]
    fn test_feedback_keeps_multiple_sentences() {
        let raw = "Strong answers on Rust.\n\nWork on concrete teamwork examples. Score: 7/10.";
        let out = sanitize(raw, OutputKind::Feedback);
        assert_eq!(
            out,
            "Strong answers on Rust. Work on concrete teamwork examples. Score: 7/10."
        );
    }

    #[test]
    fn test_question_contract_holds_for_messy_inputs() {
        let inputs = [
            "",
            "!!! ... ???",
            "Wow!\n\n\nSo.\nWhat next",
            "Note: (interview response) [internal] <i>ok</i>",
            "A. B. C. D.",
            "word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word, word.",
            "¿Qué tal? Fine.",
            "— How about a design question?",
        ];
        for input in inputs {
            let out = sanitize(input, OutputKind::Question);
            assert_question_contract(&out);
        }
    }
}
