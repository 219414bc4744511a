//! Prompt Composer: builds one prompt per generation type, calls the model,
//! and sanitizes the result.
//!
//! Model failures never escape: every call site has a canned fallback.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::context::keywords::merge_keywords;
use crate::context::{extract_keywords, Embedder, SearchHit};
use crate::interview::classifier::asked_how_are_you;
use crate::interview::prompts::{
    fill_template, phase_focus, CANDIDATE_ANSWER_PROMPT, END_OF_INTERVIEW_PROMPT, FEEDBACK_PROMPT,
    FIRST_RESPONSE_PROMPT, FOLLOW_UP_PROMPT, GREETING_PROMPT, NEW_TOPIC_FOCUS, RECIPROCATE_LINE,
    SHORT_ANSWER_PROMPT,
};
use crate::interview::sanitizer::{sanitize, OutputKind};
use crate::llm_client::prompts::recruiter_system_prompt;
use crate::llm_client::{GenerationRequest, TextGenerator};
use crate::session::{Role, Session};

pub const TEMPERATURE: f32 = 0.7;
pub const QUESTION_MAX_TOKENS: u32 = 150;
pub const FEEDBACK_MAX_TOKENS: u32 = 250;

pub const QUESTION_FALLBACK: &str = "Sorry, something went wrong. Let's try another question!";
pub const FEEDBACK_FALLBACK: &str = "Unable to generate feedback.";
pub const CANDIDATE_ANSWER_SUFFIX: &str = "Any other questions?";

/// Short-answer count at which follow-ups switch to the encouragement prompt.
const SHORT_ANSWER_THRESHOLD: u32 = 2;
/// Search hits per document for prompt context.
const CONTEXT_HITS: usize = 3;
const FIRST_RESPONSE_KEYWORDS: usize = 5;
const QUERY_KEYWORD_CAP: usize = 8;
const RECENT_EXCHANGE_MESSAGES: usize = 2;
const CANDIDATE_ANSWER_MESSAGES: usize = 4;

pub struct PromptComposer {
    llm: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    recruiter_name: String,
    system_prompt: String,
}

impl PromptComposer {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        recruiter_name: impl Into<String>,
    ) -> Self {
        let recruiter_name = recruiter_name.into();
        Self {
            system_prompt: recruiter_system_prompt(&recruiter_name),
            llm,
            embedder,
            recruiter_name,
        }
    }

    pub fn recruiter_name(&self) -> &str {
        &self.recruiter_name
    }

    /// Fills a task template; the recruiter name is always available.
    fn fill(&self, template: &str, values: &[(&str, &str)]) -> String {
        let mut all = vec![("recruiter_name", self.recruiter_name.as_str())];
        all.extend_from_slice(values);
        fill_template(template, &all)
    }

    /// One model call. `None` on failure or when nothing survives sanitization.
    async fn run(&self, user_prompt: String, kind: OutputKind) -> Option<String> {
        let request = GenerationRequest {
            system_prompt: self.system_prompt.clone(),
            user_prompt,
            max_tokens: match kind {
                OutputKind::Feedback => FEEDBACK_MAX_TOKENS,
                _ => QUESTION_MAX_TOKENS,
            },
            temperature: TEMPERATURE,
            stream: true,
        };

        let raw = match self.llm.generate(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("LLM generation failed ({kind:?}), using fallback: {e}");
                return None;
            }
        };
        debug!("Raw model output: {raw}");

        let cleaned = sanitize(&raw, kind);
        if cleaned.trim_end_matches('?').trim().is_empty() {
            warn!("Sanitized {kind:?} output was empty, using fallback");
            return None;
        }
        Some(cleaned)
    }

    async fn question(&self, user_prompt: String) -> String {
        self.run(user_prompt, OutputKind::Question)
            .await
            .unwrap_or_else(|| QUESTION_FALLBACK.to_string())
    }

    /// Opening line. Always addresses the candidate by name.
    pub async fn greeting(&self, user_name: &str) -> String {
        let prompt = self.fill(GREETING_PROMPT, &[("user_name", user_name)]);
        match self.run(prompt, OutputKind::Greeting).await {
            Some(greeting) => ensure_name_in_greeting(&greeting, user_name),
            None => format!("Hi {user_name}, nice to meet you! How's your day going?"),
        }
    }

    /// Reply to the candidate's response to the greeting, grounded in the résumé.
    pub async fn first_response(&self, session: &Session, user_response: &str) -> String {
        let asked_how = asked_how_are_you(user_response);
        let resume_keywords: Vec<String> = extract_keywords(session.resume.text())
            .into_iter()
            .take(FIRST_RESPONSE_KEYWORDS)
            .collect();
        let hits = session
            .resume
            .search(&resume_keywords.join(", "), self.embedder.as_ref(), CONTEXT_HITS);
        debug!("First response: asked_how={asked_how}, {} resume hits", hits.len());

        let prompt = self.fill(
            FIRST_RESPONSE_PROMPT,
            &[
                ("user_response", user_response),
                ("reciprocate", if asked_how { RECIPROCATE_LINE } else { "" }),
                ("context", join_hits(&hits).as_str()),
            ],
        );

        self.run(prompt, OutputKind::FirstResponse)
            .await
            .unwrap_or_else(|| QUESTION_FALLBACK.to_string())
    }

    /// Phase-appropriate follow-up for the latest answer in `session`.
    pub async fn follow_up(&self, session: &Session) -> String {
        if session.short_answer_count >= SHORT_ANSWER_THRESHOLD {
            debug!(
                "Short answers ({}), asking an open-ended question",
                session.short_answer_count
            );
            return self.question(self.fill(SHORT_ANSWER_PROMPT, &[])).await;
        }

        let latest_answer = session.latest_user_answer().unwrap_or_default();
        let answer_keywords = extract_keywords(latest_answer);
        let resume_keywords = extract_keywords(session.resume.text());
        let jd_keywords = extract_keywords(session.job_description.text());

        let query_keywords = merge_keywords(
            [
                head(&answer_keywords, 3),
                head(&resume_keywords, 3),
                head(&jd_keywords, 2),
            ],
            QUERY_KEYWORD_CAP,
        );
        let query = query_keywords.join(", ");

        let mut hits = session
            .resume
            .search(&query, self.embedder.as_ref(), CONTEXT_HITS);
        hits.extend(
            session
                .job_description
                .search(&query, self.embedder.as_ref(), CONTEXT_HITS),
        );

        let asked_topics = session.asked_topics.join(", ");
        let focus = match session.history.last() {
            Some(last) if last.role == Role::Ai && session.asked_topics.contains(&last.content) => {
                warn!("Repeated question detected: {}", last.content);
                fill_template(NEW_TOPIC_FOCUS, &[("asked_topics", asked_topics.as_str())])
            }
            _ => phase_focus(session.phase).to_string(),
        };

        debug!(
            "Follow-up: phase={}, query=[{query}], {} context hits",
            session.phase,
            hits.len()
        );

        let answer_keywords = if answer_keywords.is_empty() {
            "none".to_string()
        } else {
            answer_keywords.join(", ")
        };
        let prompt = self.fill(
            FOLLOW_UP_PROMPT,
            &[
                ("recent", session.transcript_tail(RECENT_EXCHANGE_MESSAGES).as_str()),
                ("context", join_hits(&hits).as_str()),
                ("asked_topics", asked_topics.as_str()),
                ("focus", focus.as_str()),
                ("answer_keywords", answer_keywords.as_str()),
            ],
        );

        self.question(prompt).await
    }

    pub async fn end_of_interview(&self) -> String {
        self.question(self.fill(END_OF_INTERVIEW_PROMPT, &[])).await
    }

    /// Direct answer to a candidate's closing question, always inviting more.
    pub async fn answer_candidate(&self, session: &Session, candidate_question: &str) -> String {
        let prompt = self.fill(
            CANDIDATE_ANSWER_PROMPT,
            &[
                ("candidate_question", candidate_question),
                ("conversation", session.transcript_tail(CANDIDATE_ANSWER_MESSAGES).as_str()),
                ("job_description", session.job_description.text()),
            ],
        );

        let answer = self
            .run(prompt, OutputKind::CandidateAnswer)
            .await
            .unwrap_or_else(|| QUESTION_FALLBACK.to_string());
        with_candidate_answer_suffix(answer)
    }

    /// End-of-interview feedback over the whole conversation.
    pub async fn feedback(&self, session: &Session) -> String {
        let conversation = session.full_transcript();
        let prompt = self.fill(FEEDBACK_PROMPT, &[("conversation", conversation.as_str())]);
        self.run(prompt, OutputKind::Feedback)
            .await
            .unwrap_or_else(|| FEEDBACK_FALLBACK.to_string())
    }
}

fn head(keywords: &[String], n: usize) -> &[String] {
    &keywords[..keywords.len().min(n)]
}

fn join_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn mentions_name(text: &str, user_name: &str) -> bool {
    match Regex::new(&format!(r"(?i)\b{}\b", regex::escape(user_name))) {
        Ok(re) => re.is_match(text),
        Err(_) => text.to_lowercase().contains(&user_name.to_lowercase()),
    }
}

/// Rewrites a greeting that forgot the candidate's name as `Hi {name}, ...`.
fn ensure_name_in_greeting(greeting: &str, user_name: &str) -> String {
    if mentions_name(greeting, user_name) {
        return greeting.to_string();
    }
    warn!("User name '{user_name}' not in greeting: {greeting}");
    let rest = greeting.trim_start_matches(|c: char| matches!(c, 'H' | 'i' | ' ' | ','));
    format!("Hi {user_name}, {rest}")
}

fn with_candidate_answer_suffix(mut answer: String) -> String {
    if !answer.ends_with(CANDIDATE_ANSWER_SUFFIX) {
        answer.push(' ');
        answer.push_str(CANDIDATE_ANSWER_SUFFIX);
    }
    answer
}
