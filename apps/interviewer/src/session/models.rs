use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::{DocumentContext, SearchHit};

/// User messages with fewer whitespace-separated tokens than this count as short.
pub const SHORT_ANSWER_TOKENS: usize = 10;

/// Fixed interview progression. Declaration order is the transition order,
/// so `Ord` compares phases by how far along the interview they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "greeting")]
    Greeting,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "project_2")]
    Project2,
    #[serde(rename = "technical")]
    Technical,
    #[serde(rename = "technical_2")]
    Technical2,
    #[serde(rename = "problem-solving")]
    ProblemSolving,
    #[serde(rename = "coding")]
    Coding,
    #[serde(rename = "behavioral")]
    Behavioral,
    #[serde(rename = "behavioral_2")]
    Behavioral2,
    #[serde(rename = "role-fit")]
    RoleFit,
    #[serde(rename = "closing")]
    Closing,
}

impl Phase {
    pub const ORDER: [Phase; 11] = [
        Phase::Greeting,
        Phase::Project,
        Phase::Project2,
        Phase::Technical,
        Phase::Technical2,
        Phase::ProblemSolving,
        Phase::Coding,
        Phase::Behavioral,
        Phase::Behavioral2,
        Phase::RoleFit,
        Phase::Closing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Greeting => "greeting",
            Phase::Project => "project",
            Phase::Project2 => "project_2",
            Phase::Technical => "technical",
            Phase::Technical2 => "technical_2",
            Phase::ProblemSolving => "problem-solving",
            Phase::Coding => "coding",
            Phase::Behavioral => "behavioral",
            Phase::Behavioral2 => "behavioral_2",
            Phase::RoleFit => "role-fit",
            Phase::Closing => "closing",
        }
    }

    /// Phase to enter once `question_count` questions have been asked.
    /// Counts 1–10 map through the table; anything else means closing.
    pub fn for_question_count(question_count: usize) -> Phase {
        match question_count {
            1 => Phase::Project,
            2 => Phase::Project2,
            3 => Phase::Technical,
            4 => Phase::Technical2,
            5 => Phase::ProblemSolving,
            6 => Phase::Coding,
            7 => Phase::Behavioral,
            8 => Phase::Behavioral2,
            9 => Phase::RoleFit,
            _ => Phase::Closing,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl Role {
    /// Speaker label used in prompt transcripts.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Ai => "Ai",
        }
    }
}

/// Similarity hits computed once, when the message was logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContext {
    pub resume: Vec<SearchHit>,
    pub job_description: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub keywords: Vec<String>,
    pub context: MessageContext,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// An AI turn that asked something. This is what "question count" counts.
    pub fn is_ai_question(&self) -> bool {
        self.role == Role::Ai && self.content.ends_with('?')
    }
}

/// One candidate's interview. Owned exclusively by the session store.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_name: String,
    pub phase: Phase,
    pub history: Vec<Message>,
    pub resume: Arc<DocumentContext>,
    pub job_description: Arc<DocumentContext>,
    pub is_active: bool,
    pub awaiting_candidate_question: bool,
    pub short_answer_count: u32,
    /// Every AI question asked so far, insertion-ordered, no duplicates.
    pub asked_topics: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_name: String, resume: DocumentContext, job_description: DocumentContext) -> Self {
        Self {
            user_name,
            phase: Phase::Greeting,
            history: Vec::new(),
            resume: Arc::new(resume),
            job_description: Arc::new(job_description),
            is_active: true,
            awaiting_candidate_question: false,
            short_answer_count: 0,
            asked_topics: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Appends a message and applies the tracking side effects.
    /// Returns `true` if the message added a new entry to `asked_topics`.
    pub fn record(&mut self, message: Message) -> bool {
        let mut new_topic = false;
        match message.role {
            Role::User => {
                if message.content.split_whitespace().count() < SHORT_ANSWER_TOKENS {
                    self.short_answer_count += 1;
                }
            }
            Role::Ai => {
                if message.is_ai_question() && !self.asked_topics.contains(&message.content) {
                    self.asked_topics.push(message.content.clone());
                    new_topic = true;
                }
            }
        }
        self.history.push(message);
        new_topic
    }

    /// Number of AI messages ending in `?`, rescanned from history.
    pub fn question_count(&self) -> usize {
        self.history.iter().filter(|m| m.is_ai_question()).count()
    }

    /// Content of the newest message if it came from the candidate.
    pub fn latest_user_answer(&self) -> Option<&str> {
        self.history
            .last()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }

    /// The last `n` messages as `Role: content` lines.
    pub fn transcript_tail(&self, n: usize) -> String {
        let skip = self.history.len().saturating_sub(n);
        transcript(&self.history[skip..])
    }

    pub fn full_transcript(&self) -> String {
        transcript(&self.history)
    }
}

fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Housekeeping view of a session, safe to hand to transport callers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub user_name: String,
    pub phase: Phase,
    pub is_active: bool,
    pub awaiting_candidate_question: bool,
    pub question_count: usize,
    pub short_answer_count: u32,
    pub message_count: usize,
    pub has_job_description: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(role: Role, content: &str) -> Message {
        Message {
            role,
            content: content.to_string(),
            keywords: vec![],
            context: MessageContext::default(),
            created_at: Utc::now(),
        }
    }

    fn session() -> Session {
        Session::new(
            "Dana".to_string(),
            DocumentContext::NoContext,
            DocumentContext::NoContext,
        )
    }

    #[test]
    fn test_phase_serializes_to_wire_names() {
        let json = serde_json::to_string(&Phase::ProblemSolving).unwrap();
        assert_eq!(json, "\"problem-solving\"");
        let phase: Phase = serde_json::from_str("\"behavioral_2\"").unwrap();
        assert_eq!(phase, Phase::Behavioral2);
        assert!(serde_json::from_str::<Phase>("\"lunch\"").is_err());
    }

    #[test]
    fn test_phase_order_matches_ord() {
        for pair in Phase::ORDER.windows(2) {
            assert!(pair[0] < pair[1], "{} should precede {}", pair[0], pair[1]);
        }
        for phase in Phase::ORDER {
            let round: Phase = serde_json::from_str(&format!("\"{}\"", phase.as_str())).unwrap();
            assert_eq!(round, phase);
        }
    }

    #[test]
    fn test_question_count_table() {
        assert_eq!(Phase::for_question_count(1), Phase::Project);
        assert_eq!(Phase::for_question_count(2), Phase::Project2);
        assert_eq!(Phase::for_question_count(5), Phase::ProblemSolving);
        assert_eq!(Phase::for_question_count(9), Phase::RoleFit);
        assert_eq!(Phase::for_question_count(10), Phase::Closing);
        assert_eq!(Phase::for_question_count(11), Phase::Closing);
        assert_eq!(Phase::for_question_count(0), Phase::Closing);
    }

    #[test]
    fn test_short_answers_counted_once_per_user_message() {
        let mut s = session();
        s.record(message(Role::User, "Yes"));
        s.record(message(Role::User, "one two three four five six seven eight nine ten"));
        s.record(message(Role::Ai, "ok"));
        s.record(message(Role::User, "fine thanks"));
        assert_eq!(s.short_answer_count, 2);
    }

    #[test]
    fn test_asked_topics_deduplicated_and_only_questions() {
        let mut s = session();
        assert!(s.record(message(Role::Ai, "What did you build at Acme?")));
        assert!(!s.record(message(Role::Ai, "What did you build at Acme?")));
        assert!(!s.record(message(Role::Ai, "Thanks for sharing.")));
        assert!(!s.record(message(Role::User, "Is this a question?")));
        assert_eq!(s.asked_topics, vec!["What did you build at Acme?"]);
        assert_eq!(s.history.len(), 4);
    }

    #[test]
    fn test_question_count_rescans_ai_questions() {
        let mut s = session();
        s.record(message(Role::Ai, "Hi Dana, nice to meet you!"));
        s.record(message(Role::User, "Hello?"));
        s.record(message(Role::Ai, "What is your favourite project?"));
        s.record(message(Role::Ai, "What is your favourite project?"));
        assert_eq!(s.question_count(), 2);
    }

    #[test]
    fn test_transcript_tail_formats_roles() {
        let mut s = session();
        s.record(message(Role::Ai, "First?"));
        s.record(message(Role::User, "Answer one"));
        s.record(message(Role::Ai, "Second?"));
        assert_eq!(s.transcript_tail(2), "User: Answer one\nAi: Second?");
        assert_eq!(s.transcript_tail(10).lines().count(), 3);
        assert_eq!(s.latest_user_answer(), None);
    }
}
