//! Session Store: in-memory registry of interview sessions.
//!
//! Single source of truth for phase, history and tracking fields. Mutations on
//! an unknown id are no-ops and reads return defaults; callers that need the
//! session to exist check `contains` first and surface `SessionNotFound`.
//!
//! The map sits behind an `RwLock`. No lock is held while similarity search
//! runs, and never across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, error};

use crate::context::{extract_keywords, DocumentContext, Embedder};
use crate::errors::AppError;
use crate::session::models::{Message, MessageContext, Phase, Role, Session, SessionSummary};

/// Similarity hits stored per message, per document.
const MESSAGE_CONTEXT_HITS: usize = 3;

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    embedder: Arc<dyn Embedder>,
}

impl SessionStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            embedder,
        }
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.embedder.as_ref()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<T>(&self, session_id: &str, f: impl FnOnce(&Session) -> T) -> Option<T> {
        self.read().get(session_id).map(f)
    }

    fn update_session(&self, session_id: &str, f: impl FnOnce(&mut Session)) -> bool {
        match self.write().get_mut(session_id) {
            Some(session) => {
                f(session);
                true
            }
            None => false,
        }
    }

    pub fn create(
        &self,
        session_id: &str,
        user_name: &str,
        resume: DocumentContext,
        job_description: DocumentContext,
    ) {
        let session = Session::new(user_name.to_string(), resume, job_description);
        self.write().insert(session_id.to_string(), session);
        debug!("Created session: {session_id}");
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.read().contains_key(session_id)
    }

    /// Current phase; `Greeting` for unknown sessions.
    pub fn phase(&self, session_id: &str) -> Phase {
        self.with_session(session_id, |s| s.phase)
            .unwrap_or(Phase::Greeting)
    }

    /// Moves the session to `phase`. Staying put or moving forward is allowed;
    /// moving back is a broken transition table and fails with `InvalidPhase`.
    pub fn set_phase(&self, session_id: &str, phase: Phase) -> Result<(), AppError> {
        let mut sessions = self.write();
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(());
        };
        if phase < session.phase {
            error!(
                "Invalid phase transition {} -> {} for session {session_id}",
                session.phase, phase
            );
            return Err(AppError::InvalidPhase(format!(
                "{} -> {} is not a forward transition",
                session.phase, phase
            )));
        }
        session.phase = phase;
        debug!("Set phase: {phase} for session: {session_id}");
        Ok(())
    }

    /// Logs a message. Keywords and similarity context are computed here, once,
    /// from the message content.
    pub fn append_message(&self, session_id: &str, role: Role, content: &str) {
        let Some((resume, job_description)) = self.with_session(session_id, |s| {
            (Arc::clone(&s.resume), Arc::clone(&s.job_description))
        }) else {
            error!("Session {session_id} not found");
            return;
        };

        let message = Message {
            role,
            content: content.to_string(),
            keywords: extract_keywords(content),
            context: MessageContext {
                resume: resume.search(content, self.embedder(), MESSAGE_CONTEXT_HITS),
                job_description: job_description.search(
                    content,
                    self.embedder(),
                    MESSAGE_CONTEXT_HITS,
                ),
            },
            created_at: Utc::now(),
        };

        self.update_session(session_id, |session| {
            if session.record(message) {
                debug!(
                    "Added to asked_topics: {}",
                    content.chars().take(50).collect::<String>()
                );
            }
        });
        debug!(
            "Logged {:?}: {}",
            role,
            content.chars().take(50).collect::<String>()
        );
    }

    pub fn message_count(&self, session_id: &str) -> usize {
        self.with_session(session_id, |s| s.history.len())
            .unwrap_or(0)
    }

    /// Point-in-time copy of the whole session, for prompt composition.
    pub fn snapshot(&self, session_id: &str) -> Option<Session> {
        self.with_session(session_id, Session::clone)
    }

    /// Terminal: the interview is over and no further questions are generated.
    pub fn mark_complete(&self, session_id: &str) {
        if self.update_session(session_id, |s| {
            s.is_active = false;
            s.awaiting_candidate_question = false;
        }) {
            debug!("Marked interview over: {session_id}");
        }
    }

    pub fn mark_awaiting_candidate_question(&self, session_id: &str, awaiting: bool) {
        if self.update_session(session_id, |s| s.awaiting_candidate_question = awaiting) {
            debug!("Awaiting candidate question: {awaiting} for session: {session_id}");
        }
    }

    pub fn is_awaiting_candidate_question(&self, session_id: &str) -> bool {
        self.with_session(session_id, |s| s.awaiting_candidate_question)
            .unwrap_or(false)
    }

    pub fn is_active(&self, session_id: &str) -> bool {
        self.with_session(session_id, |s| s.is_active)
            .unwrap_or(false)
    }

    /// Returns `true` if a session was removed.
    pub fn delete(&self, session_id: &str) -> bool {
        let removed = self.write().remove(session_id).is_some();
        if removed {
            debug!("Cleared session: {session_id}");
        }
        removed
    }

    /// All session ids, oldest first.
    pub fn list_ids(&self) -> Vec<String> {
        let sessions = self.read();
        let mut entries: Vec<(&String, &Session)> = sessions.iter().collect();
        entries.sort_by(|a, b| a.1.created_at.cmp(&b.1.created_at).then(a.0.cmp(b.0)));
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn summary(&self, session_id: &str) -> Option<SessionSummary> {
        self.with_session(session_id, |s| SessionSummary {
            session_id: session_id.to_string(),
            user_name: s.user_name.clone(),
            phase: s.phase,
            is_active: s.is_active,
            awaiting_candidate_question: s.awaiting_candidate_question,
            question_count: s.question_count(),
            short_answer_count: s.short_answer_count,
            message_count: s.history.len(),
            has_job_description: s.job_description.is_indexed(),
            created_at: s.created_at,
        })
    }
}

/// Single-field reads. The state machine works from snapshots, so not every
/// accessor has a caller in the service itself.
#[allow(dead_code)]
impl SessionStore {
    pub fn history(&self, session_id: &str) -> Vec<Message> {
        self.with_session(session_id, |s| s.history.clone())
            .unwrap_or_default()
    }

    pub fn user_name(&self, session_id: &str) -> String {
        self.with_session(session_id, |s| s.user_name.clone())
            .unwrap_or_default()
    }

    pub fn short_answer_count(&self, session_id: &str) -> u32 {
        self.with_session(session_id, |s| s.short_answer_count)
            .unwrap_or(0)
    }

    pub fn asked_topics(&self, session_id: &str) -> Vec<String> {
        self.with_session(session_id, |s| s.asked_topics.clone())
            .unwrap_or_default()
    }

    pub fn question_count(&self, session_id: &str) -> usize {
        self.with_session(session_id, Session::question_count)
            .unwrap_or(0)
    }

    pub fn resume_context(&self, session_id: &str) -> Arc<DocumentContext> {
        self.with_session(session_id, |s| Arc::clone(&s.resume))
            .unwrap_or_default()
    }

    pub fn job_description_context(&self, session_id: &str) -> Arc<DocumentContext> {
        self.with_session(session_id, |s| Arc::clone(&s.job_description))
            .unwrap_or_default()
    }
}
