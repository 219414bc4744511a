//! Interview State Machine: decides, per submitted answer, what the recruiter
//! says next and where the interview moves.
//!
//! Flow per turn:
//! 1. Closing / awaiting a candidate question: terminate on "no"-style replies,
//!    answer candidate questions, otherwise fall through.
//! 2. First turn after the greeting: résumé-grounded first response, enter `project`.
//! 3. Under the question budget: follow-up, advance by question count.
//! 4. Budget spent: wrap-up question, enter `closing`, await candidate questions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::anyhow;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::DocumentContext;
use crate::errors::AppError;
use crate::interview::classifier::{is_candidate_question, is_termination_signal};
use crate::interview::composer::PromptComposer;
use crate::session::{Phase, Role, Session, SessionStore, SessionSummary};

/// Follow-ups stop once this many AI questions have been asked.
pub const MAX_QUESTIONS: usize = 12;

pub const CLOSING_LINE: &str = "Thanks for your time! Here's your feedback below.";

#[derive(Debug, Clone, Serialize)]
pub struct StartedInterview {
    pub session_id: String,
    pub question: String,
}

/// Result of one submitted answer.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub is_interview_over: bool,
}

impl TurnOutcome {
    fn next(question: String) -> Self {
        Self {
            question,
            feedback: None,
            is_interview_over: false,
        }
    }
}

pub struct Interviewer {
    store: Arc<SessionStore>,
    composer: PromptComposer,
    chunk_size: usize,
    /// One async mutex per session; turns on the same session run one at a time.
    turn_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Interviewer {
    pub fn new(store: Arc<SessionStore>, composer: PromptComposer, chunk_size: usize) -> Self {
        Self {
            store,
            composer,
            chunk_size,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    fn turn_lock(&self, session_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.turn_locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(session_id.to_string()).or_default())
    }

    fn require_session(&self, session_id: &str) -> Result<(), AppError> {
        if self.store.contains(session_id) {
            Ok(())
        } else {
            Err(AppError::SessionNotFound(session_id.to_string()))
        }
    }

    fn snapshot(&self, session_id: &str) -> Result<Session, AppError> {
        self.store
            .snapshot(session_id)
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    /// Indexes the documents, registers the session and logs the greeting.
    pub async fn start_session(
        &self,
        user_name: &str,
        resume_text: &str,
        job_description: Option<&str>,
    ) -> Result<StartedInterview, AppError> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(AppError::Validation("Candidate name is required".to_string()));
        }
        if resume_text.trim().is_empty() {
            return Err(AppError::ExtractionEmpty);
        }

        let embedder = self.store.embedder();
        let resume = DocumentContext::build(resume_text, self.chunk_size, embedder);
        if !resume.is_indexed() {
            return Err(AppError::Internal(anyhow!("Failed to create index for resume")));
        }
        let job_description = job_description
            .map(|jd| DocumentContext::build(jd, self.chunk_size, embedder))
            .unwrap_or_default();

        let session_id = Uuid::new_v4().to_string();
        info!(
            "Starting interview {session_id} for {user_name}: {} resume chunks, {} job description chunks",
            resume.chunk_count(),
            job_description.chunk_count()
        );
        self.store
            .create(&session_id, user_name, resume, job_description);

        let question = self.composer.greeting(user_name).await;
        self.store.append_message(&session_id, Role::Ai, &question);

        Ok(StartedInterview {
            session_id,
            question,
        })
    }

    /// Processes one candidate answer. Unknown ids fail before anything is touched.
    pub async fn submit_answer(
        &self,
        session_id: &str,
        answer: &str,
    ) -> Result<TurnOutcome, AppError> {
        self.require_session(session_id)?;

        let lock = self.turn_lock(session_id);
        let _turn = lock.lock().await;

        // deleted while we waited
        self.require_session(session_id)?;
        if !self.store.is_active(session_id) {
            return Err(AppError::Validation(
                "Interview is over; request feedback instead".to_string(),
            ));
        }

        let history_was_empty = self.store.message_count(session_id) == 0;
        self.store.append_message(session_id, Role::User, answer);

        let phase = self.store.phase(session_id);
        if phase == Phase::Closing || self.store.is_awaiting_candidate_question(session_id) {
            if is_termination_signal(answer) {
                return self.finish(session_id).await;
            }
            if is_candidate_question(answer) {
                let session = self.snapshot(session_id)?;
                let reply = self.composer.answer_candidate(&session, answer).await;
                self.store.set_phase(session_id, Phase::Closing)?;
                self.store.append_message(session_id, Role::Ai, &reply);
                self.store.mark_awaiting_candidate_question(session_id, true);
                debug!("Answered candidate question in session {session_id}");
                return Ok(TurnOutcome::next(reply));
            }
        }

        let session = self.snapshot(session_id)?;
        let question = if history_was_empty || phase == Phase::Greeting {
            let reply = self.composer.first_response(&session, answer).await;
            self.store.set_phase(session_id, Phase::Project)?;
            reply
        } else if should_continue(&session) {
            let reply = self.composer.follow_up(&session).await;
            let question_count = session.question_count();
            let mut next = Phase::for_question_count(question_count + 1);
            if next < phase {
                warn!("Phase table gave {next} after {phase}; keeping {phase}");
                next = phase;
            }
            self.store.set_phase(session_id, next)?;
            reply
        } else {
            let reply = self.composer.end_of_interview().await;
            self.store.set_phase(session_id, Phase::Closing)?;
            self.store.mark_awaiting_candidate_question(session_id, true);
            reply
        };

        self.store.append_message(session_id, Role::Ai, &question);
        debug!(
            "Session {session_id}: asked \"{question}\", phase now {}",
            self.store.phase(session_id)
        );
        Ok(TurnOutcome::next(question))
    }

    async fn finish(&self, session_id: &str) -> Result<TurnOutcome, AppError> {
        self.store.mark_complete(session_id);
        let session = self.snapshot(session_id)?;
        let feedback = self.composer.feedback(&session).await;
        info!("Interview {session_id} finished after {} questions", session.question_count());
        Ok(TurnOutcome {
            question: CLOSING_LINE.to_string(),
            feedback: Some(feedback),
            is_interview_over: true,
        })
    }

    /// Feedback on demand; only once the interview has reached closing.
    pub async fn fetch_feedback(&self, session_id: &str) -> Result<String, AppError> {
        let session = self.snapshot(session_id)?;
        if session.history.is_empty() || session.phase != Phase::Closing {
            return Err(AppError::Validation("Interview not completed".to_string()));
        }
        Ok(self.composer.feedback(&session).await)
    }

    pub fn list_sessions(&self) -> Vec<String> {
        self.store.list_ids()
    }

    pub fn session_summary(&self, session_id: &str) -> Result<SessionSummary, AppError> {
        self.store
            .summary(session_id)
            .ok_or_else(|| AppError::SessionNotFound(session_id.to_string()))
    }

    /// Idempotent. Returns whether a session was removed.
    pub fn delete_session(&self, session_id: &str) -> bool {
        self.turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        self.store.delete(session_id)
    }
}

fn should_continue(session: &Session) -> bool {
    (session.phase != Phase::Closing || session.awaiting_candidate_question)
        && session.question_count() < MAX_QUESTIONS
}
