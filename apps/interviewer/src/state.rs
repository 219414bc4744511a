use std::sync::Arc;

use crate::interview::Interviewer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the session store, the prompt composer and the per-session turn locks.
    pub interviewer: Arc<Interviewer>,
}
