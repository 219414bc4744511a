//! Axum route handlers for the Interview API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::extract::extract_document_text;
use crate::errors::AppError;
use crate::interview::TurnOutcome;
use crate::session::SessionSummary;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub question: String,
    pub is_interview_over: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub is_interview_over: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<String>,
}

/// Fields of the start-interview form.
#[derive(Default)]
struct StartInterviewForm {
    name: Option<String>,
    resume: Option<(String, Bytes)>,
    job_description: Option<String>,
}

fn multipart_error(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!(
        "Invalid form data: {e}. Send multipart/form-data with 'name', 'resume' (PDF) and optional 'job_description'"
    ))
}

async fn read_start_form(multipart: &mut Multipart) -> Result<StartInterviewForm, AppError> {
    let mut form = StartInterviewForm::default();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => form.name = Some(field.text().await.map_err(multipart_error)?),
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                form.resume = Some((filename, data));
            }
            "job_description" => {
                form.job_description = Some(field.text().await.map_err(multipart_error)?)
            }
            other => debug!("Ignoring unexpected form field '{other}'"),
        }
    }
    Ok(form)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Multipart form: `name`, `resume` (PDF file), optional `job_description`.
/// Extracts the résumé text, opens a session and returns the greeting.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let form = read_start_form(&mut multipart).await?;

    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("'name' is required".to_string()))?;
    let (filename, data) = form
        .resume
        .ok_or_else(|| AppError::Validation("'resume' file is required".to_string()))?;
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("Resume must be a PDF file".to_string()));
    }

    // empty text is rejected by start_session as ExtractionEmpty
    let resume_text = extract_document_text(data).await;
    let job_description = form.job_description.filter(|jd| !jd.trim().is_empty());
    let started = state
        .interviewer
        .start_session(&name, &resume_text, job_description.as_deref())
        .await?;

    Ok(Json(StartInterviewResponse {
        session_id: started.session_id,
        question: started.question,
        is_interview_over: false,
    }))
}

/// POST /api/v1/interviews/:id/answers
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<TurnOutcome>, AppError> {
    let outcome = state
        .interviewer
        .submit_answer(&session_id, &request.answer)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/interviews/:id/feedback
///
/// Only legal once the interview has reached the closing phase.
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<FeedbackResponse>, AppError> {
    let feedback = state.interviewer.fetch_feedback(&session_id).await?;
    Ok(Json(FeedbackResponse {
        feedback,
        is_interview_over: true,
    }))
}

/// GET /api/v1/sessions
pub async fn handle_list_sessions(State(state): State<AppState>) -> Json<SessionListResponse> {
    Json(SessionListResponse {
        sessions: state.interviewer.list_sessions(),
    })
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, AppError> {
    Ok(Json(state.interviewer.session_summary(&session_id)?))
}

/// DELETE /api/v1/sessions/:id
///
/// Idempotent: deleting an unknown session is still 204.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> StatusCode {
    state.interviewer.delete_session(&session_id);
    StatusCode::NO_CONTENT
}
