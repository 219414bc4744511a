pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Interview API
        .route("/api/v1/interviews", post(handlers::handle_start_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/feedback",
            post(handlers::handle_feedback),
        )
        // Session housekeeping
        .route("/api/v1/sessions", get(handlers::handle_list_sessions))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::context::HashingEmbedder;
    use crate::interview::testing::ScriptedGenerator;
    use crate::interview::{Interviewer, PromptComposer};
    use crate::session::{Phase, SessionStore};

    const BOUNDARY: &str = "interviewer-test-boundary";
    const RESUME: &str = "Backend engineer at Acme building Rust services and Kafka pipelines.";

    fn test_state() -> AppState {
        let embedder = Arc::new(HashingEmbedder::default());
        let store = Arc::new(SessionStore::new(embedder.clone()));
        let composer =
            PromptComposer::new(Arc::new(ScriptedGenerator::interview()), embedder, "Luna");
        AppState {
            interviewer: Arc::new(Interviewer::new(store, composer, 512)),
        }
    }

    struct Part<'a> {
        name: &'a str,
        filename: Option<&'a str>,
        data: &'a [u8],
    }

    fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part.filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        part.name
                    )
                    .as_bytes(),
                ),
            }
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/v1/interviews")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&test_state(), empty_request("GET", "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "interviewer");
    }

    #[tokio::test]
    async fn test_start_rejects_non_pdf_resume() {
        let state = test_state();
        let request = multipart_request(&[
            Part { name: "name", filename: None, data: b"Dana" },
            Part { name: "resume", filename: Some("resume.docx"), data: b"not a pdf" },
        ]);
        let (status, body) = send(&state, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(state.interviewer.list_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_start_requires_resume_field() {
        let request = multipart_request(&[Part { name: "name", filename: None, data: b"Dana" }]);
        let (status, _) = send(&test_state(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_with_unreadable_pdf_is_extraction_empty() {
        let request = multipart_request(&[
            Part { name: "name", filename: None, data: b"Dana" },
            Part { name: "resume", filename: Some("resume.pdf"), data: b"%PDF-garbage" },
        ]);
        let (status, body) = send(&test_state(), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_EMPTY");
    }

    #[tokio::test]
    async fn test_answer_unknown_session_is_404() {
        let request = json_request(
            "POST",
            "/api/v1/interviews/nope/answers",
            json!({"answer": "hello"}),
        );
        let (status, body) = send(&test_state(), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_answer_flow_through_router() {
        let state = test_state();
        let started = state
            .interviewer
            .start_session("Dana", RESUME, None)
            .await
            .unwrap();
        let uri = format!("/api/v1/interviews/{}/answers", started.session_id);

        let (status, body) =
            send(&state, json_request("POST", &uri, json!({"answer": "Great, thanks!"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_interview_over"], false);
        assert!(body["question"].as_str().unwrap().ends_with('?'));
        assert!(body.get("feedback").is_none());

        state
            .interviewer
            .store()
            .set_phase(&started.session_id, Phase::Closing)
            .unwrap();
        let (status, body) = send(&state, json_request("POST", &uri, json!({"answer": "nah"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_interview_over"], true);
        assert_eq!(body["feedback"], "Strong project answers. Score: 8/10.");
    }

    #[tokio::test]
    async fn test_feedback_before_closing_is_400() {
        let state = test_state();
        let started = state
            .interviewer
            .start_session("Dana", RESUME, None)
            .await
            .unwrap();
        let uri = format!("/api/v1/interviews/{}/feedback", started.session_id);

        let (status, _) = send(&state, empty_request("POST", &uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        state
            .interviewer
            .store()
            .set_phase(&started.session_id, Phase::Closing)
            .unwrap();
        let (status, body) = send(&state, empty_request("POST", &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_interview_over"], true);
    }

    #[tokio::test]
    async fn test_session_housekeeping() {
        let state = test_state();
        let (_, body) = send(&state, empty_request("GET", "/api/v1/sessions")).await;
        assert_eq!(body, json!({"sessions": []}));

        let started = state
            .interviewer
            .start_session("Dana", RESUME, Some("Streaming team."))
            .await
            .unwrap();
        let uri = format!("/api/v1/sessions/{}", started.session_id);

        let (status, body) = send(&state, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phase"], "greeting");
        assert_eq!(body["has_job_description"], true);

        let (status, _) = send(&state, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&state, empty_request("DELETE", &uri)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&state, empty_request("GET", &uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
