mod config;
mod context;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod session;
mod state;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::context::HashingEmbedder;
use crate::interview::{Interviewer, PromptComposer};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interviewer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Embedder shared by the index builder and the composer
    let embedder = Arc::new(HashingEmbedder::default());
    let store = Arc::new(SessionStore::new(embedder.clone()));

    let composer = PromptComposer::new(Arc::new(llm), embedder, config.recruiter_name.clone());
    info!("Recruiter persona: {}", composer.recruiter_name());

    let state = AppState {
        interviewer: Arc::new(Interviewer::new(store, composer, config.chunk_size)),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&config.allowed_origins)),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS restricted to the configured origins. Unparseable entries are skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {origin}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
