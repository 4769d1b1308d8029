mod answers;
mod auth;
mod config;
mod db;
mod errors;
mod feedback;
mod interviews;
mod llm_client;
mod models;
mod normalize;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::answers::session::SessionStore;
use crate::config::Config;
use crate::db::{create_pool, init_schema};
use crate::llm_client::{build_http_client, CohereClient, GeminiClient, RetryPolicy};
use crate::routes::build_router;
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

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    init_schema(&db).await?;

    // Initialize LLM providers (one shared HTTP client)
    let http = build_http_client(Duration::from_secs(config.llm_timeout_secs))?;
    let retry = RetryPolicy::with_max_attempts(config.llm_max_attempts);

    let gemini = Arc::new(GeminiClient::new(
        http.clone(),
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
        retry.clone(),
    ));
    let cohere = Arc::new(CohereClient::new(
        http,
        config.cohere_api_key.clone(),
        config.cohere_model.clone(),
        config.cohere_api_base.clone(),
        retry,
    ));
    info!(
        "LLM providers initialized (gemini: {}, cohere: {}, attempts: {})",
        gemini.model(),
        cohere.model(),
        config.llm_max_attempts
    );
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; question generation and transcription will fail");
    }
    if config.cohere_api_key.is_none() {
        tracing::warn!("COHERE_API_KEY not set; Cohere feedback will be unavailable");
    }

    // Answer sessions, with idle ones swept out periodically
    let sessions = SessionStore::new();
    let max_idle = Duration::from_secs(config.session_idle_secs);
    let sweep_period = max_idle.clamp(Duration::from_secs(1), Duration::from_secs(60));
    sessions.spawn_sweeper(max_idle, sweep_period);
    info!("Answer sessions expire after {}s idle", config.session_idle_secs);

    // Build app state
    let state = AppState {
        db,
        gemini: gemini.clone(),
        cohere,
        transcriber: gemini,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
