use std::sync::Arc;

use sqlx::PgPool;

use crate::answers::session::SessionStore;
use crate::config::Config;
use crate::llm_client::{TextProvider, Transcriber};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Primary provider: question generation and first feedback opinion.
    pub gemini: Arc<dyn TextProvider>,
    /// Secondary feedback opinion.
    pub cohere: Arc<dyn TextProvider>,
    pub transcriber: Arc<dyn Transcriber>,
    /// In-memory answer sessions, keyed by user, interview and question.
    pub sessions: SessionStore,
    pub config: Config,
}
