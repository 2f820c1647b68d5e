//! Vocabulary drill tracker server
//!
//! Words, dated practice sessions and per-session pass/fail records behind a
//! small JSON API, plus meaning lookup and text-to-speech proxies.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod bulk;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod pagination;
pub mod speech;
pub mod table;
pub mod toggle;
pub mod translation;
pub mod view;

pub use error::{ApiError, ApiResult};

use speech::SpeechSynth;
use translation::MeaningChain;

/// Request body limit for JSON endpoints
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Provider chain for `/translation`
    pub meanings: Arc<MeaningChain>,
    /// `None` when no text-to-speech key is configured
    pub speech: Option<Arc<dyn SpeechSynth>>,
}

impl AppState {
    pub fn new(db: SqlitePool, meanings: MeaningChain, speech: Option<Arc<dyn SpeechSynth>>) -> Self {
        Self {
            db,
            meanings: Arc::new(meanings),
            speech,
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::ui_routes())
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::word_routes())
        .merge(api::session_routes())
        .merge(api::record_routes())
        .merge(api::table_routes())
        .merge(api::translation_routes())
        .merge(api::speech_routes())
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
