//! Session endpoints
//!
//! Only one session is open at a time; see [`crate::lifecycle`].

use axum::{
    extract::State,
    routing::{delete, post},
    Json, Router,
};
use vocab_common::db::Session;
use vocab_common::time;

use crate::db::sessions;
use crate::lifecycle::{self, DeleteOutcome};
use crate::{ApiResult, AppState};

/// POST /sessions
///
/// Posts the open session and opens the next one for today.
pub async fn open_session(State(state): State<AppState>) -> ApiResult<Json<Session>> {
    let session = lifecycle::open_new_session(&state.db, time::today()).await?;
    Ok(Json(session))
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Vec<Session>>> {
    Ok(Json(sessions::list_sessions(&state.db).await?))
}

/// DELETE /sessions/current
///
/// Response is `{deleted, reopened}` or, when no posted session was left,
/// `{deleted, created}`.
pub async fn delete_current(State(state): State<AppState>) -> ApiResult<Json<DeleteOutcome>> {
    let outcome = lifecycle::delete_current_session(&state.db, time::today()).await?;
    Ok(Json(outcome))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(open_session).get(list_sessions))
        .route("/sessions/current", delete(delete_current))
}
