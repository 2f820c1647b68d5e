//! Word endpoints
//!
//! - `POST /words` add one word
//! - `GET /words` list all words, hidden ones included
//! - `DELETE /words/:id` delete a word and its records
//! - `POST /words/bulk` import `ALPHABET | word | level` lines
//! - `PATCH /words/:id/priority|bookmark|active` per-word flags

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{delete, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use vocab_common::db::{Level, Word};
use vocab_common::{time, uuid_utils};

use crate::bulk::{import_bulk, BulkSummary};
use crate::db::words;
use crate::{ApiError, ApiResult, AppState};

/// `POST /words` body
#[derive(Debug, Deserialize)]
pub struct CreateWordRequest {
    pub text: Option<String>,
    pub level: Option<Level>,
    pub alphabet: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriorityRequest {
    pub delta: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ActiveRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct PriorityResponse {
    pub success: bool,
    pub priority: i64,
}

#[derive(Debug, Serialize)]
pub struct BookmarkResponse {
    pub success: bool,
    pub bookmarked: bool,
}

#[derive(Debug, Serialize)]
pub struct ActiveResponse {
    pub success: bool,
    pub active: bool,
}

fn word_not_found() -> ApiError {
    ApiError::NotFound("Word not found".to_string())
}

/// Non-blank text from an optional body field
fn required_text(text: Option<&str>) -> ApiResult<&str> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No text".to_string()))
}

/// POST /words
pub async fn create_word(
    State(state): State<AppState>,
    payload: Result<Json<CreateWordRequest>, JsonRejection>,
) -> ApiResult<Json<Word>> {
    let Json(payload) = payload?;
    let text = required_text(payload.text.as_deref())?;
    let now = time::now_rfc3339();

    let word = Word {
        id: uuid_utils::generate_string(),
        text: text.to_lowercase(),
        alphabet: payload
            .alphabet
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_uppercase),
        level: payload.level.unwrap_or_default(),
        priority: 0,
        bookmarked: false,
        active: true,
        meaning: None,
        nickname: None,
        definition: None,
        source: "manual".to_string(),
        created_at: now.clone(),
        updated_at: now,
    };

    words::insert_word(&state.db, &word).await?;
    info!(word = %word.text, level = %word.level, "Word added");

    Ok(Json(word))
}

/// GET /words
pub async fn list_words(State(state): State<AppState>) -> ApiResult<Json<Vec<Word>>> {
    Ok(Json(words::list_words(&state.db, false).await?))
}

/// DELETE /words/:id
pub async fn delete_word(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    if !words::delete_word(&state.db, &id).await? {
        return Err(word_not_found());
    }

    info!(word_id = %id, "Word deleted");
    Ok(Json(SuccessResponse { success: true }))
}

/// POST /words/bulk
pub async fn bulk_import(
    State(state): State<AppState>,
    payload: Result<Json<BulkRequest>, JsonRejection>,
) -> ApiResult<Json<BulkSummary>> {
    let Json(payload) = payload?;
    let text = required_text(payload.text.as_deref())?;

    Ok(Json(import_bulk(&state.db, text).await?))
}

/// Whole-number delta from a JSON number; fractional deltas are rounded
fn parse_delta(value: Option<&Value>) -> ApiResult<i64> {
    value
        .and_then(Value::as_f64)
        .filter(|d| d.is_finite())
        .map(|d| d.round() as i64)
        .ok_or_else(|| ApiError::BadRequest("delta must be a number".to_string()))
}

/// PATCH /words/:id/priority
pub async fn adjust_priority(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PriorityRequest>, JsonRejection>,
) -> ApiResult<Json<PriorityResponse>> {
    let Json(payload) = payload?;
    let delta = parse_delta(payload.delta.as_ref())?;

    let priority = words::adjust_priority(&state.db, &id, delta, &time::now_rfc3339())
        .await?
        .ok_or_else(word_not_found)?;

    Ok(Json(PriorityResponse {
        success: true,
        priority,
    }))
}

/// PATCH /words/:id/bookmark
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BookmarkResponse>> {
    let bookmarked = words::toggle_bookmark(&state.db, &id, &time::now_rfc3339())
        .await?
        .ok_or_else(word_not_found)?;

    Ok(Json(BookmarkResponse {
        success: true,
        bookmarked,
    }))
}

/// PATCH /words/:id/active
pub async fn set_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ActiveRequest>, JsonRejection>,
) -> ApiResult<Json<ActiveResponse>> {
    let Json(payload) = payload?;

    if !words::set_active(&state.db, &id, payload.active, &time::now_rfc3339()).await? {
        return Err(word_not_found());
    }

    Ok(Json(ActiveResponse {
        success: true,
        active: payload.active,
    }))
}

/// Build word routes
pub fn word_routes() -> Router<AppState> {
    Router::new()
        .route("/words", post(create_word).get(list_words))
        .route("/words/bulk", post(bulk_import))
        .route("/words/:id", delete(delete_word))
        .route("/words/:id/priority", patch(adjust_priority))
        .route("/words/:id/bookmark", patch(toggle_bookmark))
        .route("/words/:id/active", patch(set_active))
}
