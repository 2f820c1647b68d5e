//! Meaning lookup endpoint

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::translation::resolve_meaning;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct MeaningResponse {
    /// Empty when every provider failed
    pub meaning: String,
}

/// GET /translation/:word_id
pub async fn get_meaning(
    State(state): State<AppState>,
    Path(word_id): Path<String>,
) -> ApiResult<Json<MeaningResponse>> {
    let meaning = resolve_meaning(&state.db, &state.meanings, &word_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Word not found".to_string()))?;

    Ok(Json(MeaningResponse { meaning }))
}

pub fn translation_routes() -> Router<AppState> {
    Router::new().route("/translation/:word_id", get(get_meaning))
}
