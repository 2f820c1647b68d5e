//! Record toggle endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::toggle::{toggle_record, ToggleOutcome};
use crate::{ApiError, ApiResult, AppState};

/// `POST /records/toggle` body; camelCase keys are accepted too
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    #[serde(alias = "wordId")]
    pub word_id: Option<String>,
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
}

impl ToggleRequest {
    fn ids(&self) -> Option<(&str, &str)> {
        let word_id = self.word_id.as_deref().filter(|s| !s.is_empty())?;
        let session_id = self.session_id.as_deref().filter(|s| !s.is_empty())?;
        Some((word_id, session_id))
    }
}

/// POST /records/toggle
///
/// absent → success → fail → absent. Returns the record (with the word's new
/// priority) or `{deleted: true, priority}`.
pub async fn toggle(
    State(state): State<AppState>,
    payload: Result<Json<ToggleRequest>, JsonRejection>,
) -> ApiResult<Json<ToggleOutcome>> {
    let Json(payload) = payload?;
    let (word_id, session_id) = payload
        .ids()
        .ok_or_else(|| ApiError::BadRequest("wordId and sessionId required".to_string()))?;

    Ok(Json(toggle_record(&state.db, word_id, session_id).await?))
}

pub fn record_routes() -> Router<AppState> {
    Router::new().route("/records/toggle", post(toggle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_request_accepts_both_spellings() {
        let snake: ToggleRequest =
            serde_json::from_str(r#"{"word_id":"w","session_id":"s"}"#).unwrap();
        assert_eq!(snake.ids(), Some(("w", "s")));

        let camel: ToggleRequest = serde_json::from_str(r#"{"wordId":"w","sessionId":"s"}"#).unwrap();
        assert_eq!(camel.ids(), Some(("w", "s")));

        let partial: ToggleRequest = serde_json::from_str(r#"{"wordId":"w"}"#).unwrap();
        assert_eq!(partial.ids(), None);
    }
}
