//! Text-to-speech endpoint

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::error;

use crate::speech::VoiceConfig;
use crate::{ApiError, ApiResult, AppState};

const AUDIO_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Deserialize)]
pub struct SpeechQuery {
    #[serde(default)]
    pub text: String,
    /// `ko`/`kr` for Korean, English otherwise
    #[serde(default)]
    pub lang: String,
}

fn tts_error() -> ApiError {
    ApiError::Internal("TTS error".to_string())
}

/// GET /tts?text=&lang=
pub async fn synthesize(
    State(state): State<AppState>,
    Query(query): Query<SpeechQuery>,
) -> ApiResult<Response> {
    let text = query.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("No text".to_string()));
    }

    let Some(synth) = state.speech.as_ref() else {
        error!("Speech requested but no text-to-speech API key is configured");
        return Err(tts_error());
    };

    let audio = synth
        .synthesize(text, VoiceConfig::for_lang(&query.lang))
        .await
        .map_err(|e| {
            error!("Speech synthesis failed: {}", e);
            tts_error()
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, "audio/mpeg"),
            (header::CACHE_CONTROL, AUDIO_CACHE_CONTROL),
        ],
        audio,
    )
        .into_response())
}

pub fn speech_routes() -> Router<AppState> {
    Router::new().route("/tts", get(synthesize))
}
