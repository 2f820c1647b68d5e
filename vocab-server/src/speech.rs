//! Text-to-speech proxy
//!
//! Synthesizes MP3 audio through the Google Cloud Text-to-Speech REST API
//! (`text:synthesize`), authenticated with an API key.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use vocab_common::config::TtsConfig;

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum SpeechError {
    /// No API key configured
    #[error("Text-to-speech is not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Voice selection for a language code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceConfig {
    pub language_code: &'static str,
    pub name: &'static str,
    pub speaking_rate: f64,
}

impl VoiceConfig {
    /// `ko`/`kr` (any case) get the Korean voice, slightly slower; anything else English
    pub fn for_lang(lang: &str) -> Self {
        match lang.trim().to_lowercase().as_str() {
            "ko" | "kr" => Self {
                language_code: "ko-KR",
                name: "ko-KR-Wavenet-A",
                speaking_rate: 0.85,
            },
            _ => Self {
                language_code: "en-US",
                name: "en-US-Wavenet-D",
                speaking_rate: 0.9,
            },
        }
    }
}

/// Speech synthesis backend
#[async_trait]
pub trait SpeechSynth: Send + Sync {
    /// MP3 audio for `text` spoken with `voice`
    async fn synthesize(&self, text: &str, voice: VoiceConfig) -> Result<Vec<u8>, SpeechError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

/// Google Cloud Text-to-Speech client
pub struct GoogleTts {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleTts {
    pub fn new(endpoint: String, api_key: String) -> Result<Self, SpeechError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| SpeechError::NetworkError(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    /// Client from config, `NotConfigured` without an API key
    pub fn from_config(config: &TtsConfig) -> Result<Self, SpeechError> {
        let key = config
            .api_key
            .as_deref()
            .filter(|k| vocab_common::config::is_valid_key(k))
            .ok_or(SpeechError::NotConfigured)?;
        Self::new(config.endpoint.clone(), key.to_string())
    }
}

fn request_body(text: &str, voice: VoiceConfig) -> serde_json::Value {
    json!({
        "input": { "text": text },
        "voice": {
            "languageCode": voice.language_code,
            "name": voice.name,
        },
        "audioConfig": {
            "audioEncoding": "MP3",
            "speakingRate": voice.speaking_rate,
        },
    })
}

fn decode_audio(response: &SynthesizeResponse) -> Result<Vec<u8>, SpeechError> {
    STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| SpeechError::ParseError(format!("Invalid audioContent: {}", e)))
}

#[async_trait]
impl SpeechSynth for GoogleTts {
    async fn synthesize(&self, text: &str, voice: VoiceConfig) -> Result<Vec<u8>, SpeechError> {
        tracing::debug!(voice = voice.name, "Requesting speech synthesis");

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body(text, voice))
            .send()
            .await
            .map_err(|e| SpeechError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SpeechError::ApiError(status.as_u16(), error_text));
        }

        let parsed: SynthesizeResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::ParseError(e.to_string()))?;

        decode_audio(&parsed)
    }
}
