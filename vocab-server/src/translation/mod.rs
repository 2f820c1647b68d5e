//! Korean meaning lookup
//!
//! A [`MeaningChain`] asks each [`MeaningProvider`] in turn and keeps the
//! first usable answer. Providers never fail the whole lookup: errors are
//! logged and the next provider is tried.

pub mod clean;
pub mod gemini;
pub mod libretranslate;
pub mod mymemory;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::SqlitePool;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use vocab_common::config::TranslationConfig;
use vocab_common::time;

use crate::db::words;

pub use gemini::GeminiProvider;
pub use libretranslate::LibreTranslateProvider;
pub use mymemory::MyMemoryProvider;

const USER_AGENT: &str = concat!("vocab-server/", env!("CARGO_PKG_VERSION"));

/// Provider request timeout
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Translation provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network communication error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider returned an error status
    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    /// Response body was not what the provider documents
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::ParseError(err.to_string())
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

/// What kind of answer to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeaningStyle {
    /// One Korean word or short phrase, for the table
    #[default]
    Short,
    /// Nickname plus a one or two sentence definition, for batch population
    Definition,
}

/// A cleaned lookup result
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Meaning {
    pub meaning: String,
    pub nickname: Option<String>,
    pub definition: Option<String>,
}

impl Meaning {
    pub fn plain(meaning: impl Into<String>) -> Self {
        Self {
            meaning: meaning.into(),
            ..Default::default()
        }
    }
}

/// One translation backend
#[async_trait]
pub trait MeaningProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Look up `word`; `Ok(None)` means the provider had no usable answer
    async fn lookup(&self, word: &str) -> Result<Option<Meaning>, ProviderError>;
}

/// Ordered fallback chain of providers
#[derive(Default)]
pub struct MeaningChain {
    providers: Vec<Box<dyn MeaningProvider>>,
}

impl MeaningChain {
    pub fn new(providers: Vec<Box<dyn MeaningProvider>>) -> Self {
        Self { providers }
    }

    /// Gemini (only with an API key), then LibreTranslate, then MyMemory
    pub fn from_config(config: &TranslationConfig, style: MeaningStyle) -> Result<Self, ProviderError> {
        let http = http_client()?;
        let mut providers: Vec<Box<dyn MeaningProvider>> = Vec::new();

        match config.gemini_api_key.as_deref().filter(|k| vocab_common::config::is_valid_key(k)) {
            Some(key) => providers.push(Box::new(GeminiProvider::new(
                http.clone(),
                key.to_string(),
                config.gemini_model.clone(),
                style,
            ))),
            None => info!("Gemini API key not configured, using machine translation only"),
        }

        providers.push(Box::new(LibreTranslateProvider::new(
            http.clone(),
            config.libretranslate_url.clone(),
            style,
        )));
        providers.push(Box::new(MyMemoryProvider::new(
            http,
            config.mymemory_url.clone(),
            style,
        )));

        Ok(Self::new(providers))
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// First usable answer from the chain
    pub async fn lookup(&self, word: &str) -> Option<Meaning> {
        for provider in &self.providers {
            match provider.lookup(word).await {
                Ok(Some(meaning)) if !meaning.meaning.trim().is_empty() => {
                    debug!(word = %word, provider = provider.name(), "Meaning found");
                    return Some(meaning);
                }
                Ok(_) => {
                    debug!(word = %word, provider = provider.name(), "No usable answer");
                }
                Err(e) => {
                    warn!(word = %word, provider = provider.name(), "Lookup failed: {}", e);
                }
            }
        }
        None
    }
}

/// Shared HTTP client for the providers
pub fn http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ProviderError::NetworkError(e.to_string()))
}

/// Fail on a non-success status, keeping the body for the error message
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(ProviderError::ApiError(status.as_u16(), body))
    }
}

/// Cleaning shared by the machine translation providers
pub(crate) fn clean_machine(text: &str, style: MeaningStyle) -> Option<Meaning> {
    let mut cleaned = clean::simplify_machine(text);
    if style == MeaningStyle::Definition {
        cleaned = clean::sanitize(&cleaned);
    }
    (!cleaned.is_empty()).then(|| Meaning::plain(cleaned))
}

/// Cached meaning for a word, looked up through `chain` and stored when missing.
///
/// Returns `None` when the word does not exist and an empty string when
/// every provider failed (nothing is stored then).
pub async fn resolve_meaning(
    pool: &SqlitePool,
    chain: &MeaningChain,
    word_id: &str,
) -> vocab_common::Result<Option<String>> {
    let Some(word) = words::get_word(pool, word_id).await? else {
        return Ok(None);
    };

    if let Some(cached) = word.cached_meaning() {
        return Ok(Some(cached.to_string()));
    }

    match chain.lookup(&word.text).await {
        Some(found) => {
            words::set_meaning(
                pool,
                &word.id,
                &found.meaning,
                found.nickname.as_deref(),
                found.definition.as_deref(),
                &time::now_rfc3339(),
            )
            .await?;
            info!(word = %word.text, meaning = %found.meaning, "Cached meaning");
            Ok(Some(found.meaning))
        }
        None => Ok(Some(String::new())),
    }
}
