//! LibreTranslate provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{check_status, clean_machine, Meaning, MeaningProvider, MeaningStyle, ProviderError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    #[serde(default)]
    translated_text: String,
}

pub struct LibreTranslateProvider {
    http: reqwest::Client,
    url: String,
    style: MeaningStyle,
}

impl LibreTranslateProvider {
    pub fn new(http: reqwest::Client, url: String, style: MeaningStyle) -> Self {
        Self { http, url, style }
    }
}

#[async_trait]
impl MeaningProvider for LibreTranslateProvider {
    fn name(&self) -> &'static str {
        "libretranslate"
    }

    async fn lookup(&self, word: &str) -> Result<Option<Meaning>, ProviderError> {
        let body = json!({
            "q": word,
            "source": "en",
            "target": "ko",
            "format": "text",
        });

        let response = self.http.post(&self.url).json(&body).send().await?;
        let parsed: TranslateResponse = check_status(response).await?.json().await?;

        Ok(clean_machine(&parsed.translated_text, self.style))
    }
}
