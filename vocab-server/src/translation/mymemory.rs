//! MyMemory provider (last resort, free tier)

use async_trait::async_trait;
use serde::Deserialize;

use super::{check_status, clean_machine, Meaning, MeaningProvider, MeaningStyle, ProviderError};

/// Quota-exceeded answers start with this instead of a translation
const QUOTA_WARNING: &str = "MYMEMORY WARNING";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetResponse {
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    #[serde(default)]
    translated_text: String,
}

pub struct MyMemoryProvider {
    http: reqwest::Client,
    url: String,
    style: MeaningStyle,
}

impl MyMemoryProvider {
    pub fn new(http: reqwest::Client, url: String, style: MeaningStyle) -> Self {
        Self { http, url, style }
    }
}

/// Translated text, or `None` for an empty or quota warning answer
fn usable_text(response: &GetResponse) -> Option<&str> {
    let text = response.response_data.as_ref()?.translated_text.trim();
    (!text.is_empty() && !text.starts_with(QUOTA_WARNING)).then_some(text)
}

#[async_trait]
impl MeaningProvider for MyMemoryProvider {
    fn name(&self) -> &'static str {
        "mymemory"
    }

    async fn lookup(&self, word: &str) -> Result<Option<Meaning>, ProviderError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("q", word), ("langpair", "en|ko")])
            .send()
            .await?;
        let parsed: GetResponse = check_status(response).await?.json().await?;

        Ok(usable_text(&parsed).and_then(|text| clean_machine(text, self.style)))
    }
}
