//! Gemini `generateContent` provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::clean;
use super::{check_status, Meaning, MeaningProvider, MeaningStyle, ProviderError};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const NICKNAME_LABEL: &str = "부르는 말";
const DEFINITION_LABEL: &str = "간단한 뜻";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    style: MeaningStyle,
}

impl GeminiProvider {
    pub fn new(http: reqwest::Client, api_key: String, model: String, style: MeaningStyle) -> Self {
        Self {
            http,
            api_key,
            model,
            style,
        }
    }

    fn prompt(&self, word: &str) -> String {
        match self.style {
            MeaningStyle::Short => format!(
                "다음 영어 단어의 한국어 뜻을 초등학생이 이해할 수 있게 한 단어 또는 짧은 구로 답하세요.\n\
                 영어나 기호 없이 순수 한국어로만, 최대 15자.\n\
                 명사는 그대로, 동사는 \"~하다\", 형용사는 \"~한\" 형태로.\n\n\
                 단어: \"{}\"\n\n\
                 한국어 뜻:",
                word
            ),
            MeaningStyle::Definition => format!(
                "초등학교 3학년이 이해할 수 있는 단어 설명을 만드세요.\n\
                 아래 형식으로만 답하세요:\n\n\
                 단어: (영어 단어)\n\
                 {}: 단어를 쉽게 부르는 짧은 명사구\n\
                 {}: 쉬운 말로 된 1~2문장 설명\n\n\
                 [단어 입력: {}]",
                NICKNAME_LABEL, DEFINITION_LABEL, word
            ),
        }
    }

    async fn generate(&self, prompt: String) -> Result<String, ProviderError> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        tracing::debug!(model = %self.model, "Querying Gemini API");

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateResponse = check_status(response).await?.json().await?;
        Ok(parsed.text().trim().to_string())
    }
}

/// Turn a raw answer into a [`Meaning`] for `style`
pub fn parse_answer(raw: &str, style: MeaningStyle) -> Option<Meaning> {
    match style {
        MeaningStyle::Short => clean::clean_short_answer(raw).map(Meaning::plain),
        MeaningStyle::Definition => {
            let nickname = clean::pick_labeled(raw, NICKNAME_LABEL);
            let definition = clean::pick_labeled(raw, DEFINITION_LABEL);

            let meaning = definition
                .as_deref()
                .map(clean::sanitize)
                .filter(|m| !m.is_empty())
                .or_else(|| clean::clean_definition_fallback(raw))?;

            Some(Meaning {
                meaning,
                nickname,
                definition,
            })
        }
    }
}

#[async_trait]
impl MeaningProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn lookup(&self, word: &str) -> Result<Option<Meaning>, ProviderError> {
        let raw = self.generate(self.prompt(word)).await?;
        Ok(parse_answer(&raw, self.style))
    }
}
