use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Generator, HistoryEntry};
use crate::config::GenerationConfig;
use crate::error::GenerationError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(
        &self,
        history: &[HistoryEntry],
        model: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError> {
        let request = build_request(history, config);

        tracing::debug!(model, turns = history.len(), "sending generateContent request");

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &body));
        }

        parse_response(&body)
    }
}

fn build_request<'a>(history: &'a [HistoryEntry], config: &GenerationConfig) -> GeminiRequest<'a> {
    GeminiRequest {
        contents: history
            .iter()
            .map(|entry| GeminiContent {
                role: entry.role.as_str(),
                parts: vec![GeminiPart { text: &entry.text }],
            })
            .collect(),
        generation_config: GeminiGenerationConfig {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        },
    }
}

fn parse_error(status: u16, body: &str) -> GenerationError {
    let message = serde_json::from_str::<GeminiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    GenerationError::Api { status, message }
}

fn parse_response(body: &str) -> Result<String, GenerationError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Parse(e.to_string()))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Blocked(reason));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(GenerationError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        if let Some(reason) = candidate.finish_reason.filter(|r| r == "SAFETY" || r == "RECITATION") {
            return Err(GenerationError::Blocked(reason));
        }
    }

    Ok(text)
}
