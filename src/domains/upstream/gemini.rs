//! Google Generative Language (Gemini) text generation client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{HttpClient, TextGenerator};
use crate::core::config::GenerationConfig;
use crate::domains::tools::{ToolError, ToolResult};

const SERVICE: &str = "Gemini";

/// The key never goes in the query string.
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: SamplingConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplingConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, empty when absent.
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default()
    }
}

/// Gemini `generateContent` client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: HttpClient,
    base_url: String,
    config: GenerationConfig,
}

impl GeminiClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn generate_text(&self, prompt: &str) -> ToolResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ToolError::configuration("GEMINI_API_KEY not configured"))?;

        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: SamplingConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let request = self
            .http
            .post(&self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&body);

        let response: GenerateContentResponse = self.http.send_json(SERVICE, request).await?;
        let text = response.into_text();
        debug!(text_len = text.len(), "Generation finished");
        Ok(text)
    }
}
