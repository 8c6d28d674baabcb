use crate::adapters::schema::{
    additional_source_prompt, roster_schema, SYSTEM_INSTRUCTION, TASK_PROMPT,
};
use crate::domain::model::RosterDocument;
use crate::domain::ports::RosterExtractor;
use crate::domain::request::{data_url_payload, ExtractionRequest};
use crate::utils::error::{FailureKind, Result, RosterError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_THINKING_BUDGET: u32 = 32768;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const CREDENTIAL_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Service credential. Environment lookups happen at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Key(String),
    Env(Vec<String>),
}

impl Default for Credential {
    fn default() -> Self {
        Credential::Env(CREDENTIAL_ENV_VARS.iter().map(|v| v.to_string()).collect())
    }
}

impl Credential {
    pub fn resolve(&self) -> Option<String> {
        match self {
            Credential::Key(key) => Some(key.clone()).filter(|k| !k.trim().is_empty()),
            Credential::Env(vars) => vars
                .iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|value| !value.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    pub thinking_budget: u32,
    pub timeout: Duration,
    pub credential: Credential,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            thinking_budget: DEFAULT_THINKING_BUDGET,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            credential: Credential::default(),
        }
    }
}

impl GeminiConfig {
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<Cow<'a, str>>,
}

impl<'a> Part<'a> {
    fn text(text: impl Into<Cow<'a, str>>) -> Self {
        Self {
            inline_data: None,
            text: Some(text.into()),
        }
    }

    fn inline(mime_type: &'a str, data: &'a str) -> Self {
        Self {
            inline_data: Some(InlineData { mime_type, data }),
            text: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GenerateContentResponse {
    /// Answer text of the first candidate, thought summaries excluded.
    fn answer_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();
        Some(text).filter(|t| !t.trim().is_empty())
    }
}

/// Extraction client for the Gemini `generateContent` REST API.
pub struct GeminiExtractor {
    config: GeminiConfig,
    client: Client,
}

impl GeminiExtractor {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn build_body<'a>(&self, request: &'a ExtractionRequest) -> Result<GenerateContentRequest<'a>> {
        let mut parts = Vec::new();

        if let Some(file_data) = &request.file_data {
            let payload = data_url_payload(file_data).ok_or_else(|| {
                RosterError::extraction(
                    FailureKind::InvalidPayload,
                    "file data is not a base64 data URL",
                )
            })?;
            parts.push(Part::inline(&request.mime_type, payload));
        }
        if let Some(text) = &request.text_input {
            parts.push(Part::text(additional_source_prompt(text)));
        }
        parts.push(Part::text(TASK_PROMPT));

        Ok(GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(SYSTEM_INSTRUCTION)],
            },
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: roster_schema(),
                thinking_config: ThinkingConfig {
                    thinking_budget: self.config.thinking_budget,
                },
            },
        })
    }

    async fn request_roster(&self, request: &ExtractionRequest) -> Result<RosterDocument> {
        let api_key = self.config.credential.resolve().ok_or_else(|| {
            RosterError::extraction(FailureKind::MissingCredential, "no API key configured")
        })?;
        let body = self.build_body(request)?;
        let url = self.config.generate_url();

        tracing::debug!(
            "Sending extraction request to {} (file: {}, text: {})",
            url,
            request.file_data.is_some(),
            request.text_input.is_some()
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RosterError::extraction(FailureKind::Transport, e.to_string()))?;

        let status = response.status();
        tracing::debug!("Extraction service responded with {}", status);
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(500)
                .collect();
            return Err(RosterError::extraction(
                FailureKind::Service {
                    status: status.as_u16(),
                },
                detail,
            ));
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RosterError::extraction(FailureKind::MalformedJson, e.to_string()))?;
        let text = envelope.answer_text().ok_or_else(|| {
            RosterError::extraction(FailureKind::EmptyResponse, "the model returned no text")
        })?;

        RosterDocument::from_json(&text)
            .map_err(|e| RosterError::extraction(FailureKind::MalformedJson, e.to_string()))
    }
}

#[async_trait]
impl RosterExtractor for GeminiExtractor {
    async fn extract(&self, request: &ExtractionRequest) -> Result<RosterDocument> {
        self.request_roster(request).await.map_err(|e| {
            tracing::error!("Extraction service error: {}", e);
            match e {
                RosterError::Extraction { .. } => e,
                other => RosterError::extraction(FailureKind::Transport, other.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::StagedFile;

    fn extractor() -> GeminiExtractor {
        GeminiExtractor::new(GeminiConfig {
            credential: Credential::Key("test-key".to_string()),
            ..GeminiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn body_orders_file_text_then_task() {
        let file = StagedFile::from_bytes("roster.pdf", b"%PDF");
        let request = ExtractionRequest::new(Some(&file), Some("R1 05:05 13:20"));
        let extractor = extractor();
        let body = serde_json::to_value(extractor.build_body(&request).unwrap()).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "JVBERg==");
        assert_eq!(parts[1]["text"], "Additional roster source: R1 05:05 13:20");
        assert_eq!(parts[2]["text"], TASK_PROMPT);
        assert_eq!(body["contents"][0]["role"], "user");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["generationConfig"]["thinkingConfig"]["thinkingBudget"], 32768);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn rejects_file_data_that_is_not_a_data_url() {
        let request = ExtractionRequest {
            file_data: Some("%PDF raw bytes".to_string()),
            text_input: None,
            mime_type: "application/pdf".to_string(),
        };
        let err = extractor().build_body(&request).unwrap_err();
        assert!(matches!(
            err,
            RosterError::Extraction {
                kind: FailureKind::InvalidPayload,
                ..
            }
        ));
    }

    #[test]
    fn answer_text_skips_thought_parts() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "thinking about it", "thought": true},
                        {"text": "{\"seriesLabel\":"},
                        {"text": "\"S\"}"}
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(envelope.answer_text().unwrap(), "{\"seriesLabel\":\"S\"}");
    }

    #[test]
    fn empty_candidates_have_no_answer() {
        let envelope: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(envelope.answer_text().is_none());
    }

    #[test]
    fn generate_url_tolerates_trailing_slash() {
        let config = GeminiConfig {
            endpoint: "http://localhost:9999/v1beta/".to_string(),
            model: "m".to_string(),
            ..GeminiConfig::default()
        };
        assert_eq!(
            config.generate_url(),
            "http://localhost:9999/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn explicit_blank_key_does_not_resolve() {
        assert_eq!(Credential::Key("  ".to_string()).resolve(), None);
        assert_eq!(Credential::Key("k".to_string()).resolve(), Some("k".to_string()));
    }
}
