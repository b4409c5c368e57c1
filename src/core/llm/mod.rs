//! Text-generation provider client.
//!
//! One [`GeminiClient`] is constructed at startup and shared read-only across
//! requests; the underlying `reqwest::Client` pools connections internally.

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Favor deterministic answers over creative ones.
const TEMPERATURE: f32 = 0.2;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Error types for generation calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Http(String),
    #[error("generation API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("generation API returned no text")]
    EmptyResponse,
}

/// One part of the user turn.
#[derive(Debug, Clone)]
pub enum UserPart {
    Text(String),
    /// Raw audio carried inline; encoded as base64 on the wire.
    Audio { mime_type: String, data: Vec<u8> },
}

/// Text-generation capability, kept behind a trait so orchestrators can be
/// exercised against stubs.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text from a system instruction and user parts.
    ///
    /// When `response_schema` is set, the provider is asked to emit JSON
    /// matching that schema instead of free-form text.
    async fn generate(
        &self,
        system_instruction: &str,
        parts: Vec<UserPart>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    /// API base, overridable for tests against a mock server.
    pub api_base: String,
    pub max_output_tokens: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

// Wire format for `models/{model}:generateContent`.

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl From<UserPart> for Part {
    fn from(part: UserPart) -> Self {
        match part {
            UserPart::Text(text) => Part {
                text: Some(text),
                inline_data: None,
            },
            UserPart::Audio { mime_type, data } => Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type,
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                }),
            },
        }
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_base.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        parts: Vec<UserPart>,
        response_schema: Option<serde_json::Value>,
    ) -> Result<String, GenerationError> {
        let wire_parts = parts.into_iter().map(Part::from).collect();

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: wire_parts,
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_instruction.to_string()),
                    inline_data: None,
                }],
            },
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: response_schema.as_ref().map(|_| "application/json"),
                response_schema,
            },
        };

        debug!(model = %self.config.model, "sending generation request");

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Http(format!("malformed response: {e}")))?;

        parsed
            .candidates
            .and_then(|mut candidates| {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.remove(0).content
                }
            })
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().find_map(|p| p.text))
            .filter(|text| !text.is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}
