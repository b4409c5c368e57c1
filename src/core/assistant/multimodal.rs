//! Single-call multi-modal pipeline.
//!
//! Audio is carried inline in the generation request and the model is asked
//! for JSON matching a `{transcript, answer}` schema, so transcription and
//! answering collapse into one provider call. Inline prompts accept smaller
//! clips than the dedicated speech endpoint; the ceiling comes from config.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{validate, AssistantProvider, AssistantQuery, ChatResponse};
use crate::core::audio::AudioFormat;
use crate::core::context::build_sensor_context;
use crate::core::llm::{TextGenerator, UserPart};
use crate::errors::ApiError;

pub struct MultiModalAssistant {
    generator: Arc<dyn TextGenerator>,
    max_audio_bytes: usize,
}

impl MultiModalAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>, max_audio_bytes: usize) -> Self {
        Self {
            generator,
            max_audio_bytes,
        }
    }
}

/// Output schema enforced on audio requests, in the provider's OpenAPI
/// subset.
fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "transcript": {
                "type": "STRING",
                "description": "Speech-to-text transcription of the user's audio. Empty if no intelligible speech.",
            },
            "answer": {
                "type": "STRING",
                "description": "Assistant answer to the user's question.",
            },
        },
        "required": ["transcript", "answer"],
    })
}

#[async_trait::async_trait]
impl AssistantProvider for MultiModalAssistant {
    async fn answer(&self, query: AssistantQuery) -> Result<ChatResponse, ApiError> {
        validate(&query, self.max_audio_bytes)?;

        let locale = query.language.locale();
        let context = build_sensor_context(query.device_data.as_deref(), locale);
        let system_instruction = locale.system_instruction(&context);

        let user_query = query
            .user_query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        let Some(audio) = &query.audio else {
            // Text-only requests need neither the schema nor the transcript
            // instruction.
            let Some(question) = user_query else {
                return Err(ApiError::MissingInput);
            };
            info!(language = %query.language, "answering text chat request");
            let answer = self
                .generator
                .generate(
                    &system_instruction,
                    vec![UserPart::Text(question.to_string())],
                    None,
                )
                .await
                .map_err(|e| {
                    error!("generation failed: {e}");
                    ApiError::Provider(locale.provider_error.to_string())
                })?;
            return Ok(ChatResponse {
                transcript: String::new(),
                answer,
            });
        };

        let format = AudioFormat::from_mime(audio.content_type.as_deref());
        let mut parts = vec![UserPart::Text(locale.transcribe_instruction.to_string())];
        if let Some(text) = user_query {
            parts.push(UserPart::Text(text.to_string()));
        }
        parts.push(UserPart::Audio {
            mime_type: format.mime().to_string(),
            data: audio.bytes.clone(),
        });

        info!(
            language = %query.language,
            audio_bytes = audio.bytes.len(),
            "answering multi-modal chat request"
        );

        let raw = self
            .generator
            .generate(&system_instruction, parts, Some(response_schema()))
            .await
            .map_err(|e| {
                error!("generation failed: {e}");
                ApiError::Provider(locale.provider_error.to_string())
            })?;

        // The schema makes structured output the norm; still, fall back to
        // the raw text if the model returned something else.
        match serde_json::from_str::<ChatResponse>(&raw) {
            Ok(parsed) => Ok(parsed),
            Err(e) => {
                warn!("schema-enforced response did not parse: {e}");
                Ok(ChatResponse {
                    transcript: String::new(),
                    answer: raw,
                })
            }
        }
    }
}
