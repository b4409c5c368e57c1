//! Assistant orchestration.
//!
//! Two strategies implement the same [`AssistantProvider`] interface and are
//! selected per deployment by configuration, never by duplicating routes:
//!
//! - [`TranscribeThenChatAssistant`] transcribes uploaded audio with a
//!   dedicated speech endpoint, then asks the generation model the resulting
//!   question.
//! - [`MultiModalAssistant`] sends the audio inline to a multi-modal
//!   generation model in a single call with an enforced output schema.

mod multimodal;
mod transcribe_then_chat;

pub use multimodal::MultiModalAssistant;
pub use transcribe_then_chat::TranscribeThenChatAssistant;

use serde::{Deserialize, Serialize};

use crate::core::locale::Language;
use crate::errors::ApiError;

/// Fully parsed chat request, independent of the HTTP form encoding.
#[derive(Debug, Clone, Default)]
pub struct AssistantQuery {
    pub user_query: Option<String>,
    /// Raw `device_data` form value; parsed leniently by the context builder.
    pub device_data: Option<String>,
    pub audio: Option<AudioUpload>,
    pub language: Language,
}

/// An uploaded audio clip with its declared content type.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Response shape of the chat endpoint. Both fields are always present;
/// `transcript` is empty when no audio was processed or nothing intelligible
/// was heard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub transcript: String,
    pub answer: String,
}

/// The assistant capability exposed to the HTTP layer.
#[async_trait::async_trait]
pub trait AssistantProvider: Send + Sync {
    async fn answer(&self, query: AssistantQuery) -> Result<ChatResponse, ApiError>;
}

/// Deployment-selected orchestration strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssistantVariant {
    #[default]
    TranscribeThenChat,
    MultiModal,
}

impl std::fmt::Display for AssistantVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssistantVariant::TranscribeThenChat => write!(f, "transcribe"),
            AssistantVariant::MultiModal => write!(f, "multimodal"),
        }
    }
}

impl std::str::FromStr for AssistantVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transcribe" | "transcribe-then-chat" => Ok(AssistantVariant::TranscribeThenChat),
            "multimodal" | "multi-modal" => Ok(AssistantVariant::MultiModal),
            other => Err(format!(
                "unsupported assistant variant: {other}. Supported variants: transcribe, multimodal"
            )),
        }
    }
}

/// Input checks shared by both strategies.
fn validate(query: &AssistantQuery, max_audio_bytes: usize) -> Result<(), ApiError> {
    let has_text = query
        .user_query
        .as_deref()
        .is_some_and(|q| !q.trim().is_empty());
    if !has_text && query.audio.is_none() {
        return Err(ApiError::MissingInput);
    }
    if let Some(audio) = &query.audio {
        if audio.bytes.is_empty() {
            return Err(ApiError::EmptyAudio);
        }
        if audio.bytes.len() > max_audio_bytes {
            return Err(ApiError::AudioTooLarge);
        }
    }
    Ok(())
}
