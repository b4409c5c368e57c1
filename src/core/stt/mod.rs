//! Speech-to-text adapters.
//!
//! Providers sit behind the [`SpeechToText`] trait and return explicit
//! `Result`s; callers pattern-match instead of relying on exceptions
//! escaping the boundary.

mod whisper;

pub use whisper::{WhisperStt, WhisperSttConfig};

use crate::core::audio::AudioFormat;
use crate::core::locale::Language;

/// Error types for transcription calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SttError {
    #[error("audio payload is empty")]
    EmptyAudio,
    #[error("audio payload exceeds the {limit}-byte limit")]
    AudioTooLarge { limit: usize },
    #[error("provider error: {0}")]
    ProviderError(String),
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}

/// Batch speech-to-text capability.
///
/// `language` biases transcription accuracy; it does not restrict which
/// languages of speech are accepted.
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Language,
    ) -> Result<String, SttError>;
}
