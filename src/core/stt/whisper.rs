//! Whisper transcription over the OpenAI-compatible REST API.
//!
//! Targets Groq's hosted `audio/transcriptions` endpoint by default, but any
//! OpenAI-compatible deployment works by overriding `api_url`.

use reqwest::multipart;
use serde::Deserialize;
use tracing::debug;

use super::{SpeechToText, SttError};
use crate::core::audio::AudioFormat;
use crate::core::locale::Language;

/// Dedicated speech endpoints accept larger clips than inline prompts.
pub const DEFAULT_MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "whisper-large-v3";

/// Configuration for the Whisper transcription adapter.
#[derive(Debug, Clone)]
pub struct WhisperSttConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Upload ceiling in bytes; checked before any network call.
    pub max_audio_bytes: usize,
}

impl Default for WhisperSttConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            max_audio_bytes: DEFAULT_MAX_AUDIO_BYTES,
        }
    }
}

pub struct WhisperStt {
    config: WhisperSttConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperStt {
    pub fn new(config: WhisperSttConfig) -> Result<Self, SttError> {
        if config.api_key.is_empty() {
            return Err(SttError::ConfigurationError(
                "transcription API key is required".to_string(),
            ));
        }
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait::async_trait]
impl SpeechToText for WhisperStt {
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Language,
    ) -> Result<String, SttError> {
        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }
        if audio.len() > self.config.max_audio_bytes {
            return Err(SttError::AudioTooLarge {
                limit: self.config.max_audio_bytes,
            });
        }

        let part = multipart::Part::bytes(audio.to_vec())
            .file_name(format!("audio.{}", format.extension()))
            .mime_str(format.mime())
            .map_err(|e| SttError::ProviderError(e.to_string()))?;

        let form = multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("language", language.code())
            .text("response_format", "json");

        debug!(
            bytes = audio.len(),
            format = %format,
            language = %language,
            "sending audio for transcription"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SttError::ProviderError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SttError::ProviderError(e.to_string()))?;

        if !status.is_success() {
            return Err(SttError::ProviderError(format!(
                "transcription API returned {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| SttError::InvalidResponse(format!("{e}: {body}")))?;

        Ok(parsed.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(max_audio_bytes: usize) -> WhisperStt {
        WhisperStt::new(WhisperSttConfig {
            api_key: "test-key".to_string(),
            max_audio_bytes,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = WhisperStt::new(WhisperSttConfig::default());
        assert!(matches!(result, Err(SttError::ConfigurationError(_))));
    }

    #[tokio::test]
    async fn test_empty_audio_is_rejected_before_any_request() {
        let stt = adapter(DEFAULT_MAX_AUDIO_BYTES);
        let result = stt.transcribe(&[], AudioFormat::Wav, Language::En).await;
        assert!(matches!(result, Err(SttError::EmptyAudio)));
    }

    #[tokio::test]
    async fn test_oversized_audio_is_rejected_before_any_request() {
        let stt = adapter(16);
        let audio = vec![0u8; 17];
        let result = stt.transcribe(&audio, AudioFormat::Wav, Language::En).await;
        assert!(matches!(result, Err(SttError::AudioTooLarge { limit: 16 })));
    }
}
