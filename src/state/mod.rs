//! Application state shared across request handlers.

use std::sync::Arc;

use anyhow::{Context, anyhow};

use crate::config::ServerConfig;
use crate::core::assistant::{
    AssistantProvider, AssistantVariant, MultiModalAssistant, TranscribeThenChatAssistant,
};
use crate::core::llm::{GeminiClient, GeminiConfig};
use crate::core::stt::{WhisperStt, WhisperSttConfig};
use crate::influx::{InfluxClient, InfluxConfig};

/// Application state that can be shared across handlers.
///
/// Built once at startup; every provider handle is read-only afterwards, so
/// cloning the `Arc` into concurrent requests is safe.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Time-series query client.
    pub influx: Arc<InfluxClient>,
    /// Deployment-selected assistant strategy.
    pub assistant: Arc<dyn AssistantProvider>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Arc<Self>> {
        let influx = Arc::new(InfluxClient::new(InfluxConfig {
            url: config.influx_url.clone(),
            token: config.influx_token.clone(),
            org: config.influx_org.clone(),
            bucket: config.influx_bucket.clone(),
        }));

        let assistant = build_assistant(&config)?;

        Ok(Arc::new(Self {
            config,
            influx,
            assistant,
        }))
    }

    /// Build the state around a caller-supplied assistant (used by tests to
    /// inject stub providers).
    pub fn with_assistant(
        config: ServerConfig,
        assistant: Arc<dyn AssistantProvider>,
    ) -> Arc<Self> {
        let influx = Arc::new(InfluxClient::new(InfluxConfig {
            url: config.influx_url.clone(),
            token: config.influx_token.clone(),
            org: config.influx_org.clone(),
            bucket: config.influx_bucket.clone(),
        }));
        Arc::new(Self {
            config,
            influx,
            assistant,
        })
    }
}

fn build_assistant(config: &ServerConfig) -> anyhow::Result<Arc<dyn AssistantProvider>> {
    let gemini = Arc::new(GeminiClient::new(GeminiConfig {
        api_key: config
            .gemini_api_key
            .clone()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY is required"))?,
        model: config.gemini_model.clone(),
        ..Default::default()
    }));

    match config.assistant_variant {
        AssistantVariant::TranscribeThenChat => {
            let stt = WhisperStt::new(WhisperSttConfig {
                api_url: config.whisper_api_url.clone(),
                api_key: config
                    .groq_api_key
                    .clone()
                    .ok_or_else(|| anyhow!("GROQ_API_KEY is required"))?,
                model: config.whisper_model.clone(),
                max_audio_bytes: config.max_audio_bytes,
            })
            .context("failed to build transcription adapter")?;
            Ok(Arc::new(TranscribeThenChatAssistant::new(
                Arc::new(stt),
                gemini,
                config.max_audio_bytes,
            )))
        }
        AssistantVariant::MultiModal => Ok(Arc::new(MultiModalAssistant::new(
            gemini,
            config.max_audio_bytes,
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_builds_selected_variant() {
        let config = ServerConfig::for_tests();
        assert!(AppState::new(config).is_ok());

        let mut config = ServerConfig::for_tests();
        config.assistant_variant = AssistantVariant::MultiModal;
        config.groq_api_key = None;
        assert!(AppState::new(config).is_ok());
    }

    #[test]
    fn test_transcribe_variant_requires_groq_key() {
        let mut config = ServerConfig::for_tests();
        config.groq_api_key = None;
        assert!(AppState::new(config).is_err());
    }
}
