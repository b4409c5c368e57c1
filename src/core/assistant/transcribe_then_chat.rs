//! Transcribe-then-generate pipeline.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::{validate, AssistantProvider, AssistantQuery, ChatResponse};
use crate::core::audio::AudioFormat;
use crate::core::context::build_sensor_context;
use crate::core::llm::{TextGenerator, UserPart};
use crate::core::stt::{SpeechToText, SttError};
use crate::errors::ApiError;

/// Default pipeline: audio goes to a dedicated speech endpoint first, and the
/// resulting transcript (or the typed text) is answered by the generation
/// model.
pub struct TranscribeThenChatAssistant {
    stt: Arc<dyn SpeechToText>,
    generator: Arc<dyn TextGenerator>,
    max_audio_bytes: usize,
}

impl TranscribeThenChatAssistant {
    pub fn new(
        stt: Arc<dyn SpeechToText>,
        generator: Arc<dyn TextGenerator>,
        max_audio_bytes: usize,
    ) -> Self {
        Self {
            stt,
            generator,
            max_audio_bytes,
        }
    }
}

#[async_trait::async_trait]
impl AssistantProvider for TranscribeThenChatAssistant {
    async fn answer(&self, query: AssistantQuery) -> Result<ChatResponse, ApiError> {
        validate(&query, self.max_audio_bytes)?;

        let locale = query.language.locale();
        let context = build_sensor_context(query.device_data.as_deref(), locale);

        let mut transcript = String::new();
        if let Some(audio) = &query.audio {
            let format = AudioFormat::from_mime(audio.content_type.as_deref());
            transcript = match self
                .stt
                .transcribe(&audio.bytes, format, query.language)
                .await
            {
                Ok(text) if !text.is_empty() => text,
                Ok(_) => {
                    warn!("transcription returned no text");
                    locale.unable_to_transcribe.to_string()
                }
                Err(SttError::EmptyAudio) => return Err(ApiError::EmptyAudio),
                Err(SttError::AudioTooLarge { .. }) => return Err(ApiError::AudioTooLarge),
                Err(e) => {
                    error!("transcription failed: {e}");
                    locale.unable_to_transcribe.to_string()
                }
            };
        }

        let understood = !transcript.is_empty() && transcript != locale.unable_to_transcribe;
        let question = if understood {
            Some(transcript.clone())
        } else {
            query
                .user_query
                .clone()
                .filter(|q| !q.trim().is_empty())
        };

        // Audio was accepted but unintelligible and there is no typed
        // fallback; this is a soft failure, not an error.
        let Some(question) = question else {
            return Ok(ChatResponse {
                transcript: String::new(),
                answer: locale.retry_answer.to_string(),
            });
        };

        info!(
            language = %query.language,
            from_audio = understood,
            "answering chat request"
        );

        let system_instruction = locale.system_instruction(&context);
        let answer = self
            .generator
            .generate(&system_instruction, vec![UserPart::Text(question)], None)
            .await
            .map_err(|e| {
                error!("generation failed: {e}");
                ApiError::Provider(locale.provider_error.to_string())
            })?;

        Ok(ChatResponse {
            transcript: if understood { transcript } else { String::new() },
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assistant::AudioUpload;
    use crate::core::llm::GenerationError;
    use crate::core::locale::Language;
    use std::sync::Mutex;

    struct StubStt {
        result: Result<String, SttError>,
    }

    #[async_trait::async_trait]
    impl SpeechToText for StubStt {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _format: AudioFormat,
            _language: Language,
        ) -> Result<String, SttError> {
            self.result.clone()
        }
    }

    #[derive(Default)]
    struct StubGenerator {
        seen_system: Mutex<Option<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(
            &self,
            system_instruction: &str,
            _parts: Vec<UserPart>,
            _response_schema: Option<serde_json::Value>,
        ) -> Result<String, GenerationError> {
            *self.seen_system.lock().unwrap() = Some(system_instruction.to_string());
            if self.fail {
                Err(GenerationError::EmptyResponse)
            } else {
                Ok("stub answer".to_string())
            }
        }
    }

    fn assistant(
        stt_result: Result<String, SttError>,
        generator: Arc<StubGenerator>,
    ) -> TranscribeThenChatAssistant {
        TranscribeThenChatAssistant::new(
            Arc::new(StubStt { result: stt_result }),
            generator,
            1024,
        )
    }

    fn audio_query() -> AssistantQuery {
        AssistantQuery {
            audio: Some(AudioUpload {
                bytes: vec![0u8; 16],
                content_type: Some("audio/wav".to_string()),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_text_only_query_has_empty_transcript() {
        let generator = Arc::new(StubGenerator::default());
        let assistant = assistant(Ok(String::new()), generator.clone());
        let response = assistant
            .answer(AssistantQuery {
                user_query: Some("What is the temperature in Z1?".to_string()),
                device_data: Some(r#"[{"device_id":"Z1","temperature":21.3,"humidity":55}]"#.into()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(response.transcript, "");
        assert_eq!(response.answer, "stub answer");

        let system = generator.seen_system.lock().unwrap().clone().unwrap();
        assert!(system.contains("Temperature: 21.3°C"));
        assert!(system.contains("Humidity: 55%"));
    }

    #[tokio::test]
    async fn test_transcript_becomes_effective_query() {
        let generator = Arc::new(StubGenerator::default());
        let assistant = assistant(Ok("how warm is it".to_string()), generator);
        let response = assistant.answer(audio_query()).await.unwrap();
        assert_eq!(response.transcript, "how warm is it");
        assert_eq!(response.answer, "stub answer");
    }

    #[tokio::test]
    async fn test_failed_transcription_falls_back_to_typed_text() {
        let generator = Arc::new(StubGenerator::default());
        let assistant = assistant(
            Err(SttError::ProviderError("down".to_string())),
            generator,
        );
        let mut query = audio_query();
        query.user_query = Some("typed question".to_string());
        let response = assistant.answer(query).await.unwrap();
        // The marker transcript never surfaces to the caller.
        assert_eq!(response.transcript, "");
        assert_eq!(response.answer, "stub answer");
    }

    #[tokio::test]
    async fn test_unintelligible_audio_without_text_is_soft_failure() {
        let generator = Arc::new(StubGenerator::default());
        let assistant = assistant(Ok(String::new()), generator.clone());
        let response = assistant.answer(audio_query()).await.unwrap();
        assert_eq!(response.transcript, "");
        assert_eq!(response.answer, Language::En.locale().retry_answer);
        // The generation provider is never called.
        assert!(generator.seen_system.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_generation_failure_maps_to_provider_error() {
        let generator = Arc::new(StubGenerator {
            fail: true,
            ..Default::default()
        });
        let assistant = assistant(Ok(String::new()), generator);
        let result = assistant
            .answer(AssistantQuery {
                user_query: Some("hello".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(
            result,
            Err(ApiError::Provider(
                Language::En.locale().provider_error.to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_unknown_language_produces_english_prompt() {
        let generator = Arc::new(StubGenerator::default());
        let assistant = assistant(Ok(String::new()), generator.clone());
        assistant
            .answer(AssistantQuery {
                user_query: Some("ciao".to_string()),
                language: Language::from_tag(Some("fr")),
                ..Default::default()
            })
            .await
            .unwrap();
        let system = generator.seen_system.lock().unwrap().clone().unwrap();
        assert!(system.contains(Language::En.locale().data_header));
    }
}
