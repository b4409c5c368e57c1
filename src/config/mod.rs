//! Configuration for the parksense server.
//!
//! Configuration is environment-driven (a `.env` file is honored in
//! development). [`ServerConfig::from_env`] applies defaults, parses typed
//! values, and validates that the selected assistant variant has the
//! credentials it needs.

mod env;

use crate::core::assistant::AssistantVariant;

/// Inline-prompt audio ceiling used by the multi-modal variant.
pub const MULTIMODAL_MAX_AUDIO_BYTES: usize = 18 * 1024 * 1024;
/// Dedicated speech-endpoint ceiling used by the transcribe variant.
pub const TRANSCRIBE_MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,

    // InfluxDB settings
    pub influx_url: String,
    pub influx_token: String,
    pub influx_org: String,
    pub influx_bucket: String,
    pub influx_measurement: String,

    // Generation provider
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,

    // Transcription provider (used by the transcribe variant only)
    pub groq_api_key: Option<String>,
    pub whisper_api_url: String,
    pub whisper_model: String,

    // Assistant orchestration
    pub assistant_variant: AssistantVariant,
    /// Audio upload ceiling in bytes; defaults depend on the variant.
    pub max_audio_bytes: usize,
}

impl ServerConfig {
    /// Get the server address as a string in "host:port" form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_formatting() {
        let mut config = ServerConfig::for_tests();
        config.host = "0.0.0.0".to_string();
        config.port = 8000;
        assert_eq!(config.address(), "0.0.0.0:8000");
    }
}

impl ServerConfig {
    /// Minimal configuration used by the test suites.
    #[doc(hidden)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            influx_url: "http://localhost:8086".to_string(),
            influx_token: "test-token".to_string(),
            influx_org: "test-org".to_string(),
            influx_bucket: "test-bucket".to_string(),
            influx_measurement: "weather".to_string(),
            gemini_api_key: Some("test-key".to_string()),
            gemini_model: "gemini-2.5-flash".to_string(),
            groq_api_key: Some("test-key".to_string()),
            whisper_api_url: "http://localhost:9000/transcribe".to_string(),
            whisper_model: "whisper-large-v3".to_string(),
            assistant_variant: AssistantVariant::TranscribeThenChat,
            max_audio_bytes: TRANSCRIBE_MAX_AUDIO_BYTES,
        }
    }
}
