use std::env;

use super::{ServerConfig, MULTIMODAL_MAX_AUDIO_BYTES, TRANSCRIBE_MAX_AUDIO_BYTES};
use crate::core::assistant::AssistantVariant;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
const DEFAULT_WHISPER_API_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads configuration from environment variables with sensible defaults,
    /// loading a `.env` file first if one is present.
    ///
    /// # Errors
    /// Returns an error if:
    /// - a numeric variable is malformed
    /// - a required InfluxDB setting is missing
    /// - the selected assistant variant has no API key configured
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // Server configuration
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid port number: {e}"))?;
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        // InfluxDB configuration
        let influx_url = require("INFLUXDB_URL")?;
        let influx_token = require("INFLUXDB_TOKEN")?;
        let influx_org = require("INFLUXDB_ORG")?;
        let influx_bucket = require("INFLUXDB_BUCKET")?;
        let influx_measurement = require("INFLUXDB_MEASUREMENT")?;

        // Provider configuration
        let gemini_api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let groq_api_key = env::var("GROQ_API_KEY").ok().filter(|k| !k.is_empty());
        let whisper_api_url =
            env::var("WHISPER_API_URL").unwrap_or_else(|_| DEFAULT_WHISPER_API_URL.to_string());
        let whisper_model =
            env::var("WHISPER_MODEL").unwrap_or_else(|_| "whisper-large-v3".to_string());

        // Assistant orchestration
        let assistant_variant = match env::var("ASSISTANT_VARIANT") {
            Ok(value) => value.parse::<AssistantVariant>()?,
            Err(_) => AssistantVariant::default(),
        };
        let default_ceiling = match assistant_variant {
            AssistantVariant::TranscribeThenChat => TRANSCRIBE_MAX_AUDIO_BYTES,
            AssistantVariant::MultiModal => MULTIMODAL_MAX_AUDIO_BYTES,
        };
        let max_audio_bytes = match env::var("MAX_AUDIO_BYTES") {
            Ok(value) => value
                .parse::<usize>()
                .map_err(|e| format!("Invalid MAX_AUDIO_BYTES: {e}"))?,
            Err(_) => default_ceiling,
        };

        // The generation model is used by both variants; transcription only
        // by the transcribe variant.
        if gemini_api_key.is_none() {
            return Err("GEMINI_API_KEY must be set".into());
        }
        if assistant_variant == AssistantVariant::TranscribeThenChat && groq_api_key.is_none() {
            return Err(
                "GROQ_API_KEY must be set when ASSISTANT_VARIANT=transcribe (the default)".into(),
            );
        }

        Ok(ServerConfig {
            host,
            port,
            allowed_origins,
            influx_url,
            influx_token,
            influx_org,
            influx_bucket,
            influx_measurement,
            gemini_api_key,
            gemini_model,
            groq_api_key,
            whisper_api_url,
            whisper_model,
            assistant_variant,
            max_audio_bytes,
        })
    }
}

fn require(name: &str) -> Result<String, String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("{name} must be set"))
}
