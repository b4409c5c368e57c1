//! Provider adapters exercised against mock HTTP servers.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parksense::core::assistant::{AssistantProvider, AssistantQuery, ChatResponse};
use parksense::core::audio::AudioFormat;
use parksense::core::llm::{
    GeminiClient, GeminiConfig, GenerationError, TextGenerator, UserPart,
};
use parksense::core::locale::Language;
use parksense::core::stt::{SpeechToText, SttError, WhisperStt, WhisperSttConfig};
use parksense::errors::ApiError;
use parksense::{AppState, ServerConfig, routes};

fn whisper_against(server: &MockServer) -> WhisperStt {
    WhisperStt::new(WhisperSttConfig {
        api_url: format!("{}/openai/v1/audio/transcriptions", server.uri()),
        api_key: "test-key".to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn gemini_against(server: &MockServer) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: "test-key".to_string(),
        api_base: server.uri(),
        ..Default::default()
    })
}

#[tokio::test]
async fn test_whisper_transcribes_and_trims() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/v1/audio/transcriptions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "  hello world \n"})))
        .expect(1)
        .mount(&server)
        .await;

    let stt = whisper_against(&server);
    let transcript = stt
        .transcribe(&[1u8; 128], AudioFormat::Mp3, Language::En)
        .await
        .unwrap();

    assert_eq!(transcript, "hello world");
}

#[tokio::test]
async fn test_whisper_provider_error_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let stt = whisper_against(&server);
    let result = stt
        .transcribe(&[1u8; 128], AudioFormat::Wav, Language::It)
        .await;

    match result {
        Err(SttError::ProviderError(msg)) => assert!(msg.contains("500")),
        other => panic!("expected ProviderError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_whisper_rejects_oversized_audio_without_calling_provider() {
    let server = MockServer::start().await;
    // No mock mounted: any request would 404 and fail differently.
    let stt = WhisperStt::new(WhisperSttConfig {
        api_url: format!("{}/openai/v1/audio/transcriptions", server.uri()),
        api_key: "test-key".to_string(),
        max_audio_bytes: 64,
        ..Default::default()
    })
    .unwrap();

    let result = stt
        .transcribe(&[0u8; 65], AudioFormat::Wav, Language::En)
        .await;
    assert!(matches!(result, Err(SttError::AudioTooLarge { limit: 64 })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_gemini_returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/models/.*:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "21.3°C in Z1"}],
                    "role": "model"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = gemini_against(&server);
    let answer = client
        .generate("system", vec![UserPart::Text("question".to_string())], None)
        .await
        .unwrap();

    assert_eq!(answer, "21.3°C in Z1");
}

#[tokio::test]
async fn test_gemini_api_error_carries_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
        .mount(&server)
        .await;

    let client = gemini_against(&server);
    let result = client
        .generate("system", vec![UserPart::Text("question".to_string())], None)
        .await;

    match result {
        Err(GenerationError::Api { status, body }) => {
            assert_eq!(status, 429);
            assert!(body.contains("quota"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_empty_candidates_is_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = gemini_against(&server);
    let result = client
        .generate("system", vec![UserPart::Text("question".to_string())], None)
        .await;

    assert!(matches!(result, Err(GenerationError::EmptyResponse)));
}

// Forecast endpoint end-to-end against a mock InfluxDB.

const TALL_CSV: &str = "\
#datatype,string,long,dateTime:RFC3339,string,double\n\
#group,false,false,false,true,false\n\
#default,_result,,,,\n\
,result,table,_time,_field,_value\n\
,_result,0,2025-06-01T12:00:00Z,temperature,20\n\
,_result,0,2025-06-01T12:00:00Z,humidity,50\n\
,_result,1,2025-06-01T12:05:00Z,temperature,21\n";

struct NoopAssistant;

#[async_trait::async_trait]
impl AssistantProvider for NoopAssistant {
    async fn answer(&self, _query: AssistantQuery) -> Result<ChatResponse, ApiError> {
        Ok(ChatResponse {
            transcript: String::new(),
            answer: String::new(),
        })
    }
}

fn forecast_app(influx_url: String) -> axum::Router {
    let mut config = ServerConfig::for_tests();
    config.influx_url = influx_url;
    let allowed_origins = config.allowed_origins.clone();
    let app_state = AppState::with_assistant(config, Arc::new(NoopAssistant));
    routes::api::create_api_router(1024, &allowed_origins).with_state(app_state)
}

#[tokio::test]
async fn test_forecast_reshapes_tall_records_to_wide_points() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TALL_CSV))
        .expect(1)
        .mount(&server)
        .await;

    let app = forecast_app(server.uri());
    let request = Request::builder()
        .uri("/api/weather/forecast?minutes=60")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let points: serde_json::Value = serde_json::from_slice(&body).unwrap();

    let list = points.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["temperature"], 20.0);
    assert_eq!(list[0]["humidity"], 50.0);
    assert_eq!(list[1]["temperature"], 21.0);
    assert!(list[1].get("humidity").is_none());
    assert!(list[0]["time"].as_str().unwrap() < list[1]["time"].as_str().unwrap());
}

#[tokio::test]
async fn test_forecast_influx_failure_is_internal_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    let app = forecast_app(server.uri());
    let request = Request::builder()
        .uri("/api/weather/forecast")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    // The Influx failure detail stays server-side.
    assert_eq!(json["detail"], "Internal server error.");
}
