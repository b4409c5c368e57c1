//! Conversational assistant endpoint.
//!
//! `POST /api/rag/chat` accepts a multipart form with `user_query`,
//! `device_data`, `audio_file` and `language` fields — all optional except
//! that at least one of `user_query`/`audio_file` must be present. The
//! orchestration itself lives behind the assistant provider; this handler
//! only decodes the form and maps errors.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::Json,
};
use tracing::{debug, info};

use crate::core::assistant::{AssistantQuery, AudioUpload, ChatResponse};
use crate::core::locale::Language;
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;

/// Handler for the /api/rag/chat endpoint.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ChatResponse>> {
    let mut query = AssistantQuery::default();
    let mut language_tag: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_query") => {
                query.user_query = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            Some("device_data") => {
                query.device_data = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            Some("language") => {
                language_tag = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?,
                );
            }
            Some("audio_file") => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                query.audio = Some(AudioUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
            }
            other => {
                debug!(field = ?other, "ignoring unknown form field");
            }
        }
    }

    query.language = Language::from_tag(language_tag.as_deref());

    info!(
        language = %query.language,
        has_text = query.user_query.is_some(),
        has_audio = query.audio.is_some(),
        has_device_data = query.device_data.is_some(),
        "chat request received"
    );

    let response = state.assistant.answer(query).await?;
    Ok(Json(response))
}
