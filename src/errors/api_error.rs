use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// User-facing error taxonomy for the HTTP API.
///
/// `Provider` carries an already-localized, non-sensitive message; the
/// underlying cause is logged where the failure happened. `Internal` keeps
/// its detail server-side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("Send either user_query or audio_file.")]
    MissingInput,
    #[error("audio_file is empty.")]
    EmptyAudio,
    #[error("Audio file is too large. Send a smaller clip.")]
    AudioTooLarge,
    #[error("Malformed request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    Provider(String),
    #[error("Internal server error.")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingInput | ApiError::EmptyAudio | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::AudioTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Provider(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Provider(msg) => tracing::error!("provider failure: {msg}"),
            ApiError::Internal(detail) => tracing::error!("internal error: {detail}"),
            other => tracing::warn!("request rejected: {other}"),
        }

        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type alias for handlers and orchestrators.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingInput.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyAudio.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::AudioTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::Provider("down".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = ApiError::Internal("influx token rejected".to_string());
        assert_eq!(err.to_string(), "Internal server error.");
    }

    #[test]
    fn test_provider_message_is_exposed_verbatim() {
        let err = ApiError::Provider("Riprova più tardi.".to_string());
        assert_eq!(err.to_string(), "Riprova più tardi.");
    }
}
