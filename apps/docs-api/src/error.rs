//! Error types for the docs API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared_types::{DocError, DownloadFormat};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Doc(#[from] DocError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cannot convert to {0}")]
    UnsupportedFormat(DownloadFormat),

    #[error("Stored record is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Doc(DocError::Validation { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Doc(DocError::InvalidState { .. }) => StatusCode::CONFLICT,
            ApiError::Doc(DocError::NotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Doc(DocError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Doc(DocError::Transport(_)) => StatusCode::BAD_GATEWAY,
            ApiError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Database(_) | ApiError::Json(_) | ApiError::Pdf(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Doc(e) => e.code(),
            ApiError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Json(_) | ApiError::Pdf(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            ApiError::Json(e) => {
                tracing::error!("Corrupt stored record: {}", e);
                "Internal error".to_string()
            }
            ApiError::Pdf(e) => {
                tracing::error!("PDF generation failed: {}", e);
                "Internal error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "error": message,
            "code": self.code(),
            "status": status.as_u16(),
        });
        if let ApiError::Doc(DocError::Validation { field, .. }) = &self {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::DocumentStatus;

    #[test]
    fn test_doc_errors_map_to_statuses() {
        let cases = [
            (DocError::validation("name", "required"), StatusCode::BAD_REQUEST),
            (
                DocError::invalid_state("edit", DocumentStatus::Pending),
                StatusCode::CONFLICT,
            ),
            (DocError::not_found("Document", "x"), StatusCode::NOT_FOUND),
            (DocError::Unauthorized, StatusCode::UNAUTHORIZED),
            (DocError::transport(None), StatusCode::BAD_GATEWAY),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
        assert_eq!(
            ApiError::UnsupportedFormat(DownloadFormat::Docx).status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_validation_message_is_passed_through() {
        let err = ApiError::from(DocError::validation("name", "name is required"));
        assert_eq!(err.to_string(), "Invalid name: name is required");
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
}
