use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resume::models::SectionKey;
use crate::upstream::UpstreamError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No active resume record")]
    MissingActiveRecord,

    #[error("Upstream error: {0}")]
    Transport(#[from] UpstreamError),

    /// Delete-then-create stopped partway. Nothing is rolled back: the
    /// section upstream now holds `written` of the `expected` new items.
    #[error(
        "Section '{section}' was only partially saved ({written}/{expected} items written): {message}"
    )]
    IncompleteSectionWrite {
        section: SectionKey,
        written: usize,
        expected: usize,
        message: String,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::MissingActiveRecord => StatusCode::CONFLICT,
            AppError::Transport(UpstreamError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Transport(_) | AppError::IncompleteSectionWrite { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::MissingActiveRecord => ("NO_ACTIVE_RECORD", self.to_string()),
            AppError::Transport(UpstreamError::NotFound(msg)) => ("NOT_FOUND", msg.clone()),
            AppError::Transport(e) => {
                tracing::error!("Upstream error: {e}");
                ("UPSTREAM_ERROR", e.to_string())
            }
            AppError::IncompleteSectionWrite { .. } => {
                tracing::error!("{self}");
                ("INCOMPLETE_SECTION_WRITE", self.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("Resume not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::MissingActiveRecord.status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Transport(UpstreamError::Api {
                status: 500,
                message: "boom".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::IncompleteSectionWrite {
                section: SectionKey::Awards,
                written: 1,
                expected: 3,
                message: "boom".into(),
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("x")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_incomplete_write_message_names_progress() {
        let err = AppError::IncompleteSectionWrite {
            section: SectionKey::Education,
            written: 2,
            expected: 3,
            message: "Upstream API error (500): boom".into(),
        };
        let text = err.to_string();
        assert!(text.contains("'education'"));
        assert!(text.contains("2/3"));
    }
}
