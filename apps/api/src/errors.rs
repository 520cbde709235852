use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Fixed client-facing message for unparseable LLM output. The raw response
/// text is logged server-side and never surfaced.
pub const AI_PARSE_MESSAGE: &str = "Failed to parse AI response";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    /// An upstream service (LLM API, job page, extraction) answered with an
    /// error. The upstream message is embedded for diagnostics.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// LLM output that failed JSON parsing after fence stripping. Carries the
    /// raw text for server-side logging only.
    #[error("Failed to parse AI response")]
    AiResponseParse { raw: String },

    #[error("LaTeX compilation failed: {0}")]
    Compile(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Access denied".to_string(),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream service error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::AiResponseParse { raw } => {
                tracing::error!(
                    raw = %raw.chars().take(2000).collect::<String>(),
                    "LLM response failed JSON parsing"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "AI_PARSE_ERROR",
                    AI_PARSE_MESSAGE.to_string(),
                )
            }
            AppError::Compile(msg) => {
                tracing::error!("Compile error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPILE_ERROR",
                    format!("LaTeX compilation failed: {msg}"),
                )
            }
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
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
    fn test_ai_parse_error_hides_raw_text_from_display() {
        let err = AppError::AiResponseParse {
            raw: "```not json at all```".to_string(),
        };
        assert_eq!(err.to_string(), AI_PARSE_MESSAGE);
        assert!(!err.to_string().contains("not json"));
    }

    #[test]
    fn test_upstream_error_embeds_message() {
        let err = AppError::Upstream("LLM returned 503: overloaded".to_string());
        assert!(err.to_string().contains("overloaded"));
    }
}
