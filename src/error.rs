use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

/// Errors raised by the menu and translation operations.
///
/// Per-language generation failures are not represented here; they are
/// collected as strings in the generation report instead.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Language already exists: {0}")]
    DuplicateLanguage(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("No entities to translate")]
    NoEntities,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing or invalid API key")]
    Unauthorized,

    #[error("Database error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateLanguage(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::NoEntities => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::DuplicateLanguage("en".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("Menu item 1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::NoEntities.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Persistence(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            AppError::DuplicateLanguage("de".into()).to_string(),
            "Language already exists: de"
        );
        assert_eq!(
            AppError::NotFound("Translation 7".into()).to_string(),
            "Translation 7 not found"
        );
        assert_eq!(AppError::NoEntities.to_string(), "No entities to translate");
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::NotFound("Language xx".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
