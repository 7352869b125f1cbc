use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Please sign in to continue")]
    AuthRequiredError,
    #[error("Validation error, {0}")]
    ValidationError(String),
    #[error("Validation errors, {0}")]
    ValidatorValidationErrors(#[from] validator::ValidationErrors),
    #[error("{0}")]
    PreconditionError(String),
    #[error("Remote operation failed, {0}")]
    RemoteOperationError(String),
    #[error("You do not own this {0}")]
    ForbiddenError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("Sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("jsonwebtoken error")]
    JsonWebTokenError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid form data, {0}")]
    InvalidFormData(String),
    #[error("Multipart error, {0}")]
    MultipartError(#[from] MultipartError),
    #[error("Invalid image format error")]
    InvalidImageFormatError(String),
    #[error("Serde json error")]
    SerdejsonError(#[from] serde_json::Error),
    #[error("Environment variable {0} is not set")]
    EnvironmentVariableNotSetError(String),
    #[error("{0}")]
    FileReadError(String),
    #[error("Internal error, {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Self::AuthRequiredError => (
                StatusCode::UNAUTHORIZED,
                "Please sign in to continue".to_string(),
            ),
            Self::ValidationError(e) => (StatusCode::UNPROCESSABLE_ENTITY, e),
            Self::ValidatorValidationErrors(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::PreconditionError(e) => (StatusCode::CONFLICT, e),
            Self::RemoteOperationError(e) => (StatusCode::BAD_GATEWAY, e),
            Self::ForbiddenError(resource) => (
                StatusCode::FORBIDDEN,
                format!("You do not own this {resource}"),
            ),
            Self::NotFoundError(e) => (StatusCode::NOT_FOUND, e),
            Self::SqlxError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::MigrateError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Request(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            Self::JsonWebTokenError(e) => (StatusCode::UNAUTHORIZED, e.to_string()),
            Self::InvalidFormData(e) => (StatusCode::UNPROCESSABLE_ENTITY, e),
            Self::MultipartError(e) => (e.status(), e.body_text()),
            Self::InvalidImageFormatError(e) => (StatusCode::UNPROCESSABLE_ENTITY, e),
            Self::SerdejsonError(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::EnvironmentVariableNotSetError(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Environment variable {e} is not set"),
            ),
            Self::FileReadError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
            Self::InternalError(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
        };

        let body = Json(json!({"error": error_message}));

        (status, body).into_response()
    }
}
