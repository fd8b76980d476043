use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Unknown draw number: {0}")]
    UnknownDrawNumber(String),

    #[error("Duplicate winner: {0}")]
    DuplicateWinner(String),

    /// An overridable warning was raised and the caller did not confirm.
    /// Carries the exact warning text for the confirmation dialog.
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::QuotaExhausted(msg) => {
                log::warn!("Quota exhausted: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "QUOTA_EXHAUSTED",
                    msg.clone(),
                )
            }
            AppError::UnknownDrawNumber(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "UNKNOWN_DRAW_NUMBER",
                msg.clone(),
            ),
            AppError::DuplicateWinner(msg) => {
                log::warn!("Duplicate winner rejected: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "DUPLICATE_WINNER",
                    msg.clone(),
                )
            }
            AppError::ConfirmationRequired(msg) => (
                actix_web::http::StatusCode::CONFLICT,
                "CONFIRMATION_REQUIRED",
                msg.clone(),
            ),
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}
