//! Handler error type. Rule violations render as `{"error": ...}`, auth and
//! lookup failures as `{"detail": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::services::ledger::LedgerError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Not found.")]
    NotFound,
    #[error("{0}")]
    Unauthorized(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl From<LedgerError> for AppError {
    fn from(e: LedgerError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("Failed to generate token: {}", e))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("Authentication error: {}", e))
    }
}

fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("accounts_code_key") => "Account with this code already exists".to_string(),
        Some("transactions_reference_key") => "Transaction with this reference already exists".to_string(),
        Some("users_username_key") => "A user with that username already exists".to_string(),
        _ => "Duplicate value".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": message })),
            AppError::Conflict(message) => (StatusCode::CONFLICT, serde_json::json!({ "error": message })),
            AppError::NotFound => (StatusCode::NOT_FOUND, serde_json::json!({ "detail": "Not found." })),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, serde_json::json!({ "detail": message })),
            AppError::Database(e) => {
                let db_error = e.as_database_error();
                match db_error.and_then(|d| d.code()).as_deref() {
                    Some(UNIQUE_VIOLATION) => (
                        StatusCode::BAD_REQUEST,
                        serde_json::json!({ "error": unique_violation_message(db_error.and_then(|d| d.constraint())) }),
                    ),
                    Some(FOREIGN_KEY_VIOLATION) => (
                        StatusCode::BAD_REQUEST,
                        serde_json::json!({ "error": "Referenced record does not exist" }),
                    ),
                    _ => {
                        tracing::error!("Database error: {:?}", e);
                        (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({ "error": "Database error" }))
                    }
                }
            }
            AppError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({ "error": "Internal server error" }))
            }
        };
        (status, Json(body)).into_response()
    }
}
