use thiserror::Error;

use crate::request::ApiResponse;

/// Failure of a client operation.
///
/// Non-2xx responses surface as [`ApiError::Status`] carrying the raw body so
/// callers can inspect server messages (e.g. `{"error": "..."}`).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("credential storage error: {0}")]
    Storage(String),
}

impl ApiError {
    pub fn from_response(response: &ApiResponse) -> Self {
        ApiError::Status {
            status: response.status,
            body: response.body.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Server-provided message from an `error` or `detail` field, if any.
    pub fn server_message(&self) -> Option<String> {
        let ApiError::Status { body, .. } = self else {
            return None;
        };
        let json: serde_json::Value = serde_json::from_str(body).ok()?;
        json.get("error")
            .or_else(|| json.get("detail"))
            .and_then(|v| v.as_str())
            .map(String::from)
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}
