//! Backend error types and error-body parsing

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the syllabus backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401 Unauthorized - token missing, invalid or expired
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other non-2xx response; `message` is already the best-effort body text
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Network, DNS or timeout error before a response was received
    #[error("Error de red: {0}")]
    Network(String),

    /// A 2xx response whose body did not have the expected shape
    #[error("Respuesta inválida del servidor: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build an error from a failed response, applying the body fallback chain
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = error_message(status, body);
        if status == 401 {
            ApiError::Unauthorized { message }
        } else {
            ApiError::Http { status, message }
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode(message.into())
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Extract a human-readable message from an error response body.
///
/// Tries `{message}`, then `{error}`, then the raw body text, and finally
/// falls back to `"Error {status}"` when the body is empty.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let field = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .or(parsed.error.filter(|e| !e.trim().is_empty()));
        if let Some(text) = field {
            return text;
        }
    }

    let raw = body.trim();
    if raw.is_empty() {
        format!("Error {}", status)
    } else {
        raw.to_string()
    }
}
