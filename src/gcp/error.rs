//! API error kinds
//!
//! Every remote call made through [`GcpHttpClient`](super::http::GcpHttpClient)
//! fails with one of these variants, so callers match exhaustively instead of
//! inspecting error strings.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Outcome of a single remote operation.
pub type OperationResult<T> = Result<T, ApiError>;

/// Closed set of failures a remote call can produce
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("{0}")]
    Unknown(String),
}

impl ApiError {
    /// Map an HTTP status and response body to an error kind
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = provider_message(body)
            .unwrap_or_else(|| format!("API request failed: {}", status));

        match status {
            StatusCode::FORBIDDEN => Self::PermissionDenied(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::AlreadyExists(message),
            _ => Self::Unknown(message),
        }
    }

    /// Provider message carried by this error
    pub fn message(&self) -> &str {
        match self {
            Self::PermissionDenied(m) | Self::NotFound(m) | Self::AlreadyExists(m) | Self::Unknown(m) => m,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::from_response(status, ""),
            None => Self::Unknown(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unknown(format!("{:#}", err))
    }
}

/// Extract `error.message` from a Google API error body
fn provider_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string())
}
