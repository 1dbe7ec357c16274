//! # Backend Error Types
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reqwest send() failed          → BackendError::Request                 │
//! │  404 on a must-exist resource   → BackendError::NotFound                │
//! │  other non-2xx status           → BackendError::Status { message }      │
//! │  2xx with an undecodable body   → BackendError::Decode                  │
//! │  base URL unusable              → BackendError::Url                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried. The app turns every variant except `NotFound`
//! into a generic network failure message.

use thiserror::Error;

/// Errors from the storefront backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested entity does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend's own `message` field when the body carries
    /// one, otherwise the raw body or the status reason.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never got a response (connection refused, DNS, TLS, ...).
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body did not match the expected shape.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The configured base URL cannot be used.
    #[error("Invalid backend URL: {0}")]
    Url(String),
}

impl BackendError {
    /// Returns the HTTP status for `Status` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            BackendError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}

impl From<url::ParseError> for BackendError {
    fn from(err: url::ParseError) -> Self {
        BackendError::Url(err.to_string())
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;
