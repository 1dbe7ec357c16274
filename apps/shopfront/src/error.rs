//! # App Error Type
//!
//! Unified error type for every storefront command.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Shopfront                              │
//! │                                                                         │
//! │  Command Function  → Result<T, AppError>                               │
//! │         │                                                               │
//! │         ├── CoreError (empty cart, no user, ...) ─► VALIDATION_ERROR   │
//! │         │                                        ─► FORBIDDEN (admin)  │
//! │         ├── DbError (local storage)  ─────────────► STORAGE_ERROR      │
//! │         ├── BackendError::NotFound  ──────────────► NOT_FOUND          │
//! │         └── BackendError (other)  ────────────────► NETWORK_ERROR      │
//! │                                                                         │
//! │  CLI prints `message` (or `{ code, message }` with --json)             │
//! │  and exits with status 1.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage and backend details are logged, not shown: the user sees a
//! short message, the log keeps the cause.

use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use shopfront_api::BackendError;
use shopfront_core::CoreError;
use shopfront_db::DbError;

/// Error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "The cart is empty"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct AppError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad input or missing precondition; nothing was sent to the backend
    ValidationError,

    /// Backend unreachable or answered with a failure
    NetworkError,

    /// Product, sale or person absent
    NotFound,

    /// Local storage failed
    StorageError,

    /// Signed-in user lacks the admin role
    Forbidden,

    /// Anything else
    Internal,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        AppError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::ValidationError, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::NetworkError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::new(ErrorCode::Internal, message)
    }
}

/// Result type for commands.
pub type AppResult<T> = Result<T, AppError>;

/// Converts core errors to app errors.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AdminOnly => AppError::new(ErrorCode::Forbidden, err.to_string()),
            CoreError::LineNotInCart(_) => AppError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Validation(e) => AppError::validation(e.to_string()),
            CoreError::EmptyCart
            | CoreError::MissingIdentity
            | CoreError::NoActiveProducts
            | CoreError::CartTooLarge { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::InvalidLineId(_) => AppError::validation(err.to_string()),
        }
    }
}

impl From<shopfront_core::ValidationError> for AppError {
    fn from(err: shopfront_core::ValidationError) -> Self {
        AppError::validation(err.to_string())
    }
}

/// Converts storage errors to app errors.
impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::InvalidValue { key, reason } => {
                error!(key = %key, reason = %reason, "Stored value is corrupt");
                AppError::new(
                    ErrorCode::StorageError,
                    format!("Local data for '{}' is unreadable; try logging out", key),
                )
            }
            DbError::ConnectionFailed(e) | DbError::MigrationFailed(e) => {
                error!("Local storage unavailable: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage is unavailable")
            }
            DbError::PoolExhausted => {
                AppError::new(ErrorCode::StorageError, "Local storage is busy")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                error!("Local storage operation failed: {}", e);
                AppError::new(ErrorCode::StorageError, "Local storage operation failed")
            }
        }
    }
}

/// Converts backend errors to app errors.
impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::NotFound { entity, id } => AppError::not_found(entity, id),
            BackendError::Url(e) => AppError::internal(format!("Invalid backend URL: {}", e)),
            other => {
                warn!(error = %other, "Backend call failed");
                AppError::network("The store backend could not complete the request")
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
