//! # API Error Type
//!
//! Unified error type for everything the UI shell (or CLI) calls.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Mariam POS                             │
//! │                                                                         │
//! │  Caller                      Rust Client                                │
//! │  ──────                      ───────────                                │
//! │                                                                         │
//! │  send_to_cashier(...)                                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Operation                                                       │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │  Validation Error? ── CoreError::Validation ─────┐              │  │
//! │  │         │                                        │              │  │
//! │  │  Store Error? ─────── StoreError::QueryFailed ───┤              │  │
//! │  │         │                                        ▼              │  │
//! │  │  Backend Error? ───── reqwest / HTTP 4xx-5xx ── ApiError ──────►│  │
//! │  │         │                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  e.code    = "BACKEND_ERROR"                                            │
//! │  e.message = "Producto sin existencia"                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart ledger operations never produce an `ApiError`: their persistence and
//! confirmation failures are logged and swallowed inside the ledger.

use mariam_core::{CoreError, ValidationError};
use mariam_store::StoreError;
use serde::Serialize;
use ts_rs::TS;

use crate::state::config::ConfigError;

/// Error returned to the shell.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 7501234567890"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for shell-facing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart cannot be submitted in its current shape
    CartError,

    /// Local store failed
    StorageError,

    /// Backend unreachable or timed out
    NetworkError,

    /// Backend answered with an error or an unexpected body
    BackendError,

    /// Client configuration is invalid
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::BackendError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => ApiError::new(ErrorCode::CartError, err.to_string()),
            CoreError::InvalidProductId(_) | CoreError::InvalidTotal(_) => {
                ApiError::new(ErrorCode::CartError, err.to_string())
            }
            CoreError::MissingSaleCode => ApiError::backend(err.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Local store connection failed")
            }
            StoreError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::StorageError, "Local store migration failed")
            }
            StoreError::Serialization { key, .. } => ApiError::new(
                ErrorCode::StorageError,
                format!("Stored value for '{}' is unreadable", key),
            ),
            StoreError::PoolExhausted => {
                ApiError::new(ErrorCode::StorageError, "Local store is busy")
            }
            StoreError::Unavailable(_) => {
                ApiError::new(ErrorCode::StorageError, "Local store is closed")
            }
            StoreError::QueryFailed(e) | StoreError::Internal(e) => {
                tracing::error!("Local store operation failed: {}", e);
                ApiError::new(ErrorCode::StorageError, "Local store operation failed")
            }
        }
    }
}

/// Converts transport errors to API errors.
///
/// HTTP status failures are mapped earlier, in the client, where the
/// response body is still available.
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::new(ErrorCode::NetworkError, "Backend did not respond in time")
        } else if err.is_connect() {
            ApiError::new(
                ErrorCode::NetworkError,
                "Could not connect to the backend; check the API URL and network",
            )
        } else if err.is_decode() {
            ApiError::backend(format!("Unexpected response from backend: {}", err))
        } else {
            ApiError::new(ErrorCode::NetworkError, err.to_string())
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for shell-facing operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_codes() {
        assert_eq!(ApiError::from(CoreError::EmptyCart).code, ErrorCode::CartError);
        assert_eq!(
            ApiError::from(CoreError::MissingSaleCode).code,
            ErrorCode::BackendError
        );

        let err = ApiError::from(CoreError::Validation(ValidationError::required("client name")));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.message.contains("client name"));
    }

    #[test]
    fn test_store_error_hides_query_detail() {
        let err = ApiError::from(StoreError::QueryFailed("disk I/O error".into()));
        assert_eq!(err.code, ErrorCode::StorageError);
        assert_eq!(err.message, "Local store operation failed");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Product", "123")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: 123");
    }
}
