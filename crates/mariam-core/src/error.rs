//! # Error Types
//!
//! Domain-specific error types for mariam-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mariam-core errors (this file)                                         │
//! │  ├── CoreError        - Submission / domain errors                      │
//! │  └── ValidationError  - Caller input validation failures                │
//! │                                                                         │
//! │  mariam-store errors (separate crate)                                   │
//! │  └── StoreError       - Key-value store failures                        │
//! │                                                                         │
//! │  mobile app errors                                                      │
//! │  └── ApiError         - What the UI shell sees                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → UI shell                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart ledger itself never produces any of these: its operations are
//! infallible. These errors belong to the callers around it (the add flows
//! and checkout).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Tried to send a cart with no lines to the cashier.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line's product id is not a positive integer.
    ///
    /// ## When This Occurs
    /// The backend addresses products by numeric id. A line restored from
    /// an old persisted cart, or built by hand, may carry something else.
    #[error("Invalid product id: {0}")]
    InvalidProductId(String),

    /// The cart total is zero, negative or not a number.
    #[error("Invalid sale total: {0}")]
    InvalidTotal(f64),

    /// The backend accepted the request but returned no sale code.
    #[error("Pending sale response has no code")]
    MissingSaleCode,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the caller-side flows (bulk price entry, client name, settings)
/// before anything reaches the ledger or the backend.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., not a number, not a URL).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::MustBePositive`].
    pub fn must_be_positive(field: impl Into<String>) -> Self {
        ValidationError::MustBePositive {
            field: field.into(),
        }
    }

    /// Shorthand for [`ValidationError::InvalidFormat`].
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
