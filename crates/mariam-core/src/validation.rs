//! # Validation Module
//!
//! Caller-side input validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Screen (text input)                                          │
//! │  ├── parse_entered_amount("137.50")                                    │
//! │  └── validate_client_name("  Ana ")                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Add flows / submission (THIS MODULE)                         │
//! │  ├── validate_entered_amount(137.5)                                    │
//! │  └── parse_backend_id("12")                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart ledger                                                  │
//! │  └── NO validation: every operation is infallible                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use mariam_core::validation::{parse_entered_amount, validate_client_name};
//!
//! assert_eq!(parse_entered_amount(" 137.50 ").unwrap(), 137.5);
//! assert_eq!(validate_client_name("  Ana ").unwrap(), "Ana");
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Amount Validators
// =============================================================================

/// Validates an amount the user typed for a bulk purchase.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0)
pub fn validate_entered_amount(amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::invalid_format(
            "total price",
            "must be a number",
        ));
    }

    if amount <= 0.0 {
        return Err(ValidationError::must_be_positive("total price"));
    }

    Ok(())
}

/// Parses and validates the text the user typed as a total price.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Bulk product: "Enter total price"                                      │
/// │                                                                         │
/// │  "" ──────────► Required                                                │
/// │  "abc" ───────► InvalidFormat                                           │
/// │  "0" / "-5" ──► MustBePositive                                          │
/// │  "137.50" ────► Ok(137.5) → quantity = 137.5 / base price               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn parse_entered_amount(text: &str) -> ValidationResult<f64> {
    let text = text.trim();

    if text.is_empty() {
        return Err(ValidationError::required("total price"));
    }

    // Accept a decimal comma as typed on Spanish keyboards
    let normalized = text.replace(',', ".");
    let amount: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::invalid_format("total price", "must be a number"))?;

    validate_entered_amount(amount)?;
    Ok(amount)
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates the client name of a pending sale.
///
/// The name is trimmed and must not be empty. There is no length limit.
///
/// ## Returns
/// The trimmed name.
pub fn validate_client_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("clientName"));
    }

    Ok(name.to_string())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Parses a backend identifier: a positive integer carried as a string.
///
/// ## Example
/// ```rust
/// use mariam_core::validation::parse_backend_id;
///
/// assert_eq!(parse_backend_id("12"), Some(12));
/// assert_eq!(parse_backend_id("0"), None);
/// assert_eq!(parse_backend_id("abc"), None);
/// ```
pub fn parse_backend_id(id: &str) -> Option<i64> {
    id.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_entered_amount() {
        assert!(validate_entered_amount(0.01).is_ok());
        assert!(validate_entered_amount(137.5).is_ok());

        assert!(validate_entered_amount(0.0).is_err());
        assert!(validate_entered_amount(-1.0).is_err());
        assert!(validate_entered_amount(f64::NAN).is_err());
        assert!(validate_entered_amount(f64::INFINITY).is_err());
    }

    #[test]
    fn test_parse_entered_amount() {
        assert_eq!(parse_entered_amount("137.50").unwrap(), 137.5);
        assert_eq!(parse_entered_amount(" 20,5 ").unwrap(), 20.5);

        assert_eq!(
            parse_entered_amount("  ").unwrap_err(),
            ValidationError::required("total price")
        );
        assert!(matches!(
            parse_entered_amount("diez"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_entered_amount("-5"),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_validate_client_name() {
        assert_eq!(validate_client_name(" Ana López ").unwrap(), "Ana López");
        assert!(validate_client_name("").is_err());
        assert!(validate_client_name("   ").is_err());

        let long = "Distribuidora ".repeat(12);
        assert_eq!(validate_client_name(&long).unwrap(), long.trim());
    }

    #[test]
    fn test_parse_backend_id() {
        assert_eq!(parse_backend_id("12"), Some(12));
        assert_eq!(parse_backend_id(" 7 "), Some(7));
        assert_eq!(parse_backend_id("-3"), None);
        assert_eq!(parse_backend_id("P1"), None);
        assert_eq!(parse_backend_id(""), None);
    }
}
