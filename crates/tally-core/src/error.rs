//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  ├── DbError          - Database operation failures                    │
//! │  ├── CheckoutError    - CoreError | DbError from a checkout            │
//! │  └── AdjustmentError  - CoreError | DbError from a stock adjustment    │
//! │                                                                         │
//! │  HTTP errors (apps/server)                                             │
//! │  └── ApiError         - What the client sees (serialized JSON)         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError → Client │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The HTTP layer turns
/// every one of them into a `422` with the message shown to the cashier.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Not enough units on hand to cover a cart line.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart line: COKE-330 × 5
    ///      │
    ///      ▼
    /// Conditional decrement affects 0 rows, stock is 2
    ///      │
    ///      ▼
    /// OutOfStock { sku: "COKE-330", available: 2, requested: 5 }
    ///      │
    ///      ▼
    /// Transaction rolled back, UI shows the message
    /// ```
    #[error("Insufficient stock for {name} ({sku}): available {available}, requested {requested}")]
    OutOfStock {
        name: String,
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Tendered amount does not cover the sale total.
    #[error("Insufficient payment amount: total {total}, paid {paid}")]
    InsufficientPayment { total: Money, paid: Money },

    /// Checkout was attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic or database work runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Integer value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Monetary value is negative or above the allowed maximum.
    #[error("{field} must be between 0.00 and {max}")]
    AmountOutOfRange { field: String, max: Money },

    /// Value must be at least one.
    #[error("{field} must be at least 1")]
    MustBePositive { field: String },

    /// One field must not be smaller than another.
    #[error("{field} must be greater than or equal to {other}")]
    LessThan { field: String, other: String },

    /// Invalid format (e.g., invalid UUID, too many decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_stock_message() {
        let err = CoreError::OutOfStock {
            name: "Coca-Cola 330ml".to_string(),
            sku: "COKE-330".to_string(),
            available: 2,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Coca-Cola 330ml (COKE-330): available 2, requested 5"
        );
    }

    #[test]
    fn test_insufficient_payment_message() {
        let err = CoreError::InsufficientPayment {
            total: Money::from_cents(2997),
            paid: Money::from_cents(2000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment amount: total 29.97, paid 20.00"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "reason".to_string(),
        };
        assert_eq!(err.to_string(), "reason is required");

        let err = ValidationError::AmountOutOfRange {
            field: "selling_price".to_string(),
            max: Money::from_cents(99_999_999),
        };
        assert_eq!(
            err.to_string(),
            "selling_price must be between 0.00 and 999999.99"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
