//! # Error Types
//!
//! Domain-specific error types for khong-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  khong-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Free-text input failures (names, phones)       │
//! │                                                                         │
//! │  khong-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller / UI             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every variant carries the offending field and value
//! 3. All variants are recoverable input errors, never retried automatically

use thiserror::Error;

use crate::checkout::CheckoutStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. Each one maps to a
/// field-level message in the UI via [`CoreError::field`] and
/// [`CoreError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A quantity was below 1.
    #[error("{field} must be at least 1, got {value}")]
    InvalidQuantity { field: String, value: i64 },

    /// A monetary input was negative.
    #[error("{field} must not be negative, got {value}")]
    InvalidPrice { field: String, value: i64 },

    /// A line or cart amount does not fit in the money range.
    #[error("{field} is too large: {quantity} x {unit_price_cents}")]
    AmountOverflow {
        field: String,
        quantity: i64,
        unit_price_cents: i64,
    },

    /// Requested quantity exceeds current stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 left in stock"
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Finalizing a sale with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cash plus transfer does not cover the total.
    #[error("Paid {paid_cents} does not cover total {total_cents}")]
    UnderPayment { paid_cents: i64, total_cents: i64 },

    /// Credit sale without a customer.
    #[error("A customer is required for credit sales")]
    MissingCustomer,

    /// Return quantity outside `0..=borrowed`.
    #[error("Return quantity {requested} is invalid for debt {debt_id} (borrowed {borrowed})")]
    InvalidReturnQuantity {
        debt_id: String,
        requested: i64,
        borrowed: i64,
    },

    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A checkout operation was attempted from the wrong state.
    #[error("Cannot {action} a checkout that is {from:?}")]
    InvalidTransition {
        from: CheckoutStatus,
        action: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns the input field responsible for the error, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            CoreError::InvalidQuantity { field, .. }
            | CoreError::InvalidPrice { field, .. }
            | CoreError::AmountOverflow { field, .. } => {
                Some(field)
            }
            CoreError::InsufficientStock { .. } => Some("quantity"),
            CoreError::EmptyCart => Some("lines"),
            CoreError::UnderPayment { .. } => Some("payment"),
            CoreError::MissingCustomer => Some("customer_id"),
            CoreError::InvalidReturnQuantity { .. } => Some("return_qty"),
            CoreError::NotFound { .. } | CoreError::InvalidTransition { .. } => None,
            CoreError::Validation(e) => Some(e.field()),
        }
    }

    /// Machine-readable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::InvalidQuantity { .. } => "INVALID_QUANTITY",
            CoreError::InvalidPrice { .. } => "INVALID_PRICE",
            CoreError::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
            CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            CoreError::EmptyCart => "EMPTY_CART",
            CoreError::UnderPayment { .. } => "UNDER_PAYMENT",
            CoreError::MissingCustomer => "MISSING_CUSTOMER",
            CoreError::InvalidReturnQuantity { .. } => "INVALID_RETURN_QUANTITY",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::InvalidTransition { .. } => "INVALID_TRANSITION",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for free-text fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., phone number with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "beerlao".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for beerlao: available 3, requested 5"
        );
        assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    }

    #[test]
    fn test_field_is_reported() {
        let err = CoreError::InvalidQuantity {
            field: "quantity".to_string(),
            value: 0,
        };
        assert_eq!(err.field(), Some("quantity"));
        assert_eq!(CoreError::MissingCustomer.field(), Some("customer_id"));
        assert_eq!(CoreError::not_found("Debt", "42").field(), None);
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.field(), Some("phone"));
        assert_eq!(core_err.to_string(), "Validation error: phone is required");
    }
}
