//! # Validation Module
//!
//! Input validation utilities for Khong POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Shop UI                                                      │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: khong-core (THIS MODULE + cart/payment/debt rules)           │
//! │  └── Business rule validation, field-level errors                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_qty >= 0), CHECK (return_qty <= quantity)            │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khong_core::validation::{validate_quantity, validate_phone};
//!
//! assert!(validate_quantity("quantity", 5).is_ok());
//! assert!(validate_phone("020 5551 2345").is_ok());
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};

/// Result type for free-text validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name (products, customers).
pub const MAX_NAME_LEN: usize = 200;

/// Longest accepted phone number.
pub const MAX_PHONE_LEN: usize = 20;

// =============================================================================
// String Validators
// =============================================================================

fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters (counted as characters, Lao script included)
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name, MAX_NAME_LEN)
}

/// Validates a product unit label such as "case" or "ລັງ".
pub fn validate_unit(unit: &str) -> ValidationResult<()> {
    validate_required("unit", unit, 50)
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_required("name", name, MAX_NAME_LEN)
}

/// Validates a phone number.
///
/// ## Rules
/// - Must not be empty
/// - Digits, spaces, `-` and a leading `+` only
/// - At most 20 characters
///
/// ## Example
/// ```rust
/// use khong_core::validation::validate_phone;
///
/// assert!(validate_phone("02055512345").is_ok());
/// assert!(validate_phone("+856 20 5551 2345").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_required("phone", phone, MAX_PHONE_LEN)?;

    let phone = phone.trim();
    let body = phone.strip_prefix('+').unwrap_or(phone);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, hyphens and a leading +".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be at least 1
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Cart: Add Line                                                         │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity("quantity", 5) ← THIS FUNCTION                      │
/// │       │                                                                 │
/// │       ├── qty < 1? → InvalidQuantity                                   │
/// │       │                                                                 │
/// │       └── OK → Stock Guard checks the cumulative quantity              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(field: &str, qty: i64) -> CoreResult<()> {
    if qty < 1 {
        return Err(CoreError::InvalidQuantity {
            field: field.to_string(),
            value: qty,
        });
    }

    Ok(())
}

/// Validates a price or amount in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, "no transfer")
///
/// ## Example
/// ```rust
/// use khong_core::validation::validate_amount;
///
/// assert!(validate_amount("unit_price", 12_000_000).is_ok());
/// assert!(validate_amount("unit_price", 0).is_ok());
/// assert!(validate_amount("cash_amount", -100).is_err());
/// ```
pub fn validate_amount(field: &str, cents: i64) -> CoreResult<()> {
    if cents < 0 {
        return Err(CoreError::InvalidPrice {
            field: field.to_string(),
            value: cents,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
