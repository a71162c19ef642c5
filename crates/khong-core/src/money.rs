//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale total must EXACTLY equal the sum of its lines, so every        │
//! │  amount is held in minor units (1/100 of the currency unit):           │
//! │    120000.00 → 12_000_000                                              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use khong_core::money::Money;
//!
//! let case_of_beer = Money::from_major(120_000);
//! let line = case_of_beer * 3_i64;
//! assert_eq!(line, Money::from_major(360_000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Minor units per major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences such as `paid - total` may go negative
///   before being clamped
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Product.unit_price_cents ──► CartLine.unit_price ──► CartLine.line_amount
///                                                             │
///                                   Cart.total ◄──────────────┘
///                                       │
///                     PaymentAllocator  ▼  change_due / outstanding_credit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use khong_core::money::Money;
    ///
    /// let price = Money::from_cents(1_500_000); // 15000.00
    /// assert_eq!(price.cents(), 1_500_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use khong_core::money::Money;
    ///
    /// let unit_price = Money::from_major(18_000);
    /// assert_eq!(unit_price.multiply_quantity(4), Money::from_major(72_000));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity, `None` if the result leaves the i64 range.
    ///
    /// Widened to i128 so the check never overflows itself.
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        let product = (self.0 as i128) * (qty as i128);
        i64::try_from(product).ok().map(Money)
    }

    /// `self + other`, `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Returns `self - other`, clamped at zero.
    ///
    /// Used for change due: paying less than the total never yields
    /// negative change.
    #[inline]
    pub fn saturating_sub_to_zero(self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-style rendering (`-1234.50`). Shop-facing formatting with digit
/// grouping and currency symbol belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major() {
        let money = Money::from_major(120_000);
        assert_eq!(money.cents(), 12_000_000);
        assert_eq!(money.major(), 120_000);
        assert_eq!(money.minor_part(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1_500_050).to_string(), "15000.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(1000);
        let b = Money::from_major(500);

        assert_eq!(a + b, Money::from_major(1500));
        assert_eq!(a - b, Money::from_major(500));
        assert_eq!(a * 3_i64, Money::from_major(3000));
    }

    #[test]
    fn test_sum_has_no_drift() {
        // 0.10 + 0.20 summed a thousand times stays exact
        let total: Money = (0..1000)
            .flat_map(|_| [Money::from_cents(10), Money::from_cents(20)])
            .sum();
        assert_eq!(total, Money::from_cents(30_000));
    }

    #[test]
    fn test_saturating_sub_to_zero() {
        let paid = Money::from_major(300_000);
        let total = Money::from_major(250_000);
        assert_eq!(paid.saturating_sub_to_zero(total), Money::from_major(50_000));
        assert_eq!(total.saturating_sub_to_zero(paid), Money::zero());
    }

    #[test]
    fn test_checked_operations_detect_overflow() {
        let price = Money::from_cents(i64::MAX / 2);
        assert_eq!(price.checked_multiply_quantity(2), Some(Money::from_cents(i64::MAX - 1)));
        assert_eq!(price.checked_multiply_quantity(3), None);
        assert_eq!(Money::from_cents(-5).checked_multiply_quantity(i64::MAX), None);

        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(40).checked_add(Money::from_cents(2)),
            Some(Money::from_cents(42))
        );
    }
}
