//! # Debt Ledger (pure half)
//!
//! Goods lent to a customer and the running total returned so far.
//!
//! ## Status Derivation
//! ```text
//!   return_qty == 0              → Pending
//!   0 < return_qty < quantity    → PartiallyReturned
//!   return_qty == quantity       → Returned
//!   return_qty > quantity        → never stored (InvalidReturnQuantity)
//! ```
//!
//! `return_qty` is cumulative: each [`Debt::record_return`] call overwrites
//! it with the new total to date. Lending does not touch catalogue stock.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{normalized, Product};
use crate::validation::{validate_amount, validate_quantity};

// =============================================================================
// Debt Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DebtStatus {
    Pending,
    PartiallyReturned,
    Returned,
}

impl DebtStatus {
    /// Status as a pure function of the borrowed and returned quantities.
    pub const fn derive(quantity: i64, return_qty: i64) -> Self {
        if return_qty <= 0 {
            DebtStatus::Pending
        } else if return_qty < quantity {
            DebtStatus::PartiallyReturned
        } else {
            DebtStatus::Returned
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            DebtStatus::Pending => "pending",
            DebtStatus::PartiallyReturned => "partially_returned",
            DebtStatus::Returned => "returned",
        }
    }
}

// =============================================================================
// Debt
// =============================================================================

/// One lending record.
///
/// Fields are private so `status` and `return_date` can only change
/// through [`Debt::record_return`]. Loaded from rows, never deserialized:
///
/// ```compile_fail
/// let json = r#"{"id":"d","quantity":5,"return_qty":5,"status":"pending"}"#;
/// let _: khong_core::Debt = serde_json::from_str(json).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Debt {
    id: String,
    customer_id: String,
    product_id: String,
    #[ts(as = "String")]
    debt_date: NaiveDateTime,
    quantity: i64,
    /// Price per unit at time of lending (frozen).
    unit_price_cents: i64,
    #[ts(as = "Option<String>")]
    return_date: Option<NaiveDateTime>,
    return_qty: i64,
    status: DebtStatus,
    note: String,
}

/// Input for creating a debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDebt {
    pub customer_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[ts(as = "String")]
    pub debt_date: NaiveDateTime,
    pub note: Option<String>,
    /// Quantity already returned when the record is entered, with its date.
    #[ts(skip)]
    pub initial_return: Option<(i64, NaiveDateTime)>,
}

impl NewDebt {
    /// A debt priced at the product's current unit price.
    pub fn for_product(
        customer_id: impl Into<String>,
        product: &Product,
        quantity: i64,
        debt_date: NaiveDateTime,
    ) -> Self {
        NewDebt {
            customer_id: customer_id.into(),
            product_id: product.id.clone(),
            quantity,
            unit_price_cents: product.unit_price_cents,
            debt_date,
            note: None,
            initial_return: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn returned_now(mut self, return_qty: i64, return_date: NaiveDateTime) -> Self {
        self.initial_return = Some((return_qty, return_date));
        self
    }
}

impl Debt {
    /// Builds a pending debt, applying `initial_return` if present.
    pub fn new(id: impl Into<String>, input: NewDebt) -> CoreResult<Self> {
        validate_quantity("quantity", input.quantity)?;
        validate_amount("unit_price", input.unit_price_cents)?;
        if Money::from_cents(input.unit_price_cents)
            .checked_multiply_quantity(input.quantity)
            .is_none()
        {
            return Err(CoreError::AmountOverflow {
                field: "quantity".to_string(),
                quantity: input.quantity,
                unit_price_cents: input.unit_price_cents,
            });
        }

        let mut debt = Debt {
            id: id.into(),
            customer_id: input.customer_id,
            product_id: input.product_id,
            debt_date: input.debt_date,
            quantity: input.quantity,
            unit_price_cents: input.unit_price_cents,
            return_date: None,
            return_qty: 0,
            status: DebtStatus::Pending,
            note: input.note.unwrap_or_default(),
        };

        if let Some((qty, date)) = input.initial_return {
            debt.record_return(qty, date)?;
        }

        Ok(debt)
    }

    /// Sets the cumulative returned quantity.
    ///
    /// `0 <= return_qty <= quantity`, otherwise `InvalidReturnQuantity` and the
    /// record is left unchanged. A zero return clears `return_date`.
    pub fn record_return(&mut self, return_qty: i64, return_date: NaiveDateTime) -> CoreResult<()> {
        if !(0..=self.quantity).contains(&return_qty) {
            return Err(CoreError::InvalidReturnQuantity {
                debt_id: self.id.clone(),
                requested: return_qty,
                borrowed: self.quantity,
            });
        }

        self.return_qty = return_qty;
        self.return_date = (return_qty > 0).then_some(return_date);
        self.status = DebtStatus::derive(self.quantity, self.return_qty);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn debt_date(&self) -> NaiveDateTime {
        self.debt_date
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    pub fn return_date(&self) -> Option<NaiveDateTime> {
        self.return_date
    }

    pub fn return_qty(&self) -> i64 {
        self.return_qty
    }

    pub fn status(&self) -> DebtStatus {
        self.status
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// quantity × unit price
    pub fn amount(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    pub fn outstanding_qty(&self) -> i64 {
        self.quantity - self.return_qty
    }

    pub fn outstanding_amount(&self) -> Money {
        self.unit_price().multiply_quantity(self.outstanding_qty())
    }
}

// =============================================================================
// Listing & Filter
// =============================================================================

/// A debt joined with the customer and product names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DebtListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub debt: Debt,
    pub customer_name: String,
    pub product_name: String,
}

/// Debt list filter. All criteria that are set are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtFilter {
    pub customer_name: Option<String>,
    pub product_name: Option<String>,
    /// Matches the customer OR product name.
    pub search: Option<String>,
    /// Calendar date of `debt_date`.
    pub date: Option<NaiveDate>,
    pub status: Option<DebtStatus>,
}

impl DebtFilter {
    pub fn matches(&self, listing: &DebtListing) -> bool {
        let customer = listing.customer_name.to_lowercase();
        let product = listing.product_name.to_lowercase();

        let contains = |haystack: &str, fragment: Option<&str>| {
            normalized(fragment).map_or(true, |term| haystack.contains(&term))
        };

        let matches_search = normalized(self.search.as_deref())
            .map_or(true, |term| customer.contains(&term) || product.contains(&term));

        contains(&customer, self.customer_name.as_deref())
            && contains(&product, self.product_name.as_deref())
            && matches_search
            && self
                .date
                .map_or(true, |date| listing.debt.debt_date.date() == date)
            && self.status.map_or(true, |status| listing.debt.status == status)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn new_debt(quantity: i64) -> NewDebt {
        NewDebt {
            customer_id: "cust-1".to_string(),
            product_id: "beer".to_string(),
            quantity,
            unit_price_cents: 12_000_000,
            debt_date: at(1, 9),
            note: None,
            initial_return: None,
        }
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(DebtStatus::derive(50, 0), DebtStatus::Pending);
        assert_eq!(DebtStatus::derive(50, 25), DebtStatus::PartiallyReturned);
        assert_eq!(DebtStatus::derive(50, 50), DebtStatus::Returned);

        // idempotent
        for _ in 0..3 {
            assert_eq!(DebtStatus::derive(50, 25), DebtStatus::PartiallyReturned);
        }
    }

    #[test]
    fn test_new_debt_is_pending() {
        let debt = Debt::new("d-1", new_debt(50)).unwrap();

        assert_eq!(debt.status(), DebtStatus::Pending);
        assert_eq!(debt.return_qty(), 0);
        assert_eq!(debt.return_date(), None);
        assert_eq!(debt.note(), "");
        assert_eq!(debt.amount(), Money::from_cents(600_000_000));
    }

    #[test]
    fn test_new_debt_validation() {
        assert!(matches!(
            Debt::new("d-1", new_debt(0)),
            Err(CoreError::InvalidQuantity { .. })
        ));

        let mut negative = new_debt(1);
        negative.unit_price_cents = -1;
        assert!(matches!(
            Debt::new("d-1", negative),
            Err(CoreError::InvalidPrice { .. })
        ));

        let mut free = new_debt(1);
        free.unit_price_cents = 0;
        assert!(Debt::new("d-1", free).is_ok());

        let mut huge = new_debt(i64::MAX);
        huge.unit_price_cents = 2;
        assert!(matches!(
            Debt::new("d-1", huge),
            Err(CoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_record_return_is_cumulative() {
        let mut debt = Debt::new("d-1", new_debt(50)).unwrap();

        debt.record_return(25, at(3, 10)).unwrap();
        assert_eq!(debt.status(), DebtStatus::PartiallyReturned);
        assert_eq!(debt.outstanding_qty(), 25);
        assert_eq!(debt.return_date(), Some(at(3, 10)));

        debt.record_return(50, at(5, 10)).unwrap();
        assert_eq!(debt.status(), DebtStatus::Returned);
        assert_eq!(debt.return_qty(), 50);
        assert_eq!(debt.outstanding_amount(), Money::zero());
    }

    #[test]
    fn test_over_return_leaves_record_unchanged() {
        let mut debt = Debt::new("d-1", new_debt(50)).unwrap();
        debt.record_return(25, at(3, 10)).unwrap();
        let before = debt.clone();

        let err = debt.record_return(60, at(4, 10)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidReturnQuantity {
                debt_id: "d-1".to_string(),
                requested: 60,
                borrowed: 50,
            }
        );
        assert_eq!(debt, before);

        assert!(debt.record_return(-1, at(4, 10)).is_err());
        assert_eq!(debt, before);
    }

    #[test]
    fn test_return_to_zero_clears_date() {
        let mut debt = Debt::new("d-1", new_debt(10)).unwrap();
        debt.record_return(4, at(2, 8)).unwrap();
        debt.record_return(0, at(3, 8)).unwrap();

        assert_eq!(debt.status(), DebtStatus::Pending);
        assert_eq!(debt.return_date(), None);
    }

    #[test]
    fn test_initial_return() {
        let input = new_debt(10).returned_now(10, at(1, 18)).with_note("party");
        let debt = Debt::new("d-1", input).unwrap();

        assert_eq!(debt.status(), DebtStatus::Returned);
        assert_eq!(debt.note(), "party");

        let too_many = new_debt(10).returned_now(11, at(1, 18));
        assert!(matches!(
            Debt::new("d-2", too_many),
            Err(CoreError::InvalidReturnQuantity { .. })
        ));
    }

    #[test]
    fn test_filter() {
        let mut debt = Debt::new("d-1", new_debt(50)).unwrap();
        debt.record_return(25, at(2, 9)).unwrap();
        let listing = DebtListing {
            debt,
            customer_name: "Noy Phommachanh".to_string(),
            product_name: "Beerlao Lager".to_string(),
        };

        assert!(DebtFilter::default().matches(&listing));

        let by_both = DebtFilter {
            customer_name: Some("noy".to_string()),
            product_name: Some("LAGER".to_string()),
            ..Default::default()
        };
        assert!(by_both.matches(&listing));

        let search = DebtFilter {
            search: Some("beerlao".to_string()),
            ..Default::default()
        };
        assert!(search.matches(&listing));

        let wrong_status = DebtFilter {
            status: Some(DebtStatus::Pending),
            ..Default::default()
        };
        assert!(!wrong_status.matches(&listing));

        let date_and_status = DebtFilter {
            date: NaiveDate::from_ymd_opt(2025, 5, 1),
            status: Some(DebtStatus::PartiallyReturned),
            ..Default::default()
        };
        assert!(date_and_status.matches(&listing));

        let other_day = DebtFilter {
            date: NaiveDate::from_ymd_opt(2025, 5, 2),
            ..Default::default()
        };
        assert!(!other_day.matches(&listing));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&DebtStatus::PartiallyReturned).unwrap(),
            "\"partially_returned\""
        );
    }
}
