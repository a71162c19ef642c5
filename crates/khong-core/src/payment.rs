//! # Payment Allocator
//!
//! Checks that the tendered amounts settle a cart total and computes the
//! change to hand back or the amount put on the customer's account.
//!
//! ```text
//!   PaymentInput ──► validate(input, total) ──► Allocation
//!                          │                     ├── cash / transfer (as recorded)
//!                          │                     ├── change_due
//!                          │                     └── outstanding_credit
//!                          └── MissingCustomer | UnderPayment | InvalidPrice
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentType;
use crate::validation::validate_amount;

/// What the cashier entered on the payment form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentInput {
    pub payment_type: PaymentType,
    pub cash: Money,
    pub transfer: Money,
    /// Mandatory for credit sales, optional otherwise.
    pub customer_id: Option<String>,
}

impl PaymentInput {
    /// Form defaults after the cashier picks a payment method.
    ///
    /// Cash and transfer pre-fill the full total; credit and mixed start at zero.
    pub fn for_method(payment_type: PaymentType, cart_total: Money) -> Self {
        let (cash, transfer) = match payment_type {
            PaymentType::Cash => (cart_total, Money::zero()),
            PaymentType::Transfer => (Money::zero(), cart_total),
            PaymentType::Mixed | PaymentType::Credit => (Money::zero(), Money::zero()),
        };

        PaymentInput {
            payment_type,
            cash,
            transfer,
            customer_id: None,
        }
    }

    /// Sets the customer.
    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    /// Cash plus transfer.
    #[inline]
    pub fn tendered(&self) -> Money {
        self.cash + self.transfer
    }
}

/// Validated payment split for one sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Allocation {
    pub payment_type: PaymentType,
    /// Amounts to record on the sale (both zero for credit).
    pub cash: Money,
    pub transfer: Money,
    pub change_due: Money,
    pub outstanding_credit: Money,
}

/// Validates a payment against the cart total.
///
/// ## Rules
/// - Negative amounts → `InvalidPrice`
/// - Credit: a customer is required (`MissingCustomer`); amounts are forced
///   to zero and the whole total becomes outstanding credit
/// - Cash, transfer, mixed: `cash + transfer >= total` (`UnderPayment`);
///   the split between the two is not enforced
pub fn validate(input: &PaymentInput, cart_total: Money) -> CoreResult<Allocation> {
    validate_amount("cash_amount", input.cash.cents())?;
    validate_amount("transfer_amount", input.transfer.cents())?;

    if input.payment_type == PaymentType::Credit {
        let has_customer = input
            .customer_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty());
        if !has_customer {
            return Err(CoreError::MissingCustomer);
        }

        return Ok(Allocation {
            payment_type: PaymentType::Credit,
            cash: Money::zero(),
            transfer: Money::zero(),
            change_due: Money::zero(),
            outstanding_credit: cart_total,
        });
    }

    let tendered = input.tendered();
    if tendered < cart_total {
        return Err(CoreError::UnderPayment {
            paid_cents: tendered.cents(),
            total_cents: cart_total.cents(),
        });
    }

    Ok(Allocation {
        payment_type: input.payment_type,
        cash: input.cash,
        transfer: input.transfer,
        change_due: tendered.saturating_sub_to_zero(cart_total),
        outstanding_credit: Money::zero(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(payment_type: PaymentType, cash: i64, transfer: i64) -> PaymentInput {
        PaymentInput {
            payment_type,
            cash: Money::from_cents(cash),
            transfer: Money::from_cents(transfer),
            customer_id: None,
        }
    }

    const TOTAL: Money = Money::from_cents(250_000);

    #[test]
    fn test_cash_underpayment() {
        let err = validate(&input(PaymentType::Cash, 100_000, 0), TOTAL).unwrap_err();
        assert_eq!(
            err,
            CoreError::UnderPayment {
                paid_cents: 100_000,
                total_cents: 250_000
            }
        );
    }

    #[test]
    fn test_mixed_exact() {
        let alloc = validate(&input(PaymentType::Mixed, 150_000, 100_000), TOTAL).unwrap();
        assert_eq!(alloc.change_due, Money::zero());
        assert_eq!(alloc.outstanding_credit, Money::zero());
        assert_eq!(alloc.cash, Money::from_cents(150_000));
        assert_eq!(alloc.transfer, Money::from_cents(100_000));
    }

    #[test]
    fn test_cash_with_change() {
        let alloc = validate(&input(PaymentType::Cash, 300_000, 0), TOTAL).unwrap();
        assert_eq!(alloc.change_due, Money::from_cents(50_000));
    }

    #[test]
    fn test_credit_requires_customer() {
        assert_eq!(
            validate(&input(PaymentType::Credit, 0, 0), TOTAL),
            Err(CoreError::MissingCustomer)
        );

        let blank = input(PaymentType::Credit, 0, 0).with_customer("  ");
        assert_eq!(validate(&blank, TOTAL), Err(CoreError::MissingCustomer));
    }

    #[test]
    fn test_credit_forces_zero_amounts() {
        let credit = input(PaymentType::Credit, 70_000, 5_000).with_customer("cust-1");
        let alloc = validate(&credit, TOTAL).unwrap();

        assert_eq!(alloc.cash, Money::zero());
        assert_eq!(alloc.transfer, Money::zero());
        assert_eq!(alloc.change_due, Money::zero());
        assert_eq!(alloc.outstanding_credit, TOTAL);
    }

    #[test]
    fn test_negative_amount_rejected() {
        let err = validate(&input(PaymentType::Mixed, 300_000, -1), TOTAL).unwrap_err();
        assert_eq!(err.field(), Some("transfer_amount"));
    }

    #[test]
    fn test_for_method_defaults() {
        let cash = PaymentInput::for_method(PaymentType::Cash, TOTAL);
        assert_eq!((cash.cash, cash.transfer), (TOTAL, Money::zero()));

        let transfer = PaymentInput::for_method(PaymentType::Transfer, TOTAL);
        assert_eq!((transfer.cash, transfer.transfer), (Money::zero(), TOTAL));

        let mixed = PaymentInput::for_method(PaymentType::Mixed, TOTAL);
        assert_eq!(mixed.tendered(), Money::zero());

        let credit = PaymentInput::for_method(PaymentType::Credit, TOTAL);
        assert_eq!(credit.tendered(), Money::zero());
        assert!(validate(&PaymentInput::for_method(PaymentType::Transfer, TOTAL), TOTAL).is_ok());
    }
}
