//! # Checkout State Machine
//!
//! The pure half of the Sale Finalizer. The database layer drives it:
//! validate, deduct stock atomically, then commit.
//!
//! ```text
//!   ┌───────┐  validate() ok   ┌───────────┐  commit()   ┌───────────┐
//!   │ Draft │ ───────────────► │ Validated │ ──────────► │ Committed │
//!   └───┬───┘                  └─────┬─────┘             └───────────┘
//!       │ validate() err             │ reject() (stock deduction failed)
//!       ▼                            ▼
//!   ┌──────────┐ ◄───────────────────┘
//!   │ Rejected │
//!   └──────────┘
//! ```
//!
//! Committed and Rejected are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::payment::{self, Allocation, PaymentInput};
use crate::stock::{requested_quantities, StockRequest};
use crate::types::{FinalizedSale, Sale};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStatus {
    Draft,
    Validated,
    Committed,
    Rejected,
}

impl CheckoutStatus {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CheckoutStatus::Committed | CheckoutStatus::Rejected)
    }
}

/// A draft sale: the cart's lines frozen together with the payment inputs.
#[derive(Debug, Clone)]
pub struct Checkout {
    lines: Vec<CartLine>,
    payment: PaymentInput,
    status: CheckoutStatus,
    allocation: Option<Allocation>,
}

impl Checkout {
    pub fn new(cart: &Cart, payment: PaymentInput) -> Self {
        Checkout {
            lines: cart.lines().to_vec(),
            payment,
            status: CheckoutStatus::Draft,
            allocation: None,
        }
    }

    pub fn status(&self) -> CheckoutStatus {
        self.status
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn payment(&self) -> &PaymentInput {
        &self.payment
    }

    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_amount).sum()
    }

    /// Draft → Validated, or Draft → Rejected on the first failing rule.
    pub fn validate(&mut self) -> CoreResult<Allocation> {
        if self.status != CheckoutStatus::Draft {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                action: "validate",
            });
        }

        let result = if self.lines.is_empty() {
            Err(CoreError::EmptyCart)
        } else {
            payment::validate(&self.payment, self.total())
        };

        match result {
            Ok(allocation) => {
                self.status = CheckoutStatus::Validated;
                self.allocation = Some(allocation);
                Ok(allocation)
            }
            Err(e) => {
                self.status = CheckoutStatus::Rejected;
                Err(e)
            }
        }
    }

    /// Per-product quantities for the stock deduction.
    pub fn stock_requests(&self) -> Vec<StockRequest> {
        requested_quantities(&self.lines)
    }

    /// Marks the checkout rejected. No-op once terminal.
    pub fn reject(&mut self) {
        if !self.status.is_terminal() {
            self.status = CheckoutStatus::Rejected;
        }
    }

    /// Validated → Committed, producing the sale record with line snapshots.
    ///
    /// Call only after stock has been deducted.
    pub fn commit(&mut self, sale_id: impl Into<String>, created_at: DateTime<Utc>) -> CoreResult<FinalizedSale> {
        let allocation = match (self.status, self.allocation) {
            (CheckoutStatus::Validated, Some(allocation)) => allocation,
            (from, _) => {
                return Err(CoreError::InvalidTransition {
                    from,
                    action: "commit",
                })
            }
        };

        let sale_id = sale_id.into();
        let items = self
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| line.to_sale_item(&sale_id, i))
            .collect();

        let sale = Sale {
            id: sale_id,
            customer_id: self.payment.customer_id.clone(),
            created_at,
            total_cents: self.total().cents(),
            cash_cents: allocation.cash.cents(),
            transfer_cents: allocation.transfer.cents(),
            payment_type: allocation.payment_type,
        };

        self.status = CheckoutStatus::Committed;
        Ok(FinalizedSale { sale, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::product;
    use crate::types::PaymentType;

    fn cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_line(&product("beer", 50, 100_000), 2).unwrap();
        cart.add_line(&product("water", 100, 50_000), 1).unwrap();
        cart
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let mut checkout = Checkout::new(&Cart::new(), PaymentInput::for_method(PaymentType::Cash, Money::zero()));

        assert_eq!(checkout.validate(), Err(CoreError::EmptyCart));
        assert_eq!(checkout.status(), CheckoutStatus::Rejected);
        assert!(matches!(
            checkout.commit("s-1", Utc::now()),
            Err(CoreError::InvalidTransition { from: CheckoutStatus::Rejected, .. })
        ));
    }

    #[test]
    fn test_underpayment_is_rejected() {
        let cart = cart();
        let payment = PaymentInput {
            cash: Money::from_cents(100_000),
            ..PaymentInput::for_method(PaymentType::Cash, cart.total())
        };
        let mut checkout = Checkout::new(&cart, payment);

        assert!(matches!(checkout.validate(), Err(CoreError::UnderPayment { .. })));
        assert_eq!(checkout.status(), CheckoutStatus::Rejected);
    }

    #[test]
    fn test_commit_requires_validation() {
        let cart = cart();
        let mut checkout = Checkout::new(&cart, PaymentInput::for_method(PaymentType::Cash, cart.total()));

        assert!(matches!(
            checkout.commit("s-1", Utc::now()),
            Err(CoreError::InvalidTransition { from: CheckoutStatus::Draft, action: "commit" })
        ));
        assert_eq!(checkout.status(), CheckoutStatus::Draft);
    }

    #[test]
    fn test_validate_then_commit() {
        let cart = cart();
        let mut checkout = Checkout::new(&cart, PaymentInput::for_method(PaymentType::Cash, cart.total()));

        let allocation = checkout.validate().unwrap();
        assert_eq!(allocation.change_due, Money::zero());
        assert_eq!(checkout.status(), CheckoutStatus::Validated);

        let finalized = checkout.commit("s-1", Utc::now()).unwrap();
        assert_eq!(checkout.status(), CheckoutStatus::Committed);
        assert_eq!(finalized.sale.total_cents, 250_000);
        assert_eq!(finalized.items_total(), finalized.sale.total());
        assert_eq!(finalized.items.len(), 2);
        assert_eq!(finalized.items[1].line_no, 1);
        assert_eq!(finalized.items[1].name_snapshot, "Product water");

        // terminal
        checkout.reject();
        assert_eq!(checkout.status(), CheckoutStatus::Committed);
        assert!(checkout.validate().is_err());
    }

    #[test]
    fn test_credit_sale_records_customer_and_zero_amounts() {
        let cart = cart();
        let payment = PaymentInput::for_method(PaymentType::Credit, cart.total()).with_customer("cust-1");
        let mut checkout = Checkout::new(&cart, payment);

        checkout.validate().unwrap();
        let finalized = checkout.commit("s-2", Utc::now()).unwrap();

        assert_eq!(finalized.sale.customer_id.as_deref(), Some("cust-1"));
        assert_eq!(finalized.sale.cash_cents, 0);
        assert_eq!(finalized.sale.transfer_cents, 0);
        assert_eq!(finalized.sale.outstanding_credit(), cart.total());
    }

    #[test]
    fn test_reject_after_validation() {
        let cart = cart();
        let mut checkout = Checkout::new(&cart, PaymentInput::for_method(PaymentType::Transfer, cart.total()));
        checkout.validate().unwrap();

        checkout.reject();
        assert_eq!(checkout.status(), CheckoutStatus::Rejected);
        assert!(checkout.commit("s-3", Utc::now()).is_err());
    }
}
