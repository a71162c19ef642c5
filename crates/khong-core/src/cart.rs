//! # Cart Aggregator
//!
//! Builds an in-progress sale: add, remove and adjust lines, merging
//! duplicate products and computing line and total amounts.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Cashier Action          Cart Method               Effect               │
//! │  ──────────────          ───────────               ──────               │
//! │                                                                         │
//! │  Pick product ──────────► add_line() ────────────► merge or push       │
//! │                                 │                                       │
//! │                                 └─ ensure_available(cumulative qty)     │
//! │                                                                         │
//! │  Click + / − ───────────► adjust_quantity() ─────► qty += delta        │
//! │                                 │                                       │
//! │                                 └─ qty >= 1, ensure_available           │
//! │                                                                         │
//! │  Click Remove ──────────► remove_line() ─────────► lines.remove(i)     │
//! │                                                                         │
//! │  View Cart ─────────────► total() ───────────────► (read only)         │
//! │                                                                         │
//! │  NOTE: a rejected operation leaves the cart exactly as it was.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock::ensure_available;
use crate::types::{Product, SaleItem};
use crate::validation::validate_quantity;

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// ## Design Notes
/// The unit label, name and unit price are frozen when the line is first
/// created. Merging more of the same product keeps the original price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Unit label at time of adding (frozen)
    pub unit: String,

    /// Always >= 1
    pub quantity: i64,

    /// Price in minor units at time of adding (frozen)
    pub unit_price_cents: i64,
}

impl CartLine {
    /// Creates a line from the product's current price and unit.
    pub fn snapshot(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            quantity,
            unit_price_cents: product.unit_price_cents,
        }
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// quantity × unit price snapshot
    #[inline]
    pub fn line_amount(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Converts the line into a persisted sale item.
    pub fn to_sale_item(&self, sale_id: &str, line_no: usize) -> SaleItem {
        SaleItem {
            sale_id: sale_id.to_string(),
            line_no: line_no as i64,
            product_id: self.product_id.clone(),
            name_snapshot: self.name.clone(),
            unit: self.unit.clone(),
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            line_amount_cents: self.line_amount().cents(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress cart for one sale session.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product merges)
/// - Every quantity is >= 1
/// - The cumulative quantity per product never exceeded the product's stock
///   at the moment it was checked
///
/// Serialize-only: a cart is rebuilt through `add_line`, never decoded.
///
/// ```compile_fail
/// let _: khong_core::Cart = serde_json::from_str(r#"{"lines":[]}"#).unwrap();
/// ```
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// When the cart was created/last cleared
    #[ts(as = "String")]
    created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product to the cart or increases quantity if already present.
    ///
    /// ## Behavior
    /// - `quantity < 1` → `InvalidQuantity`
    /// - The resulting cumulative quantity is checked against
    ///   `product.stock_qty` before anything changes → `InsufficientStock`
    /// - Existing line: quantity grows, price snapshot is kept
    /// - New line: price and unit are snapshotted from `product`
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity("quantity", quantity)?;

        let existing = self.lines.iter().position(|l| l.product_id == product.id);
        let cumulative = self
            .quantity_for(&product.id)
            .checked_add(quantity)
            .ok_or_else(|| beyond_any_stock(product))?;
        ensure_available(product, cumulative)?;

        let unit_price = match existing {
            Some(i) => self.lines[i].unit_price(),
            None => Money::from_cents(product.unit_price_cents),
        };
        self.ensure_amount_fits(existing, unit_price, cumulative)?;

        match existing {
            Some(i) => self.lines[i].quantity = cumulative,
            None => self.lines.push(CartLine::snapshot(product, quantity)),
        }

        Ok(())
    }

    /// Removes the line at `index`. Nothing was reserved, so stock is untouched.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if index >= self.lines.len() {
            return Err(CoreError::not_found("Cart line", index.to_string()));
        }

        Ok(self.lines.remove(index))
    }

    /// Changes the quantity of the line at `index` by `delta`.
    ///
    /// `product` is the live catalogue record for the line's product; its
    /// `stock_qty` bounds the new quantity.
    ///
    /// ## Behavior
    /// - Result < 1 → `InvalidQuantity`, cart unchanged
    /// - Result > stock → `InsufficientStock`, cart unchanged
    pub fn adjust_quantity(&mut self, index: usize, delta: i64, product: &Product) -> CoreResult<()> {
        let line = self
            .lines
            .get(index)
            .ok_or_else(|| CoreError::not_found("Cart line", index.to_string()))?;

        if line.product_id != product.id {
            return Err(CoreError::not_found("Product for cart line", &product.id));
        }

        let new_qty = match line.quantity.checked_add(delta) {
            Some(qty) => qty,
            None if delta > 0 => return Err(beyond_any_stock(product)),
            None => i64::MIN,
        };
        validate_quantity("quantity", new_qty)?;

        let others: i64 = self
            .lines
            .iter()
            .enumerate()
            .filter(|(i, l)| *i != index && l.product_id == product.id)
            .map(|(_, l)| l.quantity)
            .sum();
        let requested = others
            .checked_add(new_qty)
            .ok_or_else(|| beyond_any_stock(product))?;
        ensure_available(product, requested)?;

        let unit_price = line.unit_price();
        self.ensure_amount_fits(Some(index), unit_price, new_qty)?;

        self.lines[index].quantity = new_qty;
        Ok(())
    }

    /// Rejects a line of `quantity` at `unit_price` whose amount, or the cart
    /// total with it, would leave the money range. `replacing` is the index of
    /// the line the new amount stands in for.
    fn ensure_amount_fits(&self, replacing: Option<usize>, unit_price: Money, quantity: i64) -> CoreResult<()> {
        let overflow = || CoreError::AmountOverflow {
            field: "quantity".to_string(),
            quantity,
            unit_price_cents: unit_price.cents(),
        };

        let line_amount = unit_price.checked_multiply_quantity(quantity).ok_or_else(overflow)?;
        self.lines
            .iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != replacing)
            .try_fold(line_amount, |acc, (_, l)| acc.checked_add(l.line_amount()))
            .ok_or_else(overflow)?;

        Ok(())
    }

    /// Σ line amounts. Pure.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_amount).sum()
    }

    /// Quantity already in the cart for a product.
    pub fn quantity_for(&self, product_id: &str) -> i64 {
        self.lines
            .iter()
            .filter(|l| l.product_id == product_id)
            .map(|l| l.quantity)
            .sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the number of lines in the cart.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity of all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Clears all lines, e.g. after the sale is committed.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }
}

/// A quantity sum past i64 is more than any product can hold.
fn beyond_any_stock(product: &Product) -> CoreError {
    CoreError::InsufficientStock {
        product_id: product.id.clone(),
        available: product.stock_qty,
        requested: i64::MAX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
