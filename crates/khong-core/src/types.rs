//! # Domain Types
//!
//! Core domain types used throughout Khong POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  sale_id (FK)   │       │
//! │  │  name, brand    │   │  customer_id?   │   │  line_no        │       │
//! │  │  unit           │   │  total_cents    │   │  unit snapshot  │       │
//! │  │  stock_qty      │   │  cash / transfer│   │  price snapshot │       │
//! │  │  unit_price     │   │  payment_type   │   │  line_amount    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    Customer     │   │  PaymentType    │   Debt lives in debt.rs     │
//! │  │  ─────────────  │   │  ─────────────  │   CartLine in cart.rs       │
//! │  │  id, name       │   │  Cash           │                             │
//! │  │  phone          │   │  Transfer       │                             │
//! │  │  address?       │   │  Mixed, Credit  │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sale items freeze the unit label, name and price of the product at the
//! moment it was added to the cart. Later catalogue edits never rewrite history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier.
    pub name: String,

    /// Brand, when the product has one.
    pub brand: Option<String>,

    /// Selling unit label ("case", "pack", "kg", ...).
    pub unit: String,

    /// Units currently in stock. Never negative.
    pub stock_qty: i64,

    /// Price per unit in minor units.
    pub unit_price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A shop customer. Referenced by id from sales and debts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Payment Type
// =============================================================================

/// How a sale is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Paid in cash.
    #[default]
    Cash,
    /// Paid by bank transfer.
    Transfer,
    /// Split between cash and transfer.
    Mixed,
    /// Deferred to the customer's account.
    Credit,
}

impl PaymentType {
    /// All payment types, in display order.
    pub const ALL: [PaymentType; 4] = [
        PaymentType::Cash,
        PaymentType::Transfer,
        PaymentType::Mixed,
        PaymentType::Credit,
    ];

    /// Whether the customer pays at the counter.
    #[inline]
    pub const fn is_immediate(&self) -> bool {
        !matches!(self, PaymentType::Credit)
    }

    /// Stable storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Cash => "cash",
            PaymentType::Transfer => "transfer",
            PaymentType::Mixed => "mixed",
            PaymentType::Credit => "credit",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A finalized sale header. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Required when `payment_type` is credit.
    pub customer_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Always equals the sum of the items' line amounts.
    pub total_cents: i64,
    pub cash_cents: i64,
    pub transfer_cents: i64,
    pub payment_type: PaymentType,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Cash plus transfer actually received.
    #[inline]
    pub fn paid(&self) -> Money {
        Money::from_cents(self.cash_cents + self.transfer_cents)
    }

    /// Change handed back to the customer.
    pub fn change_due(&self) -> Money {
        if self.payment_type.is_immediate() {
            self.paid().saturating_sub_to_zero(self.total())
        } else {
            Money::zero()
        }
    }

    /// Amount owed on the customer's account.
    pub fn outstanding_credit(&self) -> Money {
        if self.payment_type.is_immediate() {
            Money::zero()
        } else {
            self.total()
        }
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line of a finalized sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub sale_id: String,
    /// Position in the cart, starting at 0.
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit label at time of sale (frozen).
    pub unit: String,
    pub quantity: i64,
    /// Unit price at time of adding to cart (frozen).
    pub unit_price_cents: i64,
    /// quantity × unit_price_cents
    pub line_amount_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn line_amount(&self) -> Money {
        Money::from_cents(self.line_amount_cents)
    }
}

/// A sale header together with its ordered items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinalizedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

impl FinalizedSale {
    /// Recomputes the total from the items.
    pub fn items_total(&self) -> Money {
        self.items.iter().map(SaleItem::line_amount).sum()
    }
}

// =============================================================================
// Sale Listing
// =============================================================================

/// A sale header joined with the customer's name, for the sales list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleListing {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sale: Sale,
    pub customer_name: Option<String>,
}

/// Sales list filter. Every criterion that is set must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilter {
    /// Matches the customer name (case-insensitive) or the sale id.
    pub search: Option<String>,
    /// Matches the UTC calendar date of `created_at`.
    pub date: Option<NaiveDate>,
}

impl SaleFilter {
    /// Pure predicate over one listing row.
    pub fn matches(&self, listing: &SaleListing) -> bool {
        let matches_search = match normalized(self.search.as_deref()) {
            None => true,
            Some(term) => {
                listing.sale.id.to_lowercase().contains(&term)
                    || listing
                        .customer_name
                        .as_deref()
                        .is_some_and(|name| name.to_lowercase().contains(&term))
            }
        };

        let matches_date = self
            .date
            .map_or(true, |date| listing.sale.created_at.date_naive() == date);

        matches_search && matches_date
    }
}

/// Lowercases a search fragment; blank fragments mean "no filter".
pub(crate) fn normalized(fragment: Option<&str>) -> Option<String> {
    fragment
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

// =============================================================================
// Unit Tests
// =============================================================================
