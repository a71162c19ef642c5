//! # khong-core: Pure Business Logic for Khong POS
//!
//! Sales and lending rules for a small shop: cart building, stock checks,
//! payment allocation, the checkout state machine and the debt ledger.
//! Every function here is deterministic and free of I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khong POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Shop UI (out of scope)                       │   │
//! │  │    Products ──► Cart ──► Payment ──► Sales list ──► Debts       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ khong-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   cart   │ │  stock   │ │ payment  │ │ checkout │          │   │
//! │  │   │ CartLine │ │ensure_   │ │Allocation│ │  Draft → │          │   │
//! │  │   │   Cart   │ │available │ │ validate │ │ Committed│          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌──────────┐          │   │
//! │  │   │   debt   │ │  types   │ │  money   │ │  report  │          │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └──────────┘          │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    khong-db (Database Layer)                    │   │
//! │  │     SQLite stores, atomic stock deduction, sale finalizer       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Customer, Sale, SaleItem, PaymentType
//! - [`money`] - Integer money in minor units
//! - [`cart`] - Cart Aggregator
//! - [`stock`] - Stock Guard rule
//! - [`payment`] - Payment Allocator
//! - [`checkout`] - Sale Finalizer state machine
//! - [`debt`] - Debt Ledger records and filters
//! - [`report`] - Dashboard summaries
//! - [`error`], [`validation`]
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use khong_core::{Cart, Money, PaymentInput, PaymentType, Product};
//!
//! let beer = Product {
//!     id: "beerlao".into(),
//!     name: "Beerlao".into(),
//!     brand: None,
//!     unit: "case".into(),
//!     stock_qty: 50,
//!     unit_price_cents: Money::from_major(120_000).cents(),
//!     created_at: Utc::now(),
//!     updated_at: Utc::now(),
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_line(&beer, 2).unwrap();
//!
//! let payment = PaymentInput::for_method(PaymentType::Cash, Money::from_major(250_000));
//! let allocation = khong_core::payment::validate(&payment, cart.total()).unwrap();
//! assert_eq!(allocation.change_due, Money::from_major(10_000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod debt;
pub mod error;
pub mod money;
pub mod payment;
pub mod report;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use checkout::{Checkout, CheckoutStatus};
pub use debt::{Debt, DebtFilter, DebtListing, DebtStatus, NewDebt};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{Allocation, PaymentInput};
pub use report::SalesSummary;
pub use stock::StockRequest;
pub use types::*;

/// Stock level at or below which a product shows on the low-stock card.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;
