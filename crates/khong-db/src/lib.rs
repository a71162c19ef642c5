//! # khong-db: Database Layer for Khong POS
//!
//! SQLite persistence for the rules in `khong-core`, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Khong POS Data Flow                              │
//! │                                                                         │
//! │  Shop UI: "Confirm sale"                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     khong-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │ 001_initial  │  │   │
//! │  │   │ SqlitePool    │◄───│ CustomerRepo  │    │   _schema    │  │   │
//! │  │   │               │    │ SaleRepo      │    │              │  │   │
//! │  │   │ SaleFinalizer │    │ DebtRepo      │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (KHONG_DB_PATH)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven shop settings
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`finalizer`] - Atomic sale commit
//! - [`repository`] - Catalog, customers, stock, sales, debts, reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use khong_core::{Cart, PaymentInput, PaymentType};
//! use khong_db::{Database, ShopConfig};
//!
//! let config = ShopConfig::from_env()?;
//! let db = Database::new(config.db_config()).await?;
//!
//! let mut cart = Cart::new();
//! cart.add_line(&db.products().get(&product_id).await?, 2)?;
//!
//! let payment = PaymentInput::for_method(PaymentType::Cash, cart.total());
//! let sale = db.finalizer().finalize(&cart, payment).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod finalizer;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ShopConfig};
pub use error::{DbError, DbResult};
pub use finalizer::SaleFinalizer;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::debt::DebtRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::sale::SaleRepository;
pub use repository::stock::StockGuard;
