//! # Repository Module
//!
//! Database repository implementations for Khong POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Database (pool.rs)                                                    │
//! │  ├── products()  → ProductRepository   list, get, search, low_stock    │
//! │  ├── customers() → CustomerRepository  insert, get, list, search       │
//! │  ├── stock()     → StockGuard          ensure_available                │
//! │  ├── sales()     → SaleRepository      get, list_by_filter             │
//! │  ├── debts()     → DebtRepository      create, record_return, list     │
//! │  └── reports()   → ReportRepository    daily_summary, pending_debts    │
//! │                                                                         │
//! │  The core never owns rows: every store borrows the pool and returns    │
//! │  owned khong-core values.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod debt;
pub mod product;
pub mod report;
pub mod sale;
pub mod stock;

/// `%fragment%` with LIKE wildcards in the fragment escaped (use `ESCAPE '\'`).
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
