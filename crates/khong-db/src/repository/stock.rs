//! # Stock Guard (database half)
//!
//! ## Commit Deduction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit_deduction(tx, requests)                                         │
//! │                                                                         │
//! │  for each (product_id, qty):                                            │
//! │      UPDATE products SET stock_qty = stock_qty - qty                    │
//! │      WHERE id = ? AND stock_qty >= qty        ← read-check-decrement   │
//! │           │                                                             │
//! │           ├── 1 row  → next request                                    │
//! │           └── 0 rows → re-read stock                                   │
//! │                          ├── no row  → NotFound                         │
//! │                          └── row     → InsufficientStock               │
//! │                                                                         │
//! │  Any error → caller drops the transaction → SQLite rolls back every    │
//! │  decrement made so far.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is a single statement. Whichever concurrent
//! transaction gets the write lock second sees the first one's decrement.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use khong_core::stock::{check_against, StockRequest};

/// Read-side stock checks against live data.
#[derive(Debug, Clone)]
pub struct StockGuard {
    pool: SqlitePool,
}

impl StockGuard {
    pub fn new(pool: SqlitePool) -> Self {
        StockGuard { pool }
    }

    /// Current stock of a product.
    pub async fn available(&self, product_id: &str) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        current_stock(&mut conn, product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))
    }

    /// Fails with `InsufficientStock` if `requested` exceeds current stock.
    pub async fn ensure_available(&self, product_id: &str, requested: i64) -> DbResult<()> {
        let available = self.available(product_id).await?;
        debug!(product_id = %product_id, available, requested, "Checking stock");

        check_against(product_id, available, requested)?;
        Ok(())
    }
}

async fn current_stock(conn: &mut SqliteConnection, product_id: &str) -> DbResult<Option<i64>> {
    let stock: Option<i64> = sqlx::query_scalar("SELECT stock_qty FROM products WHERE id = ?1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;

    Ok(stock)
}

/// Deducts every request inside the caller's transaction, all or nothing.
///
/// On error some decrements may already have run on `conn`; the caller must
/// roll back (dropping an uncommitted `Transaction` does).
pub async fn commit_deduction(conn: &mut SqliteConnection, requests: &[StockRequest]) -> DbResult<()> {
    let now = Utc::now();

    for request in requests {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_qty = stock_qty - ?1, updated_at = ?2
            WHERE id = ?3 AND stock_qty >= ?1
            "#,
        )
        .bind(request.quantity)
        .bind(now)
        .bind(&request.product_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let available = current_stock(&mut *conn, &request.product_id)
                .await?
                .ok_or_else(|| DbError::not_found("Product", &request.product_id))?;

            warn!(
                product_id = %request.product_id,
                available,
                requested = request.quantity,
                "Stock deduction refused"
            );
            check_against(&request.product_id, available, request.quantity)?;

            // The row exists and has enough stock, yet nothing was updated.
            return Err(DbError::TransactionFailed(format!(
                "stock update for {} affected no rows",
                request.product_id
            )));
        }

        debug!(product_id = %request.product_id, quantity = request.quantity, "Stock deducted");
    }

    Ok(())
}
