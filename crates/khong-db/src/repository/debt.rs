//! # Debt Repository (Debt Ledger)
//!
//! Lending records for goods a customer took and will bring back.
//!
//! ## Operations
//! ```text
//! create_debt(NewDebt)          validate → customer & product exist → INSERT
//! record_return(id, qty, date)  BEGIN → SELECT → Debt::record_return → UPDATE → COMMIT
//! list_by_filter(DebtFilter)    JOIN names → DebtFilter::matches
//! ```
//!
//! Lending never changes `products.stock_qty`.

use chrono::NaiveDateTime;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::customer::ensure_exists;
use khong_core::{Debt, DebtFilter, DebtListing, NewDebt};

const DEBT_COLUMNS: &str = "d.id AS id, d.customer_id AS customer_id, d.product_id AS product_id, \
     d.debt_date AS debt_date, d.quantity AS quantity, d.unit_price_cents AS unit_price_cents, \
     d.return_date AS return_date, d.return_qty AS return_qty, d.status AS status, d.note AS note";

#[derive(Debug, Clone)]
pub struct DebtRepository {
    pool: SqlitePool,
}

impl DebtRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DebtRepository { pool }
    }

    /// Stores a new debt.
    ///
    /// ## Errors
    /// - `InvalidQuantity` / `InvalidPrice` / `InvalidReturnQuantity` from the record rules
    /// - `NotFound` for an unknown customer or product
    pub async fn create_debt(&self, input: NewDebt) -> DbResult<Debt> {
        let debt = Debt::new(Uuid::new_v4().to_string(), input)?;

        debug!(
            id = %debt.id(),
            customer_id = %debt.customer_id(),
            product_id = %debt.product_id(),
            quantity = debt.quantity(),
            "Creating debt"
        );

        let mut tx = self.pool.begin().await?;
        ensure_exists(&mut tx, debt.customer_id()).await?;
        ensure_product_exists(&mut tx, debt.product_id()).await?;

        sqlx::query(
            r#"
            INSERT INTO debts (
                id, customer_id, product_id, debt_date, quantity, unit_price_cents,
                return_date, return_qty, status, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(debt.id())
        .bind(debt.customer_id())
        .bind(debt.product_id())
        .bind(debt.debt_date())
        .bind(debt.quantity())
        .bind(debt.unit_price().cents())
        .bind(debt.return_date())
        .bind(debt.return_qty())
        .bind(debt.status())
        .bind(debt.note())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %debt.id(), status = debt.status().as_str(), "Debt created");
        Ok(debt)
    }

    /// Sets the cumulative returned quantity on one debt.
    ///
    /// The read, the rule check and the write run in one transaction. On
    /// `InvalidReturnQuantity` the stored record is untouched.
    pub async fn record_return(
        &self,
        debt_id: &str,
        return_qty: i64,
        return_date: NaiveDateTime,
    ) -> DbResult<Debt> {
        debug!(id = %debt_id, return_qty, "Recording return");

        let mut tx = self.pool.begin().await?;

        // Touch the row first so this transaction holds the write lock
        // before it reads the current quantities.
        let touched = sqlx::query("UPDATE debts SET id = id WHERE id = ?1")
            .bind(debt_id)
            .execute(&mut *tx)
            .await?;
        if touched.rows_affected() == 0 {
            return Err(DbError::not_found("Debt", debt_id));
        }

        let mut debt = fetch(&mut tx, debt_id)
            .await?
            .ok_or_else(|| DbError::not_found("Debt", debt_id))?;

        debt.record_return(return_qty, return_date)?;

        sqlx::query("UPDATE debts SET return_qty = ?1, return_date = ?2, status = ?3 WHERE id = ?4")
            .bind(debt.return_qty())
            .bind(debt.return_date())
            .bind(debt.status())
            .bind(debt.id())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(id = %debt_id, return_qty, status = debt.status().as_str(), "Return recorded");
        Ok(debt)
    }

    pub async fn get(&self, debt_id: &str) -> DbResult<Debt> {
        let mut conn = self.pool.acquire().await?;
        fetch(&mut conn, debt_id)
            .await?
            .ok_or_else(|| DbError::not_found("Debt", debt_id))
    }

    /// Debts with customer and product names, newest debt date first.
    pub async fn list_by_filter(&self, filter: &DebtFilter) -> DbResult<Vec<DebtListing>> {
        debug!(?filter, "Listing debts");

        let sql = format!(
            "SELECT {DEBT_COLUMNS}, c.name AS customer_name, p.name AS product_name \
             FROM debts d \
             JOIN customers c ON c.id = d.customer_id \
             JOIN products p ON p.id = d.product_id \
             ORDER BY d.debt_date DESC, d.id"
        );
        let listings: Vec<DebtListing> = sqlx::query_as::<_, DebtListing>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter(|listing| filter.matches(listing))
            .collect();

        debug!(count = listings.len(), "Listed debts");
        Ok(listings)
    }
}

async fn fetch(conn: &mut SqliteConnection, debt_id: &str) -> DbResult<Option<Debt>> {
    let sql = format!("SELECT {DEBT_COLUMNS} FROM debts d WHERE d.id = ?1");
    let debt = sqlx::query_as::<_, Debt>(&sql)
        .bind(debt_id)
        .fetch_optional(conn)
        .await?;

    Ok(debt)
}

async fn ensure_product_exists(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM products WHERE id = ?1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    found
        .map(|_| ())
        .ok_or_else(|| DbError::not_found("Product", id))
}
