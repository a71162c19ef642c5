//! # Sale Repository
//!
//! Read access to finalized sales. Sales are written only by
//! [`crate::finalizer::SaleFinalizer`] and never updated afterwards.
//!
//! ## Tables
//! ```text
//! sales (id, customer_id?, created_at, total_cents, cash_cents,
//!        transfer_cents, payment_type)
//!   └──< sale_items (sale_id, line_no, product_id, name_snapshot, unit,
//!                    quantity, unit_price_cents, line_amount_cents)
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use khong_core::{FinalizedSale, Sale, SaleFilter, SaleItem, SaleListing};

const SALE_COLUMNS: &str = "s.id AS id, s.customer_id AS customer_id, s.created_at AS created_at, \
     s.total_cents AS total_cents, s.cash_cents AS cash_cents, \
     s.transfer_cents AS transfer_cents, s.payment_type AS payment_type";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale header with its items in line order.
    pub async fn get(&self, id: &str) -> DbResult<FinalizedSale> {
        debug!(id = %id, "Fetching sale");

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales s WHERE s.id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;

        let items = self.get_items(id).await?;

        Ok(FinalizedSale { sale, items })
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                sale_id, line_no, product_id, name_snapshot, unit,
                quantity, unit_price_cents, line_amount_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Sales with customer names, newest first, narrowed by `filter`.
    pub async fn list_by_filter(&self, filter: &SaleFilter) -> DbResult<Vec<SaleListing>> {
        debug!(search = ?filter.search, date = ?filter.date, "Listing sales");

        let sql = format!(
            "SELECT {SALE_COLUMNS}, c.name AS customer_name \
             FROM sales s LEFT JOIN customers c ON c.id = s.customer_id \
             ORDER BY s.created_at DESC, s.id"
        );
        let listings: Vec<SaleListing> = sqlx::query_as::<_, SaleListing>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .filter(|listing| filter.matches(listing))
            .collect();

        debug!(count = listings.len(), "Listed sales");
        Ok(listings)
    }

    /// Sale headers with `start <= created_at < end`, oldest first.
    pub async fn list_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Sale>> {
        debug!(%start, %end, "Listing sales in range");

        // Compared as parsed timestamps so fractional seconds sort correctly.
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales s \
             WHERE julianday(s.created_at) >= julianday(?1) AND julianday(s.created_at) < julianday(?2) \
             ORDER BY s.created_at, s.id"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}

/// Writes a committed sale and its items on the caller's connection.
pub(crate) async fn insert_finalized(conn: &mut SqliteConnection, finalized: &FinalizedSale) -> DbResult<()> {
    let sale = &finalized.sale;
    debug!(id = %sale.id, total = sale.total_cents, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, customer_id, created_at, total_cents, cash_cents, transfer_cents, payment_type
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(sale.created_at)
    .bind(sale.total_cents)
    .bind(sale.cash_cents)
    .bind(sale.transfer_cents)
    .bind(sale.payment_type)
    .execute(&mut *conn)
    .await?;

    for item in &finalized.items {
        debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Adding sale item");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                sale_id, line_no, product_id, name_snapshot, unit,
                quantity, unit_price_cents, line_amount_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.sale_id)
        .bind(item.line_no)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(&item.unit)
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .bind(item.line_amount_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
