//! # Report Repository
//!
//! Dashboard queries: today's takings, open debts, products running low.

use chrono::{Duration, NaiveDate};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::debt::DebtRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use khong_core::{DebtFilter, DebtListing, DebtStatus, Product, SalesSummary};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Summary of the sales made on a UTC calendar day.
    pub async fn daily_summary(&self, date: NaiveDate) -> DbResult<SalesSummary> {
        debug!(%date, "Computing daily summary");

        let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);
        let sales = SaleRepository::new(self.pool.clone())
            .list_between(start, end)
            .await?;

        Ok(SalesSummary::from_sales(&sales))
    }

    /// Debts not fully returned, newest first.
    pub async fn pending_debts(&self) -> DbResult<Vec<DebtListing>> {
        let all = DebtRepository::new(self.pool.clone())
            .list_by_filter(&DebtFilter::default())
            .await?;

        Ok(all
            .into_iter()
            .filter(|listing| listing.debt.status() != DebtStatus::Returned)
            .collect())
    }

    /// Products at or below `threshold` units.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        ProductRepository::new(self.pool.clone())
            .low_stock(threshold)
            .await
    }
}
