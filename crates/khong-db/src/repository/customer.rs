//! # Customer Repository
//!
//! Customers referenced by credit sales and debts.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use khong_core::validation::{validate_customer_name, validate_phone};
use khong_core::Customer;

const CUSTOMER_COLUMNS: &str = "id, name, phone, address, created_at";

#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Validates and stores a new customer with a fresh id.
    ///
    /// Name and phone are trimmed; a blank address is stored as NULL.
    pub async fn insert(&self, name: &str, phone: &str, address: Option<&str>) -> DbResult<Customer> {
        validate_customer_name(name)?;
        validate_phone(phone)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            address: address
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string),
            created_at: Utc::now(),
        };

        debug!(id = %customer.id, name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (id, name, phone, address, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn get(&self, id: &str) -> DbResult<Customer> {
        debug!(id = %id, "Fetching customer");

        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// All customers by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        debug!("Listing customers");

        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name, id");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Name or phone contains `query`.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        debug!(query = %query.trim(), "Searching customers");

        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE name LIKE ?1 ESCAPE '\\' OR phone LIKE ?1 ESCAPE '\\' \
             ORDER BY name, id"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .bind(like_pattern(query))
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }
}

/// Fails with `NotFound` unless the customer exists. Runs on the caller's
/// connection so it can take part in a transaction.
pub(crate) async fn ensure_exists(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?1")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(DbError::not_found("Customer", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_db;
    use khong_core::CoreError;

    #[tokio::test]
    async fn test_insert_get_list() {
        let db = memory_db().await;
        let repo = db.customers();

        let noy = repo.insert(" Noy ", "020 5551 2345", Some("  ")).await.unwrap();
        repo.insert("Khamla", "+856 20 999 8765", Some("Ban Nongbone")).await.unwrap();

        let fetched = repo.get(&noy.id).await.unwrap();
        assert_eq!(fetched.name, "Noy");
        assert_eq!(fetched.address, None);

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Khamla", "Noy"]);
    }

    #[tokio::test]
    async fn test_search_by_name_or_phone() {
        let db = memory_db().await;
        let repo = db.customers();
        repo.insert("Somchai", "02055512345", None).await.unwrap();
        repo.insert("Vanh", "02099987654", None).await.unwrap();

        assert_eq!(repo.search("somch").await.unwrap().len(), 1);
        assert_eq!(repo.search("99987").await.unwrap()[0].name, "Vanh");
        assert_eq!(repo.search("").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_and_unknown_id() {
        let db = memory_db().await;
        let repo = db.customers();

        assert!(matches!(
            repo.insert("Noy", "call me", None).await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));
        assert!(matches!(repo.get("nobody").await, Err(DbError::NotFound { .. })));
    }
}
