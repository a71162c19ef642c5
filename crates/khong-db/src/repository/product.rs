//! # Product Repository (Catalog)
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - `list` / `get` for the cashier's product picker
//! - `search` over name and brand
//! - `low_stock` for the dashboard card
//!
//! Stock is never written here except on insert. Deductions go through
//! [`crate::repository::stock::commit_deduction`].

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::like_pattern;
use khong_core::validation::{validate_amount, validate_product_name, validate_unit};
use khong_core::{CoreError, Product};

const PRODUCT_COLUMNS: &str =
    "id, name, brand, unit, stock_qty, unit_price_cents, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let all = repo.list().await?;
/// let beer = repo.get("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists every product, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn find(&self, id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Fetching product");

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its ID, failing with `NotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        self.find(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts a new product.
    ///
    /// ## Validation
    /// Name and unit required, price and stock non-negative.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        validate_product_name(&product.name)?;
        validate_unit(&product.unit)?;
        validate_amount("unit_price", product.unit_price_cents)?;
        if product.stock_qty < 0 {
            return Err(CoreError::InvalidQuantity {
                field: "stock_qty".to_string(),
                value: product.stock_qty,
            }
            .into());
        }

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, brand, unit, stock_qty, unit_price_cents, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(product.name.trim())
        .bind(&product.brand)
        .bind(product.unit.trim())
        .bind(product.stock_qty)
        .bind(product.unit_price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        self.get(&product.id).await
    }

    /// Searches name and brand (contains, case-insensitive for Latin text).
    ///
    /// An empty query lists the first `limit` products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name LIKE ?1 ESCAPE '\\' OR brand LIKE ?1 ESCAPE '\\' \
             ORDER BY name, id LIMIT ?2"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Products at or below `threshold` units, lowest stock first.
    pub async fn low_stock(&self, threshold: i64) -> DbResult<Vec<Product>> {
        debug!(threshold = threshold, "Listing low-stock products");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock_qty <= ?1 ORDER BY stock_qty, name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(threshold)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts total products (for diagnostics and seeding).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a product with a fresh id and timestamps.
pub fn new_product(
    name: impl Into<String>,
    brand: Option<String>,
    unit: impl Into<String>,
    stock_qty: i64,
    unit_price_cents: i64,
) -> Product {
    let now = Utc::now();
    Product {
        id: generate_product_id(),
        name: name.into(),
        brand,
        unit: unit.into(),
        stock_qty,
        unit_price_cents,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_db;

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = memory_db().await;
        let beer = new_product("Beerlao Lager", Some("Beerlao".into()), "case", 50, 12_000_000);

        let stored = db.products().insert(&beer).await.unwrap();
        assert_eq!(stored.name, "Beerlao Lager");
        assert_eq!(stored.stock_qty, 50);

        let fetched = db.products().get(&beer.id).await.unwrap();
        assert_eq!(fetched.unit_price_cents, 12_000_000);
        assert_eq!(fetched.brand.as_deref(), Some("Beerlao"));
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let db = memory_db().await;

        assert!(matches!(
            db.products().get("missing").await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.products().find("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_validates() {
        let db = memory_db().await;

        let nameless = new_product("  ", None, "case", 1, 100);
        assert!(matches!(
            db.products().insert(&nameless).await,
            Err(DbError::Domain(CoreError::Validation(_)))
        ));

        let negative = new_product("Water", None, "pack", 1, -5);
        assert!(matches!(
            db.products().insert(&negative).await,
            Err(DbError::Domain(CoreError::InvalidPrice { .. }))
        ));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_search_and_low_stock() {
        let db = memory_db().await;
        let repo = db.products();
        repo.insert(&new_product("Water 600ml", Some("Tigerhead".into()), "pack", 100, 1_500_000))
            .await
            .unwrap();
        repo.insert(&new_product("Beerlao Dark", Some("Beerlao".into()), "case", 4, 13_000_000))
            .await
            .unwrap();
        repo.insert(&new_product("Cooking oil", None, "bottle", 10, 1_800_000))
            .await
            .unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Beerlao Dark", "Cooking oil", "Water 600ml"]);

        let hits = repo.search("tiger", 20).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Water 600ml");

        assert_eq!(repo.search("", 2).await.unwrap().len(), 2);
        assert!(repo.search("100%", 20).await.unwrap().is_empty());

        let low: Vec<i64> = repo.low_stock(10).await.unwrap().iter().map(|p| p.stock_qty).collect();
        assert_eq!(low, vec![4, 10]);
    }
}
