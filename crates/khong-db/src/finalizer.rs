//! # Sale Finalizer
//!
//! Turns a cart and payment into a persisted sale, atomically.
//!
//! ## Finalization Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    finalize(cart, payment)                              │
//! │                                                                         │
//! │  Checkout::new ──► validate()      EmptyCart / UnderPayment /           │
//! │        │              │            MissingCustomer → Rejected, no I/O   │
//! │        │              ▼                                                 │
//! │        │         BEGIN                                                  │
//! │        │           ├── commit_deduction(lines)   first write: takes     │
//! │        │           │                             the SQLite write lock  │
//! │        │           ├── customer exists?                                 │
//! │        │           ├── checkout.commit(id, now)  → Sale + SaleItems     │
//! │        │           └── INSERT sales, sale_items                         │
//! │        │                                                                │
//! │        ├── Ok  ──► COMMIT   (stock deducted AND sale stored)            │
//! │        └── Err ──► ROLLBACK (neither happened), checkout Rejected       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::customer::ensure_exists;
use crate::repository::sale::insert_finalized;
use crate::repository::stock::commit_deduction;
use khong_core::{Cart, Checkout, FinalizedSale, PaymentInput};

#[derive(Debug, Clone)]
pub struct SaleFinalizer {
    pool: SqlitePool,
}

impl SaleFinalizer {
    pub fn new(pool: SqlitePool) -> Self {
        SaleFinalizer { pool }
    }

    /// Validates, deducts stock and stores the sale in one transaction.
    ///
    /// The cart is only read. Clear it after a successful call.
    pub async fn finalize(&self, cart: &Cart, payment: PaymentInput) -> DbResult<FinalizedSale> {
        let mut checkout = Checkout::new(cart, payment);

        debug!(
            lines = checkout.lines().len(),
            total = %checkout.total(),
            payment_type = checkout.payment().payment_type.as_str(),
            "Finalizing sale"
        );

        if let Err(e) = checkout.validate() {
            warn!(code = e.code(), error = %e, "Sale rejected at validation");
            return Err(e.into());
        }

        let mut tx = self.pool.begin().await?;

        let persisted = persist(&mut tx, &mut checkout).await;

        match persisted {
            Ok(finalized) => {
                tx.commit().await?;
                info!(
                    sale_id = %finalized.sale.id,
                    total = %finalized.sale.total(),
                    payment_type = finalized.sale.payment_type.as_str(),
                    items = finalized.items.len(),
                    "Sale committed"
                );
                Ok(finalized)
            }
            Err(e) => {
                // dropping `tx` rolls back any stock already deducted
                checkout.reject();
                warn!(code = e.code(), error = %e, "Sale rejected at commit");
                Err(e)
            }
        }
    }
}

async fn persist(conn: &mut SqliteConnection, checkout: &mut Checkout) -> DbResult<FinalizedSale> {
    commit_deduction(&mut *conn, &checkout.stock_requests()).await?;

    if let Some(customer_id) = checkout.payment().customer_id.clone() {
        ensure_exists(&mut *conn, &customer_id).await?;
    }

    let finalized = checkout.commit(Uuid::new_v4().to_string(), Utc::now())?;
    insert_finalized(&mut *conn, &finalized).await?;

    Ok(finalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::test_support::{file_db, memory_db, seed_customer, seed_product};
    use khong_core::{CoreError, Money, PaymentType};

    #[tokio::test]
    async fn test_cash_sale_deducts_stock_and_stores_sale() {
        let db = memory_db().await;
        let beer = seed_product(&db, "Beerlao", 50, 12_000_000).await;
        let water = seed_product(&db, "Water", 100, 1_500_000).await;

        let mut cart = Cart::new();
        cart.add_line(&beer, 2).unwrap();
        cart.add_line(&water, 4).unwrap();
        let payment = PaymentInput {
            cash: Money::from_cents(40_000_000),
            ..PaymentInput::for_method(PaymentType::Cash, cart.total())
        };

        let finalized = db.finalizer().finalize(&cart, payment).await.unwrap();

        assert_eq!(finalized.sale.total_cents, 30_000_000);
        assert_eq!(finalized.sale.change_due(), Money::from_cents(10_000_000));
        assert_eq!(db.products().get(&beer.id).await.unwrap().stock_qty, 48);
        assert_eq!(db.products().get(&water.id).await.unwrap().stock_qty, 96);

        let stored = db.sales().get(&finalized.sale.id).await.unwrap();
        assert_eq!(stored, finalized);
    }

    #[tokio::test]
    async fn test_empty_cart_creates_nothing() {
        let db = memory_db().await;

        let err = db
            .finalizer()
            .finalize(&Cart::new(), PaymentInput::for_method(PaymentType::Cash, Money::zero()))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
        assert!(db.sales().list_by_filter(&Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_credit_sale_requires_known_customer() {
        let db = memory_db().await;
        let oil = seed_product(&db, "Cooking oil", 30, 1_800_000).await;
        let mut cart = Cart::new();
        cart.add_line(&oil, 3).unwrap();

        let missing = PaymentInput::for_method(PaymentType::Credit, cart.total());
        assert!(matches!(
            db.finalizer().finalize(&cart, missing).await,
            Err(DbError::Domain(CoreError::MissingCustomer))
        ));

        let unknown = PaymentInput::for_method(PaymentType::Credit, cart.total()).with_customer("ghost");
        assert!(matches!(
            db.finalizer().finalize(&cart, unknown).await,
            Err(DbError::NotFound { .. })
        ));
        // deduction ran before the customer check and was rolled back
        assert_eq!(db.products().get(&oil.id).await.unwrap().stock_qty, 30);

        let noy = seed_customer(&db, "Noy").await;
        let credit = PaymentInput::for_method(PaymentType::Credit, cart.total()).with_customer(&noy.id);
        let finalized = db.finalizer().finalize(&cart, credit).await.unwrap();

        assert_eq!(finalized.sale.customer_id.as_deref(), Some(noy.id.as_str()));
        assert_eq!(finalized.sale.cash_cents, 0);
        assert_eq!(finalized.sale.outstanding_credit(), Money::from_cents(5_400_000));
        assert_eq!(db.products().get(&oil.id).await.unwrap().stock_qty, 27);
    }

    #[tokio::test]
    async fn test_stale_cart_is_rejected_without_partial_deduction() {
        let db = memory_db().await;
        let beer = seed_product(&db, "Beerlao", 10, 12_000_000).await;
        let oil = seed_product(&db, "Cooking oil", 5, 1_800_000).await;

        // both carts were built against the same snapshot
        let mut first = Cart::new();
        first.add_line(&oil, 4).unwrap();
        let mut second = Cart::new();
        second.add_line(&beer, 2).unwrap();
        second.add_line(&oil, 3).unwrap();

        db.finalizer()
            .finalize(&first, PaymentInput::for_method(PaymentType::Transfer, first.total()))
            .await
            .unwrap();

        let err = db
            .finalizer()
            .finalize(&second, PaymentInput::for_method(PaymentType::Cash, second.total()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { available: 1, requested: 3, .. })
        ));
        assert_eq!(db.products().get(&beer.id).await.unwrap().stock_qty, 10);
        assert_eq!(db.products().get(&oil.id).await.unwrap().stock_qty, 1);
        assert_eq!(db.sales().list_by_filter(&Default::default()).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_finalizations_never_oversell() {
        let (db, path) = file_db("concurrent-finalize").await;
        let beer = seed_product(&db, "Beerlao", 5, 12_000_000).await;

        let mut cart = Cart::new();
        cart.add_line(&beer, 5).unwrap();

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let db = db.clone();
                let cart = cart.clone();
                tokio::spawn(async move {
                    let payment = PaymentInput::for_method(PaymentType::Cash, cart.total());
                    db.finalizer().finalize(&cart, payment).await
                })
            })
            .collect();

        let mut committed = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => committed += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { available: 0, .. })) => refused += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!((committed, refused), (1, 1));
        assert_eq!(db.products().get(&beer.id).await.unwrap().stock_qty, 0);

        db.close().await;
        crate::test_support::remove_db_files(&path);
    }
}
