//! Fixtures shared by the repository tests.

use std::path::{Path, PathBuf};

use crate::pool::{Database, DbConfig};
use crate::repository::product::new_product;
use khong_core::{Customer, Product};

pub(crate) async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

/// A file-backed database with several connections, for concurrency tests.
pub(crate) async fn file_db(name: &str) -> (Database, PathBuf) {
    let path = std::env::temp_dir().join(format!("khong-{}-{}.db", name, uuid::Uuid::new_v4()));
    let db = Database::new(DbConfig::new(&path).max_connections(4))
        .await
        .unwrap();
    (db, path)
}

pub(crate) fn remove_db_files(path: &Path) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

pub(crate) async fn seed_product(db: &Database, name: &str, stock_qty: i64, unit_price_cents: i64) -> Product {
    db.products()
        .insert(&new_product(name, None, "case", stock_qty, unit_price_cents))
        .await
        .unwrap()
}

pub(crate) async fn seed_customer(db: &Database, name: &str) -> Customer {
    db.customers().insert(name, "020 5551 2345", None).await.unwrap()
}
