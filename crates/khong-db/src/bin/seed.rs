//! # Seed Data Generator
//!
//! Populates the database with a demo catalogue and customers.
//!
//! ## Usage
//! ```bash
//! # Use KHONG_DB_PATH (default ./khong.db)
//! cargo run -p khong-db --bin seed
//!
//! # Specify database path
//! cargo run -p khong-db --bin seed -- --db ./data/khong.db
//!
//! # More log output
//! RUST_LOG=debug cargo run -p khong-db --bin seed
//! ```
//!
//! Skips seeding when the catalogue already has products.

use std::env;

use chrono::Utc;
use khong_core::{Money, NewDebt};
use khong_db::repository::product::new_product;
use khong_db::{Database, ShopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// (name, brand, unit, stock, price in whole kip)
const PRODUCTS: &[(&str, Option<&str>, &str, i64, i64)] = &[
    ("Beerlao Lager", Some("Beerlao"), "case", 50, 120_000),
    ("Beerlao Dark", Some("Beerlao"), "case", 20, 135_000),
    ("Drinking water 600ml", Some("Tigerhead"), "pack", 100, 15_000),
    ("Sticky rice", None, "kg", 200, 15_000),
    ("Cooking oil 1L", Some("Thip"), "bottle", 30, 18_000),
    ("Ice", None, "bag", 8, 5_000),
];

/// (name, phone, address)
const CUSTOMERS: &[(&str, &str, Option<&str>)] = &[
    ("Noy Phommachanh", "020 5551 2345", Some("Ban Sisavath, Vientiane")),
    ("Khamla Vongsa", "+856 20 9998 7654", None),
    ("Somchai Keo", "030 555 0101", Some("Ban Nongbone")),
];

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,khong=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config = ShopConfig::from_env()?;

    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Khong POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $KHONG_DB_PATH or ./khong.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(arg = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    info!(store = %config.store_name, path = %config.database_path.display(), "Seeding database");

    let db = Database::new(config.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping seed");
        return Ok(());
    }

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for &(name, brand, unit, stock, price) in PRODUCTS {
        let product = new_product(
            name,
            brand.map(str::to_string),
            unit,
            stock,
            Money::from_major(price).cents(),
        );
        products.push(db.products().insert(&product).await?);
    }
    info!(count = products.len(), "Products inserted");

    let mut customers = Vec::with_capacity(CUSTOMERS.len());
    for &(name, phone, address) in CUSTOMERS {
        customers.push(db.customers().insert(name, phone, address).await?);
    }
    info!(count = customers.len(), "Customers inserted");

    // One open debt so the ledger page has something to show.
    if let (Some(customer), Some(beer)) = (customers.first(), products.first()) {
        let debt = db
            .debts()
            .create_debt(NewDebt::for_product(&customer.id, beer, 5, Utc::now().naive_local()).with_note("demo"))
            .await?;
        info!(debt_id = %debt.id(), "Sample debt inserted");
    }

    let low = db.reports().low_stock(config.low_stock_threshold).await?;
    info!(
        low_stock = low.len(),
        threshold = config.low_stock_threshold,
        "Seed complete"
    );

    db.close().await;
    Ok(())
}
