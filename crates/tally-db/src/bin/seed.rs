//! # Seed Data Generator
//!
//! Populates a development database with staff accounts, categories and
//! a small catalog.
//!
//! ## Usage
//! ```bash
//! # Seed ./data/tally.db (or $TALLY_DATABASE_PATH)
//! cargo run -p tally-db --bin seed
//!
//! # Specify database path
//! cargo run -p tally-db --bin seed -- --db ./data/dev.db
//! ```
//!
//! ## Generated Data
//! - `admin@example.com` (admin) and `cashier@example.com` (cashier), both
//!   with password `password`
//! - Beverages, Snacks, Dairy and Household categories
//! - Products with opening stock booked through the stock ledger; a few
//!   start at or below their minimum level so the dashboard has low-stock
//!   rows to show

use std::env;
use std::path::Path;

use anyhow::{anyhow, Context};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use tracing_subscriber::EnvFilter;

use tally_core::validation::{StockAdjustment, DEFAULT_MIN_STOCK_LEVEL};
use tally_core::{MovementType, ProductFields, ProductStatus, Role};
use tally_db::{Database, DbConfig};

const DEFAULT_DB_PATH: &str = "./data/tally.db";
const DEFAULT_PASSWORD: &str = "password";

const CATEGORIES: &[(&str, &str)] = &[
    ("Beverages", "Soft drinks, water and juice"),
    ("Snacks", "Chips, candy and cookies"),
    ("Dairy", "Milk, cheese and yogurt"),
    ("Household", "Cleaning and paper goods"),
];

/// (category, name, sku, purchase cents, selling cents, opening stock)
const PRODUCTS: &[(&str, &str, &str, i64, i64, i64)] = &[
    ("Beverages", "Coca-Cola 330ml", "BEV-COKE-330", 60, 99, 120),
    ("Beverages", "Coca-Cola 1.5L", "BEV-COKE-1500", 140, 219, 40),
    ("Beverages", "Sprite 330ml", "BEV-SPRITE-330", 58, 99, 4),
    ("Beverages", "Still Water 500ml", "BEV-WATER-500", 20, 59, 200),
    ("Beverages", "Orange Juice 1L", "BEV-OJ-1000", 150, 249, 0),
    ("Snacks", "Salted Chips 150g", "SNK-CHIPS-150", 90, 179, 35),
    ("Snacks", "Chocolate Bar", "SNK-CHOC-50", 45, 89, 3),
    ("Snacks", "Oat Cookies", "SNK-COOKIE-200", 110, 199, 18),
    ("Dairy", "Whole Milk 1L", "DRY-MILK-1000", 70, 119, 24),
    ("Dairy", "Cheddar 200g", "DRY-CHED-200", 210, 349, 5),
    ("Dairy", "Greek Yogurt", "DRY-YOG-150", 55, 99, 30),
    ("Household", "Paper Towels 2-Pack", "HH-TOWEL-2", 180, 299, 15),
    ("Household", "Dish Soap 500ml", "HH-SOAP-500", 95, 179, 2),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args: Vec<String> = env::args().collect();
    let mut db_path = env::var("TALLY_DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Tally POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {DEFAULT_DB_PATH})");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Tally POS Seed Data Generator");
    println!("================================");
    println!("Database: {db_path}");
    println!();

    if let Some(parent) = Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    if db.users().get_by_email("admin@example.com").await?.is_some() {
        println!("⚠ Database is already seeded");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let admin = db
        .users()
        .insert("Admin", "admin@example.com", &hash(DEFAULT_PASSWORD)?, Role::Admin)
        .await?;
    db.users()
        .insert("Cashier", "cashier@example.com", &hash(DEFAULT_PASSWORD)?, Role::Cashier)
        .await?;
    println!("✓ Created admin@example.com and cashier@example.com");

    let mut category_ids = Vec::with_capacity(CATEGORIES.len());
    for (name, description) in CATEGORIES {
        let category = db.categories().insert(name, Some(description)).await?;
        category_ids.push((*name, category.id));
    }
    println!("✓ Created {} categories", category_ids.len());

    let mut low_stock = 0;
    for (category, name, sku, purchase, selling, stock) in PRODUCTS {
        let category_id = category_ids
            .iter()
            .find(|(n, _)| n == category)
            .map(|(_, id)| id.clone())
            .ok_or_else(|| anyhow!("unknown category {category}"))?;

        let product = db
            .products()
            .insert(
                &ProductFields {
                    category_id,
                    name: name.to_string(),
                    sku: sku.to_string(),
                    description: None,
                    purchase_price_cents: *purchase,
                    selling_price_cents: *selling,
                    fixed_price: true,
                    min_stock_level: DEFAULT_MIN_STOCK_LEVEL,
                    image_path: None,
                    status: ProductStatus::Active,
                },
                0,
            )
            .await
            .with_context(|| format!("inserting {sku}"))?;

        if *stock > 0 {
            db.inventory()
                .adjust(
                    &product.id,
                    &admin.id,
                    &StockAdjustment {
                        movement_type: MovementType::In,
                        quantity: *stock,
                        reason: "Opening stock".to_string(),
                        notes: None,
                    },
                )
                .await?;
        }

        if *stock <= DEFAULT_MIN_STOCK_LEVEL {
            low_stock += 1;
        }
    }
    println!("✓ Created {} products ({low_stock} low stock)", PRODUCTS.len());

    println!();
    println!("✓ Seed complete! Log in with password '{DEFAULT_PASSWORD}'.");

    db.close().await;
    Ok(())
}

fn hash(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| anyhow!("hashing password: {e}"))
}
