//! Shared fixtures for the crate's tests.

use tally_core::validation::DEFAULT_MIN_STOCK_LEVEL;
use tally_core::{Category, Product, ProductFields, ProductStatus, Role, User};

use crate::pool::{Database, DbConfig};

pub async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn user(db: &Database, email: &str, role: Role) -> User {
    db.users()
        .insert("Test User", email, "not-a-real-hash", role)
        .await
        .unwrap()
}

pub async fn category(db: &Database, name: &str) -> Category {
    db.categories().insert(name, None).await.unwrap()
}

pub fn fields(category_id: &str, sku: &str, purchase: i64, selling: i64) -> ProductFields {
    ProductFields {
        category_id: category_id.to_string(),
        name: format!("Product {sku}"),
        sku: sku.to_string(),
        description: None,
        purchase_price_cents: purchase,
        selling_price_cents: selling,
        fixed_price: true,
        min_stock_level: DEFAULT_MIN_STOCK_LEVEL,
        image_path: None,
        status: ProductStatus::Active,
    }
}

pub async fn product(
    db: &Database,
    category_id: &str,
    sku: &str,
    purchase: i64,
    selling: i64,
    stock: i64,
) -> Product {
    db.products()
        .insert(&fields(category_id, sku, purchase, selling), stock)
        .await
        .unwrap()
}

/// A database with one admin, one category and no products.
pub struct Shop {
    pub db: Database,
    pub admin: User,
    pub category: Category,
}

pub async fn shop() -> Shop {
    let db = test_db().await;
    let admin = user(&db, "admin@example.com", Role::Admin).await;
    let category = category(&db, "Beverages").await;
    Shop { db, admin, category }
}
