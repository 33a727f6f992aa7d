//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Register search (active, in stock, name or SKU contains the term)
//! - Filtered, paginated listing for the back office
//! - Create and update (stock is never written here)
//!
//! ## Register Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "coke"                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%coke%' OR sku LIKE '%coke%'   (ASCII case-insensitive)    │
//! │  AND status = 'active' AND stock_quantity > 0                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌────────────────────────────────────────────┐                        │
//! │  │ COKE-330  | Coca-Cola 330ml | Beverages    │ ← MATCH                │
//! │  │ COKE-500  | Coca-Cola 500ml | Beverages    │ ← MATCH (stock 0: no)  │
//! │  │ PEPSI-330 | Pepsi 330ml     | Beverages    │                        │
//! │  └────────────────────────────────────────────┘                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  At most 10 rows, ordered by name                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::{like_pattern, Page, Paginated};
use tally_core::{Product, ProductFields, ProductStatus};

/// Product columns qualified with the `p` alias, for joined queries.
pub(crate) const PRODUCT_COLUMNS: &str = "p.id, p.category_id, p.name, p.sku, p.description, \
     p.purchase_price_cents, p.selling_price_cents, p.fixed_price, p.stock_quantity, \
     p.min_stock_level, p.image_path, p.status, p.created_at, p.updated_at";

/// Product columns for `RETURNING` clauses, which cannot use an alias.
pub(crate) const PRODUCT_RETURNING: &str = "id, category_id, name, sku, description, \
     purchase_price_cents, selling_price_cents, fixed_price, stock_quantity, \
     min_stock_level, image_path, status, created_at, updated_at";

/// A product with the name of its category.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ProductWithCategory {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: String,
}

/// Back-office listing filters. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Substring of name or SKU.
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<ProductStatus>,
    /// Only products at or below their minimum stock level.
    pub low_stock: bool,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches sellable products for the register.
    ///
    /// Matches active products with stock on hand whose name or SKU
    /// contains `query`. A blank query returns nothing.
    pub async fn search_available(
        &self,
        query: &str,
        limit: u32,
    ) -> DbResult<Vec<ProductWithCategory>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return Ok(Vec::new());
        }

        let products = sqlx::query_as::<_, ProductWithCategory>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE (p.name LIKE ?1 ESCAPE '\' OR p.sku LIKE ?1 ESCAPE '\')
              AND p.status = 'active'
              AND p.stock_quantity > 0
            ORDER BY p.name, p.id
            LIMIT ?2
            "#
        ))
        .bind(like_pattern(query))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists products by name with optional filters.
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: Page,
    ) -> DbResult<Paginated<ProductWithCategory>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        const WHERE: &str = r#"
            WHERE (?1 IS NULL OR p.name LIKE ?1 ESCAPE '\' OR p.sku LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR p.category_id = ?2)
              AND (?3 IS NULL OR p.status = ?3)
              AND (?4 = 0 OR p.stock_quantity <= p.min_stock_level)
        "#;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products p {WHERE}"))
            .bind(&search)
            .bind(&filter.category_id)
            .bind(filter.status)
            .bind(filter.low_stock)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, ProductWithCategory>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            {WHERE}
            ORDER BY p.name, p.id
            LIMIT ?5 OFFSET ?6
            "#
        ))
        .bind(&search)
        .bind(&filter.category_id)
        .bind(filter.status)
        .bind(filter.low_stock)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Paginated::new(rows, page, total))
    }

    /// Active products at or below their minimum level, lowest stock first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<ProductWithCategory>> {
        let mut conn = self.pool.acquire().await?;
        fetch_low_stock(&mut conn, limit).await
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_RETURNING} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product and its category name.
    pub async fn get_with_category(&self, id: &str) -> DbResult<Option<ProductWithCategory>> {
        let product = sqlx::query_as::<_, ProductWithCategory>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, c.name AS category_name
            FROM products p
            JOIN categories c ON c.id = p.category_id
            WHERE p.id = ?1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_RETURNING} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product with its opening stock.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    /// * `Err(DbError::ForeignKeyViolation)` - category does not exist
    pub async fn insert(&self, fields: &ProductFields, opening_stock: i64) -> DbResult<Product> {
        debug!(sku = %fields.sku, "Inserting product");

        let now = Utc::now();
        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                id, category_id, name, sku, description,
                purchase_price_cents, selling_price_cents, fixed_price,
                stock_quantity, min_stock_level, image_path, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)
            RETURNING {PRODUCT_RETURNING}
            "#
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(&fields.category_id)
        .bind(&fields.name)
        .bind(&fields.sku)
        .bind(&fields.description)
        .bind(fields.purchase_price_cents)
        .bind(fields.selling_price_cents)
        .bind(fields.fixed_price)
        .bind(opening_stock)
        .bind(fields.min_stock_level)
        .bind(&fields.image_path)
        .bind(fields.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&fields.sku))?;

        Ok(product)
    }

    /// Updates every attribute except stock.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - product doesn't exist
    /// * `Err(DbError::UniqueViolation)` - SKU taken by another product
    pub async fn update(&self, id: &str, fields: &ProductFields) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                category_id = ?2,
                name = ?3,
                sku = ?4,
                description = ?5,
                purchase_price_cents = ?6,
                selling_price_cents = ?7,
                fixed_price = ?8,
                min_stock_level = ?9,
                image_path = ?10,
                status = ?11,
                updated_at = ?12
            WHERE id = ?1
            RETURNING {PRODUCT_RETURNING}
            "#
        ))
        .bind(id)
        .bind(&fields.category_id)
        .bind(&fields.name)
        .bind(&fields.sku)
        .bind(&fields.description)
        .bind(fields.purchase_price_cents)
        .bind(fields.selling_price_cents)
        .bind(fields.fixed_price)
        .bind(fields.min_stock_level)
        .bind(&fields.image_path)
        .bind(fields.status)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&fields.sku))?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }
}

/// Active products at or below their minimum level, lowest stock first.
pub(crate) async fn fetch_low_stock(
    conn: &mut SqliteConnection,
    limit: u32,
) -> DbResult<Vec<ProductWithCategory>> {
    let rows = sqlx::query_as::<_, ProductWithCategory>(&format!(
        r#"
        SELECT {PRODUCT_COLUMNS}, c.name AS category_name
        FROM products p
        JOIN categories c ON c.id = p.category_id
        WHERE p.status = 'active' AND p.stock_quantity <= p.min_stock_level
        ORDER BY p.stock_quantity, p.name, p.id
        LIMIT ?1
        "#
    ))
    .bind(limit as i64)
    .fetch_all(conn)
    .await?;

    Ok(rows)
}
