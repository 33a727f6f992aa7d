//! # Sale Ledger
//!
//! Completed sales and their line items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  There is no draft state: a sale exists only once checkout commits.    │
//! │                                                                         │
//! │  CheckoutEngine transaction                                            │
//! │     ├── next_sale_sequence()  → SALE-20261016-0042                      │
//! │     ├── insert_sale()         → Sale { status: Completed }             │
//! │     └── insert_item() × n     → SaleItem (product snapshot)            │
//! │                                                                         │
//! │  Afterwards: read-only (get_with_items, recent)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use tally_core::sale_number::day_key;
use tally_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "s.id, s.sale_number, s.cashier_id, s.subtotal_cents, s.tax_cents, \
     s.total_cents, s.amount_paid_cents, s.change_cents, s.status, s.created_at, s.updated_at";

/// A sale with its cashier's name, as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RecentSale {
    #[sqlx(flatten)]
    pub sale: Sale,
    pub cashier_name: String,
}

/// A sale, its cashier's name and its lines.
#[derive(Debug, Clone)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub cashier_name: String,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Transaction-scoped writes (used by the checkout engine)
// =============================================================================

/// Draws the next sale sequence for `day` from the per-day counter.
///
/// The upsert runs under the transaction's write lock, so two checkouts on
/// the same day always receive distinct, increasing values.
pub(crate) async fn next_sale_sequence(conn: &mut SqliteConnection, day: NaiveDate) -> DbResult<i64> {
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO sale_number_sequences (day, last_value) VALUES (?1, 1)
        ON CONFLICT(day) DO UPDATE SET last_value = last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(day_key(day))
    .fetch_one(conn)
    .await?;

    debug!(%day, sequence = value, "Drew sale sequence");
    Ok(value)
}

pub(crate) async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(sale_number = %sale.sale_number, total_cents = sale.total_cents, "Inserting sale");
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, sale_number, cashier_id, subtotal_cents, tax_cents, total_cents,
            amount_paid_cents, change_cents, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(&sale.cashier_id)
    .bind(sale.subtotal_cents)
    .bind(sale.tax_cents)
    .bind(sale.total_cents)
    .bind(sale.amount_paid_cents)
    .bind(sale.change_cents)
    .bind(sale.status)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    debug!(sale_id = %item.sale_id, sku = %item.product_sku, quantity = item.quantity, "Inserting sale item");
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, product_name, product_sku,
            purchase_price_cents, selling_price_cents, quantity, subtotal_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(&item.product_sku)
    .bind(item.purchase_price_cents)
    .bind(item.selling_price_cents)
    .bind(item.quantity)
    .bind(item.subtotal_cents)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Reads
// =============================================================================

/// Repository for reading the sale ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales s WHERE s.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale by its sale number.
    pub async fn get_by_number(&self, sale_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales s WHERE s.sale_number = ?1"
        ))
        .bind(sale_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets the lines of a sale in the order they were rung up.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, product_name, product_sku,
                   purchase_price_cents, selling_price_cents, quantity,
                   subtotal_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets a sale with its cashier's name and lines.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        debug!(id = %id, "Loading sale with items");
        let row = sqlx::query_as::<_, RecentSale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}, u.name AS cashier_name
            FROM sales s
            JOIN users u ON u.id = s.cashier_id
            WHERE s.id = ?1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(RecentSale { sale, cashier_name }) = row else {
            return Ok(None);
        };

        let items = self.get_items(&sale.id).await?;
        Ok(Some(SaleWithItems {
            sale,
            cashier_name,
            items,
        }))
    }

    /// Most recent completed sales, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<RecentSale>> {
        let mut conn = self.pool.acquire().await?;
        fetch_recent(&mut conn, limit).await
    }
}

pub(crate) async fn fetch_recent(conn: &mut SqliteConnection, limit: u32) -> DbResult<Vec<RecentSale>> {
    let rows = sqlx::query_as::<_, RecentSale>(&format!(
        r#"
        SELECT {SALE_COLUMNS}, u.name AS cashier_name
        FROM sales s
        JOIN users u ON u.id = s.cashier_id
        WHERE s.status = 'completed'
        ORDER BY s.created_at DESC, s.rowid DESC
        LIMIT ?1
        "#
    ))
    .bind(limit as i64)
    .fetch_all(conn)
    .await?;

    debug!(count = rows.len(), "Loaded recent sales");
    Ok(rows)
}
