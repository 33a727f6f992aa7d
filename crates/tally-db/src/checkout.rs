//! # Checkout Transaction Engine
//!
//! Turns a cart into a completed sale in one SQLite transaction.
//!
//! ## Transaction Steps
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ for each line:                                                     │
//! │   │     UPDATE products SET stock_quantity = stock_quantity - q         │
//! │   │      WHERE id = ? AND stock_quantity >= q  RETURNING ...            │
//! │   │     0 rows → product missing?  ProductNotFound : OutOfStock         │
//! │   │                                                                     │
//! │   ├─ totals = Σ selling × q (+ tax)                                     │
//! │   ├─ paid < total → InsufficientPayment                                 │
//! │   ├─ sale_number = SALE-YYYYMMDD-NNNN  (per-day counter)                │
//! │   ├─ INSERT sales, sale_items (snapshots), stock_movements (out, -q)    │
//! │   │                                                                     │
//! │  COMMIT            any error before this point drops the transaction,   │
//! │                    which rolls everything back                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement is a write, so the transaction holds SQLite's write
//! lock from the first decrement until commit. A concurrent checkout waits
//! on the busy timeout and then sees the decremented stock; two checkouts
//! can never both take the same units.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::product::PRODUCT_RETURNING;
use crate::repository::{sale, stock};
use tally_core::checkout::{validate_cart, CartLine, PricedLine, SaleTotals};
use tally_core::sale_number::format_sale_number;
use tally_core::stock::sale_transition;
use tally_core::{
    CoreError, Money, MovementType, Product, Sale, SaleItem, SaleStatus, StockMovement, TaxRate,
};

/// Ledger reason written for every checkout line.
pub const SALE_MOVEMENT_REASON: &str = "Sale";

/// Why a checkout did not complete. Nothing was persisted in either case.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A business rule rejected the cart (stock, payment, validation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The database failed.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Db(err.into())
    }
}

/// A cart ready to be rung up.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub cashier_id: String,
    pub lines: Vec<CartLine>,
    pub amount_paid: Money,
}

/// Everything one checkout wrote.
#[derive(Debug, Clone)]
pub struct CompletedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
    pub movements: Vec<StockMovement>,
}

/// Runs checkouts against the pool.
#[derive(Debug, Clone)]
pub struct CheckoutEngine {
    pool: SqlitePool,
    tax_rate: TaxRate,
}

impl CheckoutEngine {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutEngine {
            pool,
            tax_rate: TaxRate::zero(),
        }
    }

    /// Applies a tax rate to subsequent checkouts.
    pub fn with_tax_rate(mut self, tax_rate: TaxRate) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Validates the cart, reserves stock and records the sale atomically.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CompletedSale, CheckoutError> {
        validate_cart(&request.lines)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut priced = Vec::with_capacity(request.lines.len());
        for line in &request.lines {
            priced.push(reserve_line(&mut tx, line).await?);
        }

        let totals = SaleTotals::compute(&priced, self.tax_rate)
            .inspect_err(|err| warn!(error = %err, "Checkout rejected"))?;
        let change = match totals.settle(request.amount_paid) {
            Ok(change) => change,
            Err(err) => {
                warn!(
                    total = %totals.total,
                    paid = %request.amount_paid,
                    "Checkout rejected: insufficient payment"
                );
                return Err(err.into());
            }
        };

        let now = Utc::now();
        let sequence = sale::next_sale_sequence(&mut tx, now.date_naive()).await?;
        let sale_number = format_sale_number(now.date_naive(), sequence);

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number,
            cashier_id: request.cashier_id.clone(),
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
            amount_paid_cents: request.amount_paid.cents(),
            change_cents: change.cents(),
            status: SaleStatus::Completed,
            created_at: now,
            updated_at: now,
        };
        sale::insert_sale(&mut tx, &sale).await?;

        let notes = format!("Sale #{}", sale.sale_number);
        let mut items = Vec::with_capacity(priced.len());
        let mut movements = Vec::with_capacity(priced.len());

        for line in &priced {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                product_sku: line.product_sku.clone(),
                purchase_price_cents: line.purchase_price.cents(),
                selling_price_cents: line.selling_price.cents(),
                quantity: line.quantity,
                subtotal_cents: line.subtotal().cents(),
                created_at: now,
            };
            sale::insert_item(&mut tx, &item).await?;

            let transition = sale_transition(line.stock_before, line.quantity);
            let movement = StockMovement {
                id: Uuid::new_v4().to_string(),
                product_id: line.product_id.clone(),
                user_id: request.cashier_id.clone(),
                movement_type: MovementType::Out,
                quantity: transition.delta,
                previous_stock: transition.previous,
                new_stock: transition.new,
                reason: SALE_MOVEMENT_REASON.to_string(),
                notes: Some(notes.clone()),
                created_at: now,
            };
            stock::insert_movement(&mut tx, &movement).await?;

            items.push(item);
            movements.push(movement);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_number = %sale.sale_number,
            total = %totals.total,
            lines = items.len(),
            cashier_id = %sale.cashier_id,
            "Sale completed"
        );

        Ok(CompletedSale {
            sale,
            items,
            movements,
        })
    }
}

/// Decrements stock for one line, failing if it would go negative.
async fn reserve_line(conn: &mut SqliteConnection, line: &CartLine) -> Result<PricedLine, CheckoutError> {
    let reserved = sqlx::query_as::<_, Product>(&format!(
        r#"
        UPDATE products
        SET stock_quantity = stock_quantity - ?1, updated_at = ?2
        WHERE id = ?3 AND stock_quantity >= ?1
        RETURNING {PRODUCT_RETURNING}
        "#
    ))
    .bind(line.quantity)
    .bind(Utc::now())
    .bind(&line.product_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(product) = reserved {
        return Ok(PricedLine::from_reserved(&product, line.quantity));
    }

    let current: Option<(String, String, i64)> =
        sqlx::query_as("SELECT name, sku, stock_quantity FROM products WHERE id = ?1")
            .bind(&line.product_id)
            .fetch_optional(&mut *conn)
            .await?;

    let err = match current {
        None => CoreError::ProductNotFound(line.product_id.clone()),
        Some((name, sku, available)) => CoreError::OutOfStock {
            name,
            sku,
            available,
            requested: line.quantity,
        },
    };
    warn!(product_id = %line.product_id, requested = line.quantity, error = %err, "Checkout rejected");
    Err(err.into())
}
