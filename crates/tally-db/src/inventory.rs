//! # Stock Adjustment Engine
//!
//! Applies one manual stock change (in / out / adjustment) and appends its
//! ledger entry in the same transaction.
//!
//! ```text
//! BEGIN
//!   UPDATE products SET stock_quantity = stock_quantity WHERE id = ?   ← takes the write lock
//!   SELECT stock_quantity                                               ← previous
//!   tally_core::stock::apply_movement(type, previous, q)               ← new, delta
//!   UPDATE products SET stock_quantity = new
//!   INSERT stock_movements (previous, new, delta, reason, notes)
//! COMMIT
//! ```
//!
//! The no-op update comes first so the read-modify-write runs under
//! SQLite's write lock; no other writer can change the row in between.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::stock;
use tally_core::stock::apply_movement;
use tally_core::validation::StockAdjustment;
use tally_core::{CoreError, StockMovement};

/// Why an adjustment did not apply. Nothing was persisted.
#[derive(Debug, Error)]
pub enum AdjustmentError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<sqlx::Error> for AdjustmentError {
    fn from(err: sqlx::Error) -> Self {
        AdjustmentError::Db(err.into())
    }
}

/// Applies manual stock changes.
#[derive(Debug, Clone)]
pub struct AdjustmentEngine {
    pool: SqlitePool,
}

impl AdjustmentEngine {
    pub fn new(pool: SqlitePool) -> Self {
        AdjustmentEngine { pool }
    }

    /// Applies `adjustment` to the product on behalf of `user_id` and
    /// returns the ledger entry written.
    pub async fn adjust(
        &self,
        product_id: &str,
        user_id: &str,
        adjustment: &StockAdjustment,
    ) -> Result<StockMovement, AdjustmentError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let locked = sqlx::query("UPDATE products SET stock_quantity = stock_quantity WHERE id = ?1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(CoreError::ProductNotFound(product_id.to_string()).into());
        }

        let previous: i64 = sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        let transition = apply_movement(adjustment.movement_type, previous, adjustment.quantity)?;
        let now = Utc::now();

        sqlx::query("UPDATE products SET stock_quantity = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(transition.new)
            .bind(now)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            movement_type: adjustment.movement_type,
            quantity: transition.delta,
            previous_stock: transition.previous,
            new_stock: transition.new,
            reason: adjustment.reason.clone(),
            notes: transition.notes_with_clamp(adjustment.notes.as_deref()),
            created_at: now,
        };
        stock::insert_movement(&mut tx, &movement).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            product_id = %product_id,
            movement_type = %movement.movement_type,
            previous = movement.previous_stock,
            new = movement.new_stock,
            clamped = transition.was_clamped(),
            "Stock adjusted"
        );

        Ok(movement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{product, shop};
    use tally_core::{MovementType, ValidationError};

    fn adjustment(movement_type: MovementType, quantity: i64) -> StockAdjustment {
        StockAdjustment {
            movement_type,
            quantity,
            reason: "Stock count".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_adjustment_to_absolute_level() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 8).await;

        let m = shop
            .db
            .inventory()
            .adjust(&p.id, &shop.admin.id, &adjustment(MovementType::Adjustment, 15))
            .await
            .unwrap();

        assert_eq!((m.previous_stock, m.new_stock, m.quantity), (8, 15, 7));
        let now = shop.db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(now.stock_quantity, 15);
    }

    #[tokio::test]
    async fn test_in_adds_stock() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 8).await;

        let m = shop
            .db
            .inventory()
            .adjust(&p.id, &shop.admin.id, &adjustment(MovementType::In, 24))
            .await
            .unwrap();
        assert_eq!((m.new_stock, m.quantity), (32, 24));
    }

    #[tokio::test]
    async fn test_out_beyond_stock_clamps_at_zero() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 5).await;

        let mut request = adjustment(MovementType::Out, 20);
        request.notes = Some("water damage".to_string());
        let m = shop
            .db
            .inventory()
            .adjust(&p.id, &shop.admin.id, &request)
            .await
            .unwrap();

        assert_eq!(m.new_stock, 0);
        assert_eq!(m.quantity, -5);
        assert_eq!(m.previous_stock + m.quantity, m.new_stock);
        assert_eq!(
            m.notes.as_deref(),
            Some("water damage; requested -20, clamped at zero")
        );

        let stored = shop.db.stock_movements().history(&p.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].quantity, -5);
        let now = shop.db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(now.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let shop = shop().await;
        let err = shop
            .db
            .inventory()
            .adjust("missing", &shop.admin.id, &adjustment(MovementType::In, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, AdjustmentError::Core(CoreError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_quantity_leaves_stock_untouched() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 5).await;

        let err = shop
            .db
            .inventory()
            .adjust(&p.id, &shop.admin.id, &adjustment(MovementType::In, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AdjustmentError::Core(CoreError::Validation(_))));
        assert!(shop.db.stock_movements().history(&p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_quantity_leaves_stock_untouched() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 5).await;

        for movement_type in [MovementType::In, MovementType::Adjustment] {
            let err = shop
                .db
                .inventory()
                .adjust(&p.id, &shop.admin.id, &adjustment(movement_type, i64::MAX))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AdjustmentError::Core(CoreError::Validation(ValidationError::OutOfRange { .. }))
            ));
        }

        let now = shop.db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(now.stock_quantity, 5);
        assert!(shop.db.stock_movements().history(&p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_in_past_i64_max_is_rejected() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 5).await;
        sqlx::query("UPDATE products SET stock_quantity = ?1 WHERE id = ?2")
            .bind(i64::MAX - 1)
            .bind(&p.id)
            .execute(shop.db.pool())
            .await
            .unwrap();

        let err = shop
            .db
            .inventory()
            .adjust(&p.id, &shop.admin.id, &adjustment(MovementType::In, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AdjustmentError::Core(CoreError::Validation(_))));

        let now = shop.db.products().get_by_id(&p.id).await.unwrap().unwrap();
        assert_eq!(now.stock_quantity, i64::MAX - 1);
    }
}
