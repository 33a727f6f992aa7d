//! # Stock Ledger
//!
//! Append-only log of stock movements. Rows are written only inside the
//! checkout and adjustment transactions (see [`insert_movement`]); the
//! schema rejects updates and deletes.
//!
//! ```text
//! product COKE-330
//! ┌────────────┬──────┬──────────┬──────────┬───────────────────────────┐
//! │ type       │ qty  │ previous │ new      │ reason / notes            │
//! ├────────────┼──────┼──────────┼──────────┼───────────────────────────┤
//! │ in         │ +24  │ 0        │ 24       │ Delivery                  │
//! │ out        │ -3   │ 24       │ 21       │ Sale / Sale #SALE-...-0001│
//! │ adjustment │ -1   │ 21       │ 20       │ Stock count               │
//! └────────────┴──────┴──────────┴──────────┴───────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use tally_core::StockMovement;

/// A ledger row with the names the inventory screens display.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovementEntry {
    #[sqlx(flatten)]
    pub movement: StockMovement,
    pub product_name: String,
    pub product_sku: String,
    pub user_name: String,
}

const ENTRY_SELECT: &str = r#"
    SELECT
        m.id, m.product_id, m.user_id, m.type, m.quantity,
        m.previous_stock, m.new_stock, m.reason, m.notes, m.created_at,
        p.name AS product_name, p.sku AS product_sku, u.name AS user_name
    FROM stock_movements m
    JOIN products p ON p.id = m.product_id
    JOIN users u ON u.id = m.user_id
"#;

/// Appends one movement. Callers pass their open transaction.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    debug!(
        product_id = %movement.product_id,
        movement_type = %movement.movement_type,
        quantity = movement.quantity,
        "Inserting stock movement"
    );

    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, user_id, type, quantity,
            previous_stock, new_stock, reason, notes, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.user_id)
    .bind(movement.movement_type)
    .bind(movement.quantity)
    .bind(movement.previous_stock)
    .bind(movement.new_stock)
    .bind(&movement.reason)
    .bind(&movement.notes)
    .bind(movement.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Read access to the stock ledger.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    /// Creates a new StockMovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Most recent movements across all products, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<MovementEntry>> {
        let rows = sqlx::query_as::<_, MovementEntry>(&format!(
            "{ENTRY_SELECT} ORDER BY m.created_at DESC, m.rowid DESC LIMIT ?1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Most recent movements for one product, newest first.
    pub async fn for_product(&self, product_id: &str, limit: u32) -> DbResult<Vec<MovementEntry>> {
        debug!(product_id = %product_id, limit, "Loading product movements");
        let rows = sqlx::query_as::<_, MovementEntry>(&format!(
            "{ENTRY_SELECT} WHERE m.product_id = ?1 ORDER BY m.created_at DESC, m.rowid DESC LIMIT ?2"
        ))
        .bind(product_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Every movement for one product, oldest first.
    pub async fn history(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, user_id, type, quantity,
                   previous_stock, new_stock, reason, notes, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at, rowid
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::testing::{product, shop};
    use tally_core::MovementType;

    fn movement(product_id: &str, user_id: &str, previous: i64, quantity: i64) -> StockMovement {
        StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            movement_type: MovementType::In,
            quantity,
            previous_stock: previous,
            new_stock: previous + quantity,
            reason: "Delivery".to_string(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 0).await;

        let mut conn = shop.db.pool().acquire().await.unwrap();
        insert_movement(&mut conn, &movement(&p.id, &shop.admin.id, 0, 24)).await.unwrap();
        insert_movement(&mut conn, &movement(&p.id, &shop.admin.id, 24, 6)).await.unwrap();
        drop(conn);

        let ledger = shop.db.stock_movements();
        let recent = ledger.recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].movement.previous_stock, 24);
        assert_eq!(recent[0].product_sku, "COKE-330");
        assert_eq!(recent[0].user_name, "Test User");

        let history = ledger.history(&p.id).await.unwrap();
        assert_eq!(history[0].new_stock, 24);
        assert_eq!(history[1].new_stock, 30);

        assert_eq!(ledger.for_product(&p.id, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ledger_rejects_inconsistent_rows() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 0).await;

        let mut bad = movement(&p.id, &shop.admin.id, 0, 5);
        bad.new_stock = 4;

        let mut conn = shop.db.pool().acquire().await.unwrap();
        assert!(insert_movement(&mut conn, &bad).await.is_err());
    }

    #[tokio::test]
    async fn test_ledger_is_immutable() {
        let shop = shop().await;
        let p = product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 0).await;

        let mut conn = shop.db.pool().acquire().await.unwrap();
        insert_movement(&mut conn, &movement(&p.id, &shop.admin.id, 0, 5)).await.unwrap();

        let update = sqlx::query("UPDATE stock_movements SET reason = 'edited'")
            .execute(&mut *conn)
            .await;
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM stock_movements").execute(&mut *conn).await;
        assert!(delete.is_err());
    }
}
