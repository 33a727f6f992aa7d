//! # Category Repository
//!
//! Product categories and how many products each one holds.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::Category;

/// A category with the number of products assigned to it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    pub category: Category,
    pub products_count: i64,
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories by name with their product counts.
    pub async fn list_with_counts(&self) -> DbResult<Vec<CategoryWithCount>> {
        let rows = sqlx::query_as::<_, CategoryWithCount>(
            r#"
            SELECT
                c.id, c.name, c.description, c.created_at, c.updated_at,
                COUNT(p.id) AS products_count
            FROM categories c
            LEFT JOIN products p ON p.category_id = c.id
            GROUP BY c.id
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Lists categories by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at, updated_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Gets a category by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a category.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already taken
    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        debug!(name = %name, "Inserting category");

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&category.name))?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::testing::{product, shop};

    #[tokio::test]
    async fn test_counts_include_empty_categories() {
        let shop = shop().await;
        let snacks = shop.db.categories().insert("Snacks", Some("Chips")).await.unwrap();
        product(&shop.db, &shop.category.id, "COKE-330", 60, 99, 10).await;
        product(&shop.db, &shop.category.id, "PEPSI-330", 60, 99, 10).await;

        let rows = shop.db.categories().list_with_counts().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].category.name, "Beverages");
        assert_eq!(rows[0].products_count, 2);
        assert_eq!(rows[1].category.id, snacks.id);
        assert_eq!(rows[1].products_count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let shop = shop().await;
        let err = shop.db.categories().insert("Beverages", None).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "Beverages"));
    }
}
