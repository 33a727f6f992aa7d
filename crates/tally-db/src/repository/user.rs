//! # User Repository
//!
//! Staff accounts. Passwords arrive here already hashed; hashing and
//! verification belong to the server's auth module.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tally_core::{Role, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at, updated_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by email, compared case-insensitively.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower(?1)"
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> DbResult<User> {
        debug!(email = %email, role = %role, "Inserting user");

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.trim().to_lowercase(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&user.email))?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::testing::test_db;
    use tally_core::Role;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let users = db.users();

        let user = users
            .insert("Ana", "Ana@Example.com", "$argon2id$...", Role::Cashier)
            .await
            .unwrap();
        assert_eq!(user.email, "ana@example.com");

        let by_email = users.get_by_email("ANA@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        assert_eq!(by_email.role, Role::Cashier);

        let by_id = users.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(by_id.password_hash, "$argon2id$...");

        assert!(users.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let db = test_db().await;
        let users = db.users();

        users.insert("A", "a@example.com", "h", Role::Admin).await.unwrap();
        let err = users
            .insert("B", "a@example.com", "h", Role::Cashier)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { ref field, .. } if field == "email"));
    }
}
