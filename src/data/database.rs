//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with a connection pool; each statement borrows a
//! connection from the pool and releases it when it completes.

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to the SQLite database and run migrations
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Get a user by ID
    pub async fn get_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Get a user by email (the login key)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Insert a user unless one with the same email already exists
    ///
    /// The UNIQUE constraint on email makes concurrent duplicate
    /// registration safe: the losing insert is a no-op and both
    /// callers read back the same row.
    ///
    /// # Returns
    /// The stored user for `email` (inserted or pre-existing)
    pub async fn insert_user_if_absent(
        &self,
        name: &str,
        email: &str,
        picture: &str,
    ) -> Result<User, AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (name, email, picture, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(picture)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_user_by_email(email)
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user row missing after insert")))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Get all categories ordered by name
    pub async fn get_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Get a category by ID
    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Get an item by ID
    pub async fn get_item(&self, id: i64) -> Result<Option<Item>, AppError> {
        let item = sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Get all items in a category ordered by title
    pub async fn get_items_by_category(&self, cat_id: i64) -> Result<Vec<Item>, AppError> {
        let items =
            sqlx::query_as::<_, Item>("SELECT * FROM items WHERE cat_id = ? ORDER BY title ASC")
                .bind(cat_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }

    /// Get items for the landing page ordered by creation date
    pub async fn get_items_by_created_date(&self, limit: u32) -> Result<Vec<Item>, AppError> {
        let items =
            sqlx::query_as::<_, Item>("SELECT * FROM items ORDER BY created_date ASC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }

    /// Insert a new item
    ///
    /// # Returns
    /// The created item with its assigned ID
    pub async fn insert_item(
        &self,
        title: &str,
        description: &str,
        cat_id: i64,
        user_id: i64,
    ) -> Result<Item, AppError> {
        let created_date = chrono::Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO items (title, description, cat_id, user_id, created_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(cat_id)
        .bind(user_id)
        .bind(created_date)
        .execute(&self.pool)
        .await?;

        Ok(Item {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            description: description.to_string(),
            cat_id,
            user_id,
            created_date,
        })
    }

    /// Update an item's title and/or description
    ///
    /// Only supplied fields are written; `None` leaves the stored
    /// value untouched.
    ///
    /// # Returns
    /// `true` if a row was updated, `false` if the item does not exist
    pub async fn update_item(
        &self,
        id: i64,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET title = COALESCE(?, title),
                description = COALESCE(?, description)
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Delete an item
    ///
    /// # Returns
    /// `true` if a row was deleted, `false` if the item does not exist
    pub async fn delete_item(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}
