//! Server-side cart mirror for signed-in users.

use sqlx::PgPool;
use sqlx::types::Json;

use souq_core::UserId;
use souq_core::cart::CartLineItem;

use super::RepositoryError;

/// Repository for the `carts` table.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace the stored items for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn save(
        &self,
        user_id: UserId,
        items: &[CartLineItem],
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO souq.carts (user_id, items, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE SET
                items = EXCLUDED.items,
                updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(Json(items))
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Read the stored items for `user_id`; `None` when no mirror exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Vec<CartLineItem>>, RepositoryError> {
        let items: Option<Option<Json<Vec<CartLineItem>>>> = sqlx::query_scalar(
            r"
            SELECT items FROM souq.carts WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(items.flatten().map(|Json(items)| items))
    }

    /// Drop the stored items for `user_id`, keeping the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn clear_items(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            UPDATE souq.carts SET items = NULL, updated_at = NOW()
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
