//! Shopping list repository.
//!
//! A shopping list is the set of `(user, item)` rows in `shopping_list_items`.
//! The composite primary key makes duplicates impossible, so add and remove
//! are single statements and report whether they changed anything.

use async_trait::async_trait;
use sqlx::PgPool;

use grocery_core::{ItemId, UserId};

use super::RepositoryError;
use super::items::ItemRow;
use crate::models::GroceryItem;

/// Storage for the user/item shopping list association.
#[async_trait]
pub trait ShoppingListRepository: Send + Sync {
    /// Put an item on a user's list.
    ///
    /// Returns `false` if it was already there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user or item doesn't exist.
    async fn add(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError>;

    /// Take an item off a user's list.
    ///
    /// Returns `false` if it wasn't there.
    async fn remove(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError>;

    /// Whether an item is on a user's list.
    async fn contains(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError>;

    /// The items on a user's list, oldest addition first.
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<GroceryItem>, RepositoryError>;
}

/// `PostgreSQL` implementation of [`ShoppingListRepository`].
pub struct PgShoppingListRepository {
    pool: PgPool,
}

impl PgShoppingListRepository {
    /// Create a new shopping list repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShoppingListRepository for PgShoppingListRepository {
    async fn add(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO shopping_list_items (user_id, item_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, item_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "item already on shopping list"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shopping_list_items
            WHERE user_id = $1 AND item_id = $2
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn contains(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let found: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM shopping_list_items
                WHERE user_id = $1 AND item_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(found)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<GroceryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT i.id, i.name, i.price, i.category, i.photo_url,
                   i.store_id, i.created_by, i.created_at
            FROM shopping_list_items s
            JOIN grocery_items i ON i.id = s.item_id
            WHERE s.user_id = $1
            ORDER BY s.added_at ASC, s.item_id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroceryItem::from).collect())
    }
}
