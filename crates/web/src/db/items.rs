//! Grocery item repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use grocery_core::{ItemCategory, ItemFields, ItemId, Price, StoreId, UserId};

use super::RepositoryError;
use crate::models::GroceryItem;

/// Storage for grocery items.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if `fields.store_id` names no store.
    async fn create(
        &self,
        fields: &ItemFields,
        created_by: Option<UserId>,
    ) -> Result<GroceryItem, RepositoryError>;

    /// Replace every editable field of an item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item or the new store doesn't exist.
    async fn update(
        &self,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<GroceryItem, RepositoryError>;

    /// Get an item by ID.
    async fn get_by_id(&self, id: ItemId) -> Result<Option<GroceryItem>, RepositoryError>;

    /// Items sold at one store, in creation order.
    async fn list_by_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<GroceryItem>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
pub(super) struct ItemRow {
    id: ItemId,
    name: String,
    price: Price,
    category: ItemCategory,
    photo_url: String,
    store_id: StoreId,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for GroceryItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            category: row.category,
            photo_url: row.photo_url,
            store_id: row.store_id,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` implementation of [`ItemRepository`].
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn create(
        &self,
        fields: &ItemFields,
        created_by: Option<UserId>,
    ) -> Result<GroceryItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO grocery_items (name, price, category, photo_url, store_id, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, price, category, photo_url, store_id, created_by, created_at
            ",
        )
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.category)
        .bind(&fields.photo_url)
        .bind(fields.store_id)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "item already exists"))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<GroceryItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE grocery_items
            SET name = $2, price = $3, category = $4, photo_url = $5, store_id = $6
            WHERE id = $1
            RETURNING id, name, price, category, photo_url, store_id, created_by, created_at
            ",
        )
        .bind(id)
        .bind(&fields.name)
        .bind(fields.price)
        .bind(fields.category)
        .bind(&fields.photo_url)
        .bind(fields.store_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "item already exists"))?;

        row.map(GroceryItem::from).ok_or(RepositoryError::NotFound)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<GroceryItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, name, price, category, photo_url, store_id, created_by, created_at
            FROM grocery_items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroceryItem::from))
    }

    async fn list_by_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<GroceryItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT id, name, price, category, photo_url, store_id, created_by, created_at
            FROM grocery_items
            WHERE store_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroceryItem::from).collect())
    }
}
