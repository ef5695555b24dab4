//! Grocery store repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use grocery_core::{StoreFields, StoreId, UserId};

use super::RepositoryError;
use crate::models::GroceryStore;

/// Storage for grocery stores.
#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Insert a store.
    async fn create(
        &self,
        fields: &StoreFields,
        created_by: Option<UserId>,
    ) -> Result<GroceryStore, RepositoryError>;

    /// Replace a store's title and address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    async fn update(
        &self,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<GroceryStore, RepositoryError>;

    /// Get a store by ID.
    async fn get_by_id(&self, id: StoreId) -> Result<Option<GroceryStore>, RepositoryError>;

    /// All stores in creation order.
    async fn list_all(&self) -> Result<Vec<GroceryStore>, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct StoreRow {
    id: StoreId,
    title: String,
    address: String,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for GroceryStore {
    fn from(row: StoreRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            address: row.address,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL` implementation of [`StoreRepository`].
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn create(
        &self,
        fields: &StoreFields,
        created_by: Option<UserId>,
    ) -> Result<GroceryStore, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            INSERT INTO grocery_stores (title, address, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, title, address, created_by, created_at
            ",
        )
        .bind(&fields.title)
        .bind(&fields.address)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "store already exists"))?;

        Ok(row.into())
    }

    async fn update(
        &self,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<GroceryStore, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            UPDATE grocery_stores
            SET title = $2, address = $3
            WHERE id = $1
            RETURNING id, title, address, created_by, created_at
            ",
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.address)
        .fetch_optional(&self.pool)
        .await?;

        row.map(GroceryStore::from).ok_or(RepositoryError::NotFound)
    }

    async fn get_by_id(&self, id: StoreId) -> Result<Option<GroceryStore>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, title, address, created_by, created_at
            FROM grocery_stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(GroceryStore::from))
    }

    async fn list_all(&self) -> Result<Vec<GroceryStore>, RepositoryError> {
        let rows = sqlx::query_as::<_, StoreRow>(
            r"
            SELECT id, title, address, created_by, created_at
            FROM grocery_stores
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(GroceryStore::from).collect())
    }
}
