//! Persistence for the grocery catalog.
//!
//! ## Tables
//!
//! - `users` - Accounts (username + argon2 hash)
//! - `grocery_stores` - Stores
//! - `grocery_items` - Items, each belonging to one store
//! - `shopping_list_items` - (user, item) association in insertion order
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Every table is reached through a repository trait. [`Persistence`] bundles
//! one implementation of each, either `PostgreSQL` or the in-memory tables in
//! [`memory`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p grocery-cli -- migrate
//! ```

pub mod items;
pub mod memory;
pub mod shopping_lists;
pub mod stores;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use items::{ItemRepository, PgItemRepository};
pub use memory::MemoryDatabase;
pub use shopping_lists::{PgShoppingListRepository, ShoppingListRepository};
pub use stores::{PgStoreRepository, StoreRepository};
pub use users::{PgUserRepository, UserRepository};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a failed write, turning constraint violations into domain errors.
    ///
    /// A unique violation becomes `Conflict(what)`; a foreign key pointing at a
    /// missing row becomes `NotFound`.
    pub(crate) fn from_write(error: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = error {
            if db_err.is_unique_violation() {
                return Self::Conflict(what.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                return Self::NotFound;
            }
        }
        Self::Database(error)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Handle to every repository, built once at start-up.
///
/// Cheap to clone; each repository sits behind an `Arc`.
#[derive(Clone)]
pub struct Persistence {
    users: Arc<dyn UserRepository>,
    stores: Arc<dyn StoreRepository>,
    items: Arc<dyn ItemRepository>,
    shopping_lists: Arc<dyn ShoppingListRepository>,
    pool: Option<PgPool>,
}

impl Persistence {
    /// Repositories backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            stores: Arc::new(PgStoreRepository::new(pool.clone())),
            items: Arc::new(PgItemRepository::new(pool.clone())),
            shopping_lists: Arc::new(PgShoppingListRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Repositories backed by a fresh, empty in-memory table set.
    #[must_use]
    pub fn in_memory() -> Self {
        let db = Arc::new(MemoryDatabase::new());
        Self {
            users: db.clone(),
            stores: db.clone(),
            items: db.clone(),
            shopping_lists: db,
            pool: None,
        }
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    #[must_use]
    pub fn stores(&self) -> &dyn StoreRepository {
        self.stores.as_ref()
    }

    #[must_use]
    pub fn items(&self) -> &dyn ItemRepository {
        self.items.as_ref()
    }

    #[must_use]
    pub fn shopping_lists(&self) -> &dyn ShoppingListRepository {
        self.shopping_lists.as_ref()
    }

    /// The `PostgreSQL` pool, when running against a database.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check that storage is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocery_core::{ItemCategory, ItemFields, Price, StoreFields, StoreId, Username};
    use uuid::Uuid;

    use super::*;
    use crate::models::GroceryStore;

    /// Connect to `GROCERY_DATABASE_URL` and bring the schema up to date.
    async fn postgres() -> Persistence {
        let url = std::env::var("GROCERY_DATABASE_URL").unwrap();
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        Persistence::postgres(pool)
    }

    fn unique_username() -> Username {
        Username::parse(&format!("pg_{}", Uuid::new_v4().simple())).unwrap()
    }

    async fn seed_store(db: &Persistence) -> GroceryStore {
        let user = db.users().create(&unique_username(), "hash").await.unwrap();
        let fields = StoreFields::parse("Corner Market", "12 Main St").unwrap();
        db.stores().create(&fields, Some(user.id)).await.unwrap()
    }

    fn item(name: &str, category: ItemCategory, store_id: StoreId) -> ItemFields {
        ItemFields {
            name: name.to_string(),
            price: Price::from_cents(350),
            category,
            photo_url: "https://example.com/photo.jpg".to_string(),
            store_id,
        }
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_pg_duplicate_username_conflicts() {
        let db = postgres().await;
        let name = unique_username();
        let user = db.users().create(&name, "first").await.unwrap();

        let err = db.users().create(&name, "second").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let (found, hash) = db.users().get_password_hash(&name).await.unwrap().unwrap();
        assert_eq!(found, user);
        assert_eq!(hash, "first");
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_pg_item_for_missing_store_is_not_found() {
        let db = postgres().await;

        let err = db
            .items()
            .create(&item("Milk", ItemCategory::Other, StoreId::new(i32::MAX)), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_pg_every_category_round_trips() {
        let db = postgres().await;
        let store = seed_store(&db).await;

        for category in ItemCategory::ALL {
            let created = db
                .items()
                .create(&item(category.as_str(), category, store.id), None)
                .await
                .unwrap();
            let fetched = db.items().get_by_id(created.id).await.unwrap().unwrap();
            assert_eq!(fetched.category, category);
            assert_eq!(fetched.price, Price::from_cents(350));
        }

        let listed = db.items().list_by_store(store.id).await.unwrap();
        assert_eq!(listed.len(), ItemCategory::ALL.len());
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_pg_store_update_keeps_id() {
        let db = postgres().await;
        let store = seed_store(&db).await;
        let fields = StoreFields::parse("Corner Grocer", "12 Main St").unwrap();

        let updated = db.stores().update(store.id, &fields).await.unwrap();
        assert_eq!(updated.id, store.id);
        assert_eq!(updated.title, "Corner Grocer");
        assert_eq!(updated.address, store.address);

        let err = db
            .stores()
            .update(StoreId::new(i32::MAX), &fields)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_pg_shopping_list_membership() {
        let db = postgres().await;
        let store = seed_store(&db).await;
        let user = db.users().create(&unique_username(), "hash").await.unwrap();
        let beans = db
            .items()
            .create(&item("Beans", ItemCategory::Pantry, store.id), None)
            .await
            .unwrap();
        let rice = db
            .items()
            .create(&item("Rice", ItemCategory::Pantry, store.id), None)
            .await
            .unwrap();
        let lists = db.shopping_lists();

        assert!(lists.add(user.id, rice.id).await.unwrap());
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(lists.add(user.id, beans.id).await.unwrap());
        assert!(!lists.add(user.id, rice.id).await.unwrap());

        let ids: Vec<_> = lists
            .list_for_user(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(ids, [rice.id, beans.id]);

        assert!(lists.remove(user.id, rice.id).await.unwrap());
        assert!(!lists.remove(user.id, rice.id).await.unwrap());
        assert!(!lists.contains(user.id, rice.id).await.unwrap());
        assert!(lists.contains(user.id, beans.id).await.unwrap());
    }
}
