//! In-memory implementation of every repository.
//!
//! All tables live behind one mutex, so each repository call is atomic in the
//! same way a single SQL statement is. Constraint handling mirrors the
//! `PostgreSQL` schema: unique usernames, foreign keys to users/stores/items,
//! and a composite key on the shopping list.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use grocery_core::{ItemFields, ItemId, StoreFields, StoreId, UserId, Username};

use super::{
    ItemRepository, RepositoryError, ShoppingListRepository, StoreRepository, UserRepository,
};
use crate::models::{GroceryItem, GroceryStore, User};

/// Mutex-guarded table set implementing all repository traits.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<(User, String)>,
    stores: Vec<GroceryStore>,
    items: Vec<GroceryItem>,
    /// Shopping list rows in insertion order.
    shopping_list: Vec<(UserId, ItemId)>,
    last_user_id: i32,
    last_store_id: i32,
    last_item_id: i32,
}

impl Tables {
    fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().map(|(u, _)| u).find(|u| u.id == id)
    }

    fn store(&self, id: StoreId) -> Option<&GroceryStore> {
        self.stores.iter().find(|s| s.id == id)
    }

    fn item(&self, id: ItemId) -> Option<&GroceryItem> {
        self.items.iter().find(|i| i.id == id)
    }
}

impl MemoryDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;

        if tables.users.iter().any(|(u, _)| &u.username == username) {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        tables.last_user_id += 1;
        let user = User {
            id: UserId::new(tables.last_user_id),
            username: username.clone(),
            created_at: Utc::now(),
        };
        tables.users.push((user.clone(), password_hash.to_owned()));

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.lock().await.user(id).cloned())
    }

    async fn get_by_username(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .map(|(u, _)| u)
            .find(|u| &u.username == username)
            .cloned())
    }

    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|(u, _)| &u.username == username)
            .cloned())
    }
}

#[async_trait]
impl StoreRepository for MemoryDatabase {
    async fn create(
        &self,
        fields: &StoreFields,
        created_by: Option<UserId>,
    ) -> Result<GroceryStore, RepositoryError> {
        let mut tables = self.tables.lock().await;

        if let Some(user_id) = created_by
            && tables.user(user_id).is_none()
        {
            return Err(RepositoryError::NotFound);
        }

        tables.last_store_id += 1;
        let store = GroceryStore {
            id: StoreId::new(tables.last_store_id),
            title: fields.title.clone(),
            address: fields.address.clone(),
            created_by,
            created_at: Utc::now(),
        };
        tables.stores.push(store.clone());

        Ok(store)
    }

    async fn update(
        &self,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<GroceryStore, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let store = tables
            .stores
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(RepositoryError::NotFound)?;

        store.title.clone_from(&fields.title);
        store.address.clone_from(&fields.address);

        Ok(store.clone())
    }

    async fn get_by_id(&self, id: StoreId) -> Result<Option<GroceryStore>, RepositoryError> {
        Ok(self.tables.lock().await.store(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<GroceryStore>, RepositoryError> {
        Ok(self.tables.lock().await.stores.clone())
    }
}

#[async_trait]
impl ItemRepository for MemoryDatabase {
    async fn create(
        &self,
        fields: &ItemFields,
        created_by: Option<UserId>,
    ) -> Result<GroceryItem, RepositoryError> {
        let mut tables = self.tables.lock().await;

        if tables.store(fields.store_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        if let Some(user_id) = created_by
            && tables.user(user_id).is_none()
        {
            return Err(RepositoryError::NotFound);
        }

        tables.last_item_id += 1;
        let item = GroceryItem {
            id: ItemId::new(tables.last_item_id),
            name: fields.name.clone(),
            price: fields.price,
            category: fields.category,
            photo_url: fields.photo_url.clone(),
            store_id: fields.store_id,
            created_by,
            created_at: Utc::now(),
        };
        tables.items.push(item.clone());

        Ok(item)
    }

    async fn update(
        &self,
        id: ItemId,
        fields: &ItemFields,
    ) -> Result<GroceryItem, RepositoryError> {
        let mut tables = self.tables.lock().await;

        if tables.store(fields.store_id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let item = tables
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound)?;

        item.name.clone_from(&fields.name);
        item.price = fields.price;
        item.category = fields.category;
        item.photo_url.clone_from(&fields.photo_url);
        item.store_id = fields.store_id;

        Ok(item.clone())
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Option<GroceryItem>, RepositoryError> {
        Ok(self.tables.lock().await.item(id).cloned())
    }

    async fn list_by_store(
        &self,
        store_id: StoreId,
    ) -> Result<Vec<GroceryItem>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| i.store_id == store_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ShoppingListRepository for MemoryDatabase {
    async fn add(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;

        if tables.user(user_id).is_none() || tables.item(item_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        if tables.shopping_list.contains(&(user_id, item_id)) {
            return Ok(false);
        }

        tables.shopping_list.push((user_id, item_id));
        Ok(true)
    }

    async fn remove(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let before = tables.shopping_list.len();
        tables
            .shopping_list
            .retain(|entry| *entry != (user_id, item_id));
        Ok(tables.shopping_list.len() < before)
    }

    async fn contains(&self, user_id: UserId, item_id: ItemId) -> Result<bool, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .shopping_list
            .contains(&(user_id, item_id)))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<GroceryItem>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .shopping_list
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .filter_map(|(_, item_id)| tables.item(*item_id).cloned())
            .collect())
    }
}
