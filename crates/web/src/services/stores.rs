//! Grocery store service.

use grocery_core::{StoreFields, StoreId};

use super::ServiceError;
use crate::db::{Persistence, StoreRepository};
use crate::models::{GroceryStore, User};

/// Creates, edits and lists grocery stores.
pub struct StoreService<'a> {
    stores: &'a dyn StoreRepository,
}

impl<'a> StoreService<'a> {
    /// Create a new store service.
    #[must_use]
    pub fn new(persistence: &'a Persistence) -> Self {
        Self {
            stores: persistence.stores(),
        }
    }

    /// Validate and insert a store credited to `creator`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the title or address is invalid.
    #[tracing::instrument(skip(self, creator), fields(user_id = %creator.id))]
    pub async fn create_store(
        &self,
        title: &str,
        address: &str,
        creator: &User,
    ) -> Result<GroceryStore, ServiceError> {
        let fields = StoreFields::parse(title, address)?;
        let store = self.stores.create(&fields, Some(creator.id)).await?;

        tracing::info!(store_id = %store.id, "Grocery store created");
        Ok(store)
    }

    /// Validate and apply a new title and address to an existing store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the store doesn't exist and
    /// `ServiceError::Validation` if the fields are invalid.
    #[tracing::instrument(skip(self))]
    pub async fn update_store(
        &self,
        store_id: StoreId,
        title: &str,
        address: &str,
    ) -> Result<GroceryStore, ServiceError> {
        if self.stores.get_by_id(store_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let fields = StoreFields::parse(title, address)?;
        let store = self.stores.update(store_id, &fields).await?;

        tracing::info!("Grocery store updated");
        Ok(store)
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn get_store(&self, store_id: StoreId) -> Result<Option<GroceryStore>, ServiceError> {
        Ok(self.stores.get_by_id(store_id).await?)
    }

    /// All stores in creation order.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn list_stores(&self) -> Result<Vec<GroceryStore>, ServiceError> {
        Ok(self.stores.list_all().await?)
    }
}
