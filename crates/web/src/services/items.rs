//! Grocery item service.

use grocery_core::{INVALID_CHOICE, ItemFields, ItemId, ItemInput, StoreId};

use super::ServiceError;
use crate::db::{ItemRepository, Persistence, StoreRepository};
use crate::models::{GroceryItem, User};

/// Store-field message shown when there is nothing to choose from.
pub const NO_STORES: &str = "Please create a store first.";

/// Creates and edits grocery items.
pub struct ItemService<'a> {
    items: &'a dyn ItemRepository,
    stores: &'a dyn StoreRepository,
}

impl<'a> ItemService<'a> {
    /// Create a new item service.
    #[must_use]
    pub fn new(persistence: &'a Persistence) -> Self {
        Self {
            items: persistence.items(),
            stores: persistence.stores(),
        }
    }

    /// Validate and insert an item credited to `creator`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if any field is invalid or the
    /// selected store doesn't exist.
    #[tracing::instrument(skip(self, input, creator), fields(user_id = %creator.id))]
    pub async fn create_item(
        &self,
        input: &ItemInput<'_>,
        creator: &User,
    ) -> Result<GroceryItem, ServiceError> {
        let fields = self.validate(input).await?;
        let item = self.items.create(&fields, Some(creator.id)).await?;

        tracing::info!(item_id = %item.id, store_id = %item.store_id, "Grocery item created");
        Ok(item)
    }

    /// Validate and apply new values to every field of an existing item.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the item doesn't exist and
    /// `ServiceError::Validation` if any field is invalid.
    #[tracing::instrument(skip(self, input))]
    pub async fn update_item(
        &self,
        item_id: ItemId,
        input: &ItemInput<'_>,
    ) -> Result<GroceryItem, ServiceError> {
        if self.items.get_by_id(item_id).await?.is_none() {
            return Err(ServiceError::NotFound);
        }

        let fields = self.validate(input).await?;
        let item = self.items.update(item_id, &fields).await?;

        tracing::info!("Grocery item updated");
        Ok(item)
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn get_item(&self, item_id: ItemId) -> Result<Option<GroceryItem>, ServiceError> {
        Ok(self.items.get_by_id(item_id).await?)
    }

    /// Items sold at one store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn list_by_store(&self, store_id: StoreId) -> Result<Vec<GroceryItem>, ServiceError> {
        Ok(self.items.list_by_store(store_id).await?)
    }

    /// Field validation plus the one rule that needs storage: the selected
    /// store must exist.
    async fn validate(&self, input: &ItemInput<'_>) -> Result<ItemFields, ServiceError> {
        let parsed = ItemFields::parse(input);
        let mut errors = parsed.as_ref().err().cloned().unwrap_or_default();

        if !errors.has("store")
            && let Ok(store_id) = input.store.parse::<StoreId>()
            && self.stores.get_by_id(store_id).await?.is_none()
        {
            errors.add("store", INVALID_CHOICE);
        }

        if errors.has("store") && self.stores.list_all().await?.is_empty() {
            errors.remove("store");
            errors.add("store", NO_STORES);
        }

        match parsed {
            Ok(fields) if errors.is_empty() => Ok(fields),
            _ => Err(ServiceError::Validation(errors)),
        }
    }
}
