//! Per-user shopping list service.
//!
//! Adding and removing are idempotent: a second add of the same item, or a
//! remove of an item that isn't on the list, leaves the list unchanged and
//! reports that nothing happened so the caller can pick the right flash.

use grocery_core::{ItemId, UserId};

use super::ServiceError;
use crate::db::{ItemRepository, Persistence, ShoppingListRepository};
use crate::models::GroceryItem;

/// Result of putting an item on a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyPresent,
}

/// Result of taking an item off a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotPresent,
}

/// Manages each user's shopping list.
pub struct ShoppingListService<'a> {
    items: &'a dyn ItemRepository,
    shopping_lists: &'a dyn ShoppingListRepository,
}

impl<'a> ShoppingListService<'a> {
    /// Create a new shopping list service.
    #[must_use]
    pub fn new(persistence: &'a Persistence) -> Self {
        Self {
            items: persistence.items(),
            shopping_lists: persistence.shopping_lists(),
        }
    }

    /// Put an item on the user's list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the item doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_list(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<AddOutcome, ServiceError> {
        self.require_item(item_id).await?;

        if self.shopping_lists.add(user_id, item_id).await? {
            tracing::info!("Item added to shopping list");
            Ok(AddOutcome::Added)
        } else {
            Ok(AddOutcome::AlreadyPresent)
        }
    }

    /// Take an item off the user's list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the item doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn remove_from_list(
        &self,
        user_id: UserId,
        item_id: ItemId,
    ) -> Result<RemoveOutcome, ServiceError> {
        self.require_item(item_id).await?;

        if self.shopping_lists.remove(user_id, item_id).await? {
            tracing::info!("Item removed from shopping list");
            Ok(RemoveOutcome::Removed)
        } else {
            Ok(RemoveOutcome::NotPresent)
        }
    }

    /// Whether an item is on the user's list.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn contains(&self, user_id: UserId, item_id: ItemId) -> Result<bool, ServiceError> {
        Ok(self.shopping_lists.contains(user_id, item_id).await?)
    }

    /// The user's list, oldest addition first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` if the lookup fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<GroceryItem>, ServiceError> {
        Ok(self.shopping_lists.list_for_user(user_id).await?)
    }

    async fn require_item(&self, item_id: ItemId) -> Result<(), ServiceError> {
        match self.items.get_by_id(item_id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocery_core::{ItemFields, ItemInput, StoreFields, Username};

    use super::*;
    use crate::models::User;

    async fn shopper(persistence: &Persistence, name: &str) -> User {
        persistence
            .users()
            .create(&Username::parse(name).unwrap(), "hash")
            .await
            .unwrap()
    }

    async fn item(persistence: &Persistence, name: &str) -> GroceryItem {
        let store = persistence
            .stores()
            .create(&StoreFields::parse("Corner Market", "12 Main St").unwrap(), None)
            .await
            .unwrap();
        let store_id = store.id.to_string();
        let fields = ItemFields::parse(&ItemInput {
            name,
            price: "1.25",
            category: "Pantry",
            photo_url: "https://example.com/item.jpg",
            store: &store_id,
        })
        .unwrap();
        persistence.items().create(&fields, None).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_twice_keeps_one_entry() {
        let persistence = Persistence::in_memory();
        let user = shopper(&persistence, "shopper").await;
        let beans = item(&persistence, "Beans").await;
        let service = ShoppingListService::new(&persistence);

        assert_eq!(
            service.add_to_list(user.id, beans.id).await.unwrap(),
            AddOutcome::Added
        );
        assert_eq!(
            service.add_to_list(user.id, beans.id).await.unwrap(),
            AddOutcome::AlreadyPresent
        );
        assert_eq!(service.list_for_user(user.id).await.unwrap(), vec![beans]);
    }

    #[tokio::test]
    async fn test_remove_absent_item_is_a_no_op() {
        let persistence = Persistence::in_memory();
        let user = shopper(&persistence, "shopper").await;
        let beans = item(&persistence, "Beans").await;
        let rice = item(&persistence, "Rice").await;
        let service = ShoppingListService::new(&persistence);
        service.add_to_list(user.id, rice.id).await.unwrap();

        assert_eq!(
            service.remove_from_list(user.id, beans.id).await.unwrap(),
            RemoveOutcome::NotPresent
        );
        assert_eq!(service.list_for_user(user.id).await.unwrap(), vec![rice]);
    }

    #[tokio::test]
    async fn test_lists_are_per_user() {
        let persistence = Persistence::in_memory();
        let alice = shopper(&persistence, "alice").await;
        let bob = shopper(&persistence, "bob").await;
        let beans = item(&persistence, "Beans").await;
        let service = ShoppingListService::new(&persistence);

        service.add_to_list(alice.id, beans.id).await.unwrap();

        assert!(service.contains(alice.id, beans.id).await.unwrap());
        assert!(!service.contains(bob.id, beans.id).await.unwrap());
        assert!(service.list_for_user(bob.id).await.unwrap().is_empty());

        assert_eq!(
            service.remove_from_list(alice.id, beans.id).await.unwrap(),
            RemoveOutcome::Removed
        );
        assert!(service.list_for_user(alice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let persistence = Persistence::in_memory();
        let user = shopper(&persistence, "shopper").await;
        let beans = item(&persistence, "Beans").await;
        let rice = item(&persistence, "Rice").await;
        let service = ShoppingListService::new(&persistence);

        service.add_to_list(user.id, rice.id).await.unwrap();
        service.add_to_list(user.id, beans.id).await.unwrap();

        let names: Vec<_> = service
            .list_for_user(user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, ["Rice", "Beans"]);
    }

    #[tokio::test]
    async fn test_missing_item_is_not_found() {
        let persistence = Persistence::in_memory();
        let user = shopper(&persistence, "shopper").await;
        let service = ShoppingListService::new(&persistence);

        let err = service
            .add_to_list(user.id, ItemId::new(77))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));

        let err = service
            .remove_from_list(user.id, ItemId::new(77))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound));
    }
}
