//! Grocery item domain type.

use chrono::{DateTime, Utc};

use grocery_core::{ItemCategory, ItemId, Price, StoreId, UserId};

/// An item sold at exactly one grocery store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroceryItem {
    pub id: ItemId,
    pub name: String,
    pub price: Price,
    pub category: ItemCategory,
    /// Absolute `http(s)` URL of a product photo.
    pub photo_url: String,
    pub store_id: StoreId,
    /// The user who added the item, if still known.
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}
