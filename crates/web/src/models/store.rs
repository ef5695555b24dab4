//! Grocery store domain type.

use chrono::{DateTime, Utc};

use grocery_core::{StoreId, UserId};

/// A grocery store that items are sold at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroceryStore {
    pub id: StoreId,
    pub title: String,
    pub address: String,
    /// The user who added the store, if still known.
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}
