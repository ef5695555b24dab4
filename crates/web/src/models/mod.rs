//! Domain models for the grocery catalog.
//!
//! These are plain values returned by the repositories. Relationships are
//! stored as ids and resolved with explicit repository calls.

pub mod item;
pub mod session;
pub mod store;
pub mod user;

pub use item::GroceryItem;
pub use session::{CurrentUser, keys as session_keys};
pub use store::GroceryStore;
pub use user::User;
