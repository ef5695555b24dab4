//! Business logic for the grocery catalog.
//!
//! # Services
//!
//! - `auth` - Registration, login and session identity
//! - `stores` - Store creation and editing
//! - `items` - Item creation and editing
//! - `shopping_list` - Per-user shopping lists
//!
//! Services are built per request from the shared [`Persistence`] handle and
//! hold only borrowed repositories. Every operation re-reads current state.
//!
//! [`Persistence`]: crate::db::Persistence

pub mod auth;
pub mod items;
pub mod shopping_list;
pub mod stores;

use thiserror::Error;

use grocery_core::FieldErrors;

use crate::db::RepositoryError;

pub use auth::{AuthError, AuthService};
pub use items::ItemService;
pub use shopping_list::{AddOutcome, RemoveOutcome, ShoppingListService};
pub use stores::StoreService;

/// Errors returned by the store, item and shopping list services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Submitted fields failed validation; nothing was written.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The referenced store or item does not exist.
    #[error("not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl ServiceError {
    /// Field errors, when the failure was a validation failure.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
