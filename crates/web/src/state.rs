//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GroceryConfig;
use crate::db::Persistence;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Services are built per request from the
/// persistence handle rather than stored here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GroceryConfig,
    persistence: Persistence,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: GroceryConfig, persistence: Persistence) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                persistence,
            }),
        }
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &GroceryConfig {
        &self.inner.config
    }

    /// Get a reference to the repositories.
    #[must_use]
    pub fn persistence(&self) -> &Persistence {
        &self.inner.persistence
    }
}
