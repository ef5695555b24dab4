//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions.

use sqlx::PgPool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::GroceryConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "grocery_session";

/// Create the session layer with `PostgreSQL` store.
///
/// The store's table is created by `grocery-cli migrate`. Sessions expire
/// after `session_days` without a request.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &GroceryConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone());

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::days(config.session_days),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
