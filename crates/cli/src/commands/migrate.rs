//! Database migration command.
//!
//! Applies the embedded schema migrations from `crates/web/migrations/`, then
//! creates the `tower_sessions` table used by the session layer. Both steps
//! are idempotent.

use tower_sessions_sqlx_store::PostgresStore;

use grocery_web::db::MIGRATOR;

use super::{CommandError, connect};

/// Run all migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running schema migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Creating session store table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
