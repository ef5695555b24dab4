//! CLI subcommands.

pub mod migrate;
pub mod user;

use sqlx::PgPool;

use grocery_web::config::GroceryConfig;
use grocery_web::db::create_pool;

/// Load configuration and connect to the database.
async fn connect() -> Result<PgPool, CommandError> {
    let config = GroceryConfig::from_env()?;

    tracing::info!("Connecting to database...");
    Ok(create_pool(&config.database_url).await?)
}

/// Errors shared by the CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] grocery_web::config::ConfigError),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying schema migrations failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Registering a user failed.
    #[error("{0}")]
    Auth(#[from] grocery_web::services::AuthError),
}
