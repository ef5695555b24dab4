//! User management commands.
//!
//! Users created here go through the same validation and password hashing as
//! the web signup form.

use grocery_web::db::Persistence;
use grocery_web::services::AuthService;

use super::{CommandError, connect};

/// Register a new user.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `CommandError::Auth` if the username is invalid or taken, or the
/// password is too short.
pub async fn create(username: &str, password: &str) -> Result<i32, CommandError> {
    let persistence = Persistence::postgres(connect().await?);

    let user = AuthService::new(&persistence)
        .register(username, password)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    Ok(user.id.as_i32())
}
