//! One-shot feedback messages.
//!
//! A message pushed while handling one request is shown on the next page
//! rendered for the same session, then discarded.

use tower_sessions::Session;

use crate::models::session_keys;

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn push_flash(
    session: &Session,
    message: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<String> = session.get(session_keys::FLASH).await?.unwrap_or_default();
    pending.push(message.into());
    session.insert(session_keys::FLASH, pending).await
}

/// Remove and return every pending message, oldest first.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn take_flashes(session: &Session) -> Result<Vec<String>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<String>>(session_keys::FLASH)
        .await?
        .unwrap_or_default())
}
