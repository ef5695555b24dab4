//! Authentication service.
//!
//! Provides username/password registration and login, and resolves the
//! session identity back into a [`User`] on every request.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tower_sessions::Session;

use grocery_core::{Credentials, FieldErrors, Username};

use crate::db::{Persistence, RepositoryError, UserRepository};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, User, session_keys};

/// Error shown on the signup form when the username is in use.
pub const USERNAME_TAKEN: &str = "That username is taken. Please choose a different one.";

/// Authentication service.
///
/// Handles user registration, login and logout.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(persistence: &'a Persistence) -> Self {
        Self {
            users: persistence.users(),
        }
    }

    /// Register a new user with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the username or password is invalid
    /// or the username is already registered.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let credentials = Credentials::parse(username, password)?;
        self.register_validated(credentials).await
    }

    /// Register a user whose fields have already passed form validation.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if the username is already registered.
    #[tracing::instrument(skip_all, fields(username = %credentials.username))]
    pub async fn register_validated(&self, credentials: Credentials) -> Result<User, AuthError> {
        if self
            .users
            .get_by_username(&credentials.username)
            .await?
            .is_some()
        {
            return Err(username_taken());
        }

        let password_hash = hash_password(&credentials.password)?;

        // A concurrent signup can still win the race; the unique index decides.
        let user = self
            .users
            .create(&credentials.username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => username_taken(),
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the username is unknown or
    /// the password is wrong; the two cases are indistinguishable.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Err(reject_unknown_user(password));
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&username).await? else {
            return Err(reject_unknown_user(password));
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Make `user` the session identity.
    ///
    /// The session id is rotated so an identifier issued before login can't
    /// be reused afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be modified.
    pub async fn log_in(&self, session: &Session, user: &User) -> Result<(), AuthError> {
        session.cycle_id().await?;
        session
            .insert(session_keys::CURRENT_USER, CurrentUser::from(user))
            .await?;

        set_sentry_user(&user.id, Some(user.username.as_str()));
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(())
    }

    /// Drop the session entirely, identity and pending messages alike.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session cannot be flushed.
    pub async fn log_out(&self, session: &Session) -> Result<(), AuthError> {
        session.flush().await?;
        clear_sentry_user();
        Ok(())
    }

    /// Resolve the session identity to a current user row.
    ///
    /// A session that names a user who no longer exists is treated as
    /// anonymous and the stale identity is removed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` or `AuthError::Repository` on storage failure.
    pub async fn current_identity(&self, session: &Session) -> Result<Option<User>, AuthError> {
        let Some(current) = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await?
        else {
            return Ok(None);
        };

        match self.users.get_by_id(current.id).await? {
            Some(user) => Ok(Some(user)),
            None => {
                tracing::warn!(user_id = %current.id, "Session names a missing user");
                session
                    .remove::<CurrentUser>(session_keys::CURRENT_USER)
                    .await?;
                Ok(None)
            }
        }
    }
}

/// Stand-in hash verified for unknown usernames, so a login for a missing
/// account costs the same argon2 work as a wrong password.
static UNKNOWN_USER_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("no account has this password").ok());

fn reject_unknown_user(password: &str) -> AuthError {
    if let Some(hash) = UNKNOWN_USER_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

fn username_taken() -> AuthError {
    AuthError::Validation(FieldErrors::single("username", USERNAME_TAKEN))
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);

        let user = auth.register("shopper", "correct horse").await.unwrap();
        let again = auth.authenticate(" shopper ", "correct horse").await.unwrap();

        assert_eq!(again, user);
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);
        auth.register("shopper", "correct horse").await.unwrap();

        let (_, hash) = persistence
            .users()
            .get_password_hash(&Username::parse("shopper").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("correct horse"));
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_validation_error() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);
        let first = auth.register("shopper", "correct horse").await.unwrap();

        let err = auth.register("shopper", "another secret").await.unwrap_err();
        let AuthError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.get("username"), [USERNAME_TAKEN]);

        // The original password still works; nothing was overwritten.
        let user = auth.authenticate("shopper", "correct horse").await.unwrap();
        assert_eq!(user.id, first.id);
    }

    #[tokio::test]
    async fn test_short_password_is_rejected() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);

        let err = auth.register("shopper", "short").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(ref e) if e.has("password")));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);
        auth.register("shopper", "correct horse").await.unwrap();

        let wrong = auth.authenticate("shopper", "wrong horse").await.unwrap_err();
        let unknown = auth.authenticate("nobody", "correct horse").await.unwrap_err();
        let malformed = auth.authenticate("", "correct horse").await.unwrap_err();

        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(malformed, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_unknown_user_check_costs_a_full_verify() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);
        auth.register("shopper", "correct horse").await.unwrap();
        let (_, real) = persistence
            .users()
            .get_password_hash(&Username::parse("shopper").unwrap())
            .await
            .unwrap()
            .unwrap();

        let stand_in = UNKNOWN_USER_HASH.as_deref().unwrap();
        let params = |hash: &str| hash.split('$').nth(3).unwrap().to_string();
        assert_eq!(params(stand_in), params(&real));
        assert!(verify_password("correct horse", stand_in).is_err());
    }

    #[tokio::test]
    async fn test_session_identity_lifecycle() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);
        let user = auth.register("shopper", "correct horse").await.unwrap();
        let session = session();

        assert_eq!(auth.current_identity(&session).await.unwrap(), None);

        auth.log_in(&session, &user).await.unwrap();
        assert_eq!(auth.current_identity(&session).await.unwrap(), Some(user));

        auth.log_out(&session).await.unwrap();
        assert_eq!(auth.current_identity(&session).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_identity_for_missing_user_is_anonymous() {
        let persistence = Persistence::in_memory();
        let auth = AuthService::new(&persistence);
        let session = session();
        let ghost = CurrentUser {
            id: grocery_core::UserId::new(404),
            username: Username::parse("ghost").unwrap(),
        };
        session
            .insert(session_keys::CURRENT_USER, ghost)
            .await
            .unwrap();

        assert_eq!(auth.current_identity(&session).await.unwrap(), None);
        assert!(
            session
                .get::<CurrentUser>(session_keys::CURRENT_USER)
                .await
                .unwrap()
                .is_none()
        );
    }
}
