//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET       /                                   - All stores
//! GET       /health                             - Liveness check
//! GET       /health/ready                       - Readiness check
//!
//! # Catalog (requires auth)
//! GET/POST  /new_store                          - Create a store
//! GET/POST  /store/{store_id}                   - Store detail and edit form
//! GET/POST  /new_item                           - Create an item
//! GET/POST  /item/{item_id}                     - Item detail and edit form
//!
//! # Shopping list (requires auth)
//! POST      /add_to_shopping_list/{item_id}     - Put item on the caller's list
//! POST      /remove_from_shopping_list/{item_id} - Take item off the caller's list
//! GET       /shopping_list                      - The caller's list
//!
//! # Auth
//! GET/POST  /signup                             - Registration
//! GET/POST  /login                              - Login (honours ?next=)
//! GET       /logout                             - Logout (requires auth)
//! ```

pub mod auth;
pub mod health;
pub mod home;
pub mod items;
pub mod shopping_list;
pub mod stores;

use axum::{
    Router,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::Session;

use crate::error::{AppError, NotFoundTemplate};
use crate::middleware::{request_id_middleware, security_headers_middleware, take_flashes};
use crate::models::User;
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Context every page template needs for the base layout.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Logged-in username, `None` for anonymous visitors.
    pub username: Option<String>,
    /// Flash messages drained from the session for this render.
    pub flashes: Vec<String>,
}

impl Page {
    /// Build the layout context, consuming pending flash messages.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session cannot be read.
    pub async fn load(session: &Session, user: Option<&User>) -> Result<Self, AppError> {
        Ok(Self {
            username: user.map(|u| u.username.to_string()),
            flashes: take_flashes(session).await?,
        })
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }
}

/// One `<option>` of a select field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Id taken from the URL path.
///
/// An id that doesn't parse can't name a row, so it gets the same 404 page
/// as one that parses but is missing.
#[derive(Debug, Clone, Copy)]
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| Self(id))
            .map_err(|rejection| AppError::NotFound(rejection.body_text()))
    }
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        // Catalog
        .route("/new_store", get(stores::new_page).post(stores::create))
        .route("/store/{store_id}", get(stores::show).post(stores::update))
        .route("/new_item", get(items::new_page).post(items::create))
        .route("/item/{item_id}", get(items::show).post(items::update))
        // Shopping list
        .route(
            "/add_to_shopping_list/{item_id}",
            post(shopping_list::add),
        )
        .route(
            "/remove_from_shopping_list/{item_id}",
            post(shopping_list::remove),
        )
        .route("/shopping_list", get(shopping_list::show))
        // Auth
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Build the full application router.
///
/// The session layer is left to the caller: `PostgreSQL`-backed in the
/// binary, in-memory in the integration tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

async fn not_found() -> Response {
    (
        axum::http::StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page: Page::default(),
        },
    )
        .into_response()
}

/// `next` targets login may redirect to: local paths only.
///
/// Browsers drop tabs and newlines while parsing a `Location`, so a target
/// holding any whitespace or control character is refused outright.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.starts_with("/\\")
            && !n.chars().any(|c| c.is_whitespace() || c.is_control())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths() {
        assert_eq!(safe_next(Some("/shopping_list")), Some("/shopping_list"));
        assert_eq!(safe_next(Some("/item/3?x=1")), Some("/item/3?x=1"));
    }

    #[test]
    fn test_safe_next_rejects_other_hosts() {
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("/\t/evil.example/")), None);
        assert_eq!(safe_next(Some("/\n/evil.example/")), None);
        assert_eq!(safe_next(Some("/\r\nSet-Cookie: x=1")), None);
        assert_eq!(safe_next(Some("/ /evil.example/")), None);
        assert_eq!(safe_next(Some("")), None);
        assert_eq!(safe_next(None), None);
    }
}
