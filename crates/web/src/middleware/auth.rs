//! Authentication extractors.
//!
//! Both extractors resolve the session identity through [`AuthService`], so
//! the user row is re-read on every request.

use axum::{
    extract::FromRequestParts,
    http::{Method, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::User;
use crate::services::AuthService;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Anonymous requests are redirected to the login page, carrying the
/// requested path so login can send the user back.
///
/// # Example
///
/// ```rust,ignore
/// async fn shopping_list(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("{}'s list", user.username)
/// }
/// ```
pub struct RequireAuth(pub User);

/// Extractor that optionally gets the current user.
pub struct OptionalAuth(pub Option<User>);

/// Rejection for the auth extractors.
pub enum AuthRejection {
    /// Anonymous request; redirect to login, optionally resuming at `next`.
    RedirectToLogin(Option<String>),
    /// The session or user lookup failed.
    Failed(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => login_redirect(next.as_deref()).into_response(),
            Self::Failed(err) => err.into_response(),
        }
    }
}

/// Redirect to the login page, with a `next` parameter when given.
#[must_use]
pub fn login_redirect(next: Option<&str>) -> Redirect {
    match next {
        Some(next) => Redirect::to(&format!("/login?next={}", urlencoding::encode(next))),
        None => Redirect::to("/login"),
    }
}

async fn resolve_user(parts: &Parts, state: &AppState) -> Result<Option<User>, AuthRejection> {
    let session = parts.extensions.get::<Session>().ok_or_else(|| {
        AuthRejection::Failed(AppError::Internal("session layer missing".to_string()))
    })?;

    AuthService::new(state.persistence())
        .current_identity(session)
        .await
        .map_err(|e| AuthRejection::Failed(e.into()))
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = resolve_user(parts, state).await? {
            return Ok(Self(user));
        }

        // Only a page the browser can navigate back to is worth resuming.
        let next = matches!(parts.method, Method::GET | Method::HEAD)
            .then(|| parts.uri.path_and_query().map(ToString::to_string))
            .flatten();

        Err(AuthRejection::RedirectToLogin(next))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_user(parts, state).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header::LOCATION};

    use super::*;

    #[test]
    fn test_login_redirect_encodes_next() {
        let response = login_redirect(Some("/item/3?tab=list")).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "/login?next=%2Fitem%2F3%3Ftab%3Dlist"
        );
    }

    #[test]
    fn test_login_redirect_without_next() {
        let response = login_redirect(None).into_response();
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/login");
    }
}
