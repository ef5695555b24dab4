//! Authentication route handlers.
//!
//! Handles signup, login and logout with username and password.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grocery_core::{FieldErrors, REQUIRED, SignupFields};

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, push_flash};
use crate::models::User;
use crate::routes::{Page, safe_next};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Error shown for any failed login.
pub const LOGIN_FAILED: &str = "Invalid username or password.";

// =============================================================================
// Form Types
// =============================================================================

/// Signup form data.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

/// Login form data.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    /// Where to go after login, carried over from the query string.
    pub next: String,
}

/// Query parameters for the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub page: Page,
    pub username: String,
    pub errors: FieldErrors,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub page: Page,
    pub username: String,
    pub next: Option<String>,
    pub errors: FieldErrors,
    pub error: Option<&'static str>,
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    Ok(SignupTemplate {
        page: Page::load(&session, user.as_ref()).await?,
        username: String::new(),
        errors: FieldErrors::new(),
    })
}

/// Handle signup form submission.
#[instrument(skip_all, fields(username = %form.username.trim()))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let registered =
        match SignupFields::parse(&form.username, &form.password, &form.password_confirm) {
            Ok(credentials) => {
                AuthService::new(state.persistence())
                    .register_validated(credentials)
                    .await
            }
            Err(errors) => Err(AuthError::Validation(errors)),
        };

    match registered {
        Ok(_) => {
            push_flash(&session, "Account Created.").await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(AuthError::Validation(errors)) => Ok(SignupTemplate {
            page: Page::load(&session, user.as_ref()).await?,
            username: form.username,
            errors,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<LoginQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(LoginTemplate {
        page: Page::load(&session, user.as_ref()).await?,
        username: String::new(),
        next: query.next,
        errors: FieldErrors::new(),
        error: None,
    })
}

/// Handle login form submission.
///
/// On success, redirects to the page that sent the user here when that is a
/// local path, otherwise home.
#[instrument(skip_all, fields(username = %form.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Query(query): Query<LoginQuery>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let next = Some(form.next.clone())
        .filter(|n| !n.is_empty())
        .or(query.next);

    let mut errors = FieldErrors::new();
    if form.username.trim().is_empty() {
        errors.add("username", REQUIRED);
    }
    if form.password.is_empty() {
        errors.add("password", REQUIRED);
    }
    if !errors.is_empty() {
        return render_login(&session, current.as_ref(), form.username, next, errors, None).await;
    }

    let auth = AuthService::new(state.persistence());
    let user: User = match auth.authenticate(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            return render_login(
                &session,
                current.as_ref(),
                form.username,
                next,
                errors,
                Some(LOGIN_FAILED),
            )
            .await;
        }
        Err(e) => return Err(e.into()),
    };

    auth.log_in(&session, &user).await?;

    let target = safe_next(next.as_deref()).unwrap_or("/");
    Ok(Redirect::to(target).into_response())
}

async fn render_login(
    session: &Session,
    current: Option<&User>,
    username: String,
    next: Option<String>,
    errors: FieldErrors,
    error: Option<&'static str>,
) -> Result<Response, AppError> {
    Ok(LoginTemplate {
        page: Page::load(session, current).await?,
        username,
        next,
        errors,
        error,
    }
    .into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Log out and return home.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(_user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    AuthService::new(state.persistence())
        .log_out(&session)
        .await?;
    push_flash(&session, "You have been logged out.").await?;

    Ok(Redirect::to("/"))
}
