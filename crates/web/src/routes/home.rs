//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::GroceryStore;
use crate::routes::Page;
use crate::services::StoreService;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: Page,
    pub stores: Vec<GroceryStore>,
}

/// Display every store.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse, AppError> {
    let stores = StoreService::new(state.persistence()).list_stores().await?;

    Ok(HomeTemplate {
        page: Page::load(&session, user.as_ref()).await?,
        stores,
    })
}
