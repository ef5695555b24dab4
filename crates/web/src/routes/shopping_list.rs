//! Shopping list route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use grocery_core::ItemId;

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, login_redirect, push_flash};
use crate::models::GroceryItem;
use crate::routes::{IdPath, Page};
use crate::services::{AddOutcome, RemoveOutcome, ShoppingListService};
use crate::state::AppState;

/// Shopping list page template.
#[derive(Template, WebTemplate)]
#[template(path = "shopping_list.html")]
pub struct ShoppingListTemplate {
    pub page: Page,
    pub items: Vec<GroceryItem>,
}

/// Put an item on the caller's list and return to the item page.
///
/// An anonymous caller is sent to login, resuming on the item page.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    IdPath(item_id): IdPath<ItemId>,
) -> Result<Response, AppError> {
    let item_page = format!("/item/{item_id}");
    let Some(user) = user else {
        return Ok(login_redirect(Some(&item_page)).into_response());
    };

    let outcome = ShoppingListService::new(state.persistence())
        .add_to_list(user.id, item_id)
        .await?;

    let message = match outcome {
        AddOutcome::Added => {
            add_breadcrumb("shopping_list", "Item added", None);
            "The grocery item was added to your shopping list successfully."
        }
        AddOutcome::AlreadyPresent => "The grocery item is already in your shopping list.",
    };
    push_flash(&session, message).await?;

    Ok(Redirect::to(&item_page).into_response())
}

/// Take an item off the caller's list and return to the item page.
#[instrument(skip(state, session, user))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    IdPath(item_id): IdPath<ItemId>,
) -> Result<Response, AppError> {
    let item_page = format!("/item/{item_id}");
    let Some(user) = user else {
        return Ok(login_redirect(Some(&item_page)).into_response());
    };

    let outcome = ShoppingListService::new(state.persistence())
        .remove_from_list(user.id, item_id)
        .await?;

    let message = match outcome {
        RemoveOutcome::Removed => {
            add_breadcrumb("shopping_list", "Item removed", None);
            "The grocery item was removed from your shopping list successfully."
        }
        RemoveOutcome::NotPresent => "The grocery item was not in your shopping list.",
    };
    push_flash(&session, message).await?;

    Ok(Redirect::to(&item_page).into_response())
}

/// Display the caller's list.
#[instrument(skip(state, session, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let items = ShoppingListService::new(state.persistence())
        .list_for_user(user.id)
        .await?;

    Ok(ShoppingListTemplate {
        page: Page::load(&session, Some(&user)).await?,
        items,
    })
}
