//! Grocery item route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use grocery_core::{FieldErrors, ItemCategory, ItemId, ItemInput};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, push_flash};
use crate::models::{GroceryItem, GroceryStore, User};
use crate::routes::{IdPath, Page, SelectOption};
use crate::services::{ItemService, ServiceError, ShoppingListService, StoreService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Item create/edit form data.
///
/// Every field stays a string so a rejected submission can be shown back
/// exactly as typed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemForm {
    pub name: String,
    pub price: String,
    pub category: String,
    pub photo_url: String,
    pub store: String,
}

impl ItemForm {
    fn input(&self) -> ItemInput<'_> {
        ItemInput {
            name: &self.name,
            price: &self.price,
            category: &self.category,
            photo_url: &self.photo_url,
            store: &self.store,
        }
    }
}

impl From<&GroceryItem> for ItemForm {
    fn from(item: &GroceryItem) -> Self {
        Self {
            name: item.name.clone(),
            price: item.price.to_string(),
            category: item.category.as_str().to_string(),
            photo_url: item.photo_url.clone(),
            store: item.store_id.to_string(),
        }
    }
}

/// Options for the category and store selects.
pub struct ItemChoices {
    pub categories: Vec<SelectOption>,
    pub stores: Vec<SelectOption>,
}

impl ItemChoices {
    fn build(form: &ItemForm, stores: &[GroceryStore]) -> Self {
        let chosen = ItemCategory::parse_or_default(&form.category).ok();
        let categories = ItemCategory::ALL
            .into_iter()
            .map(|category| SelectOption {
                value: category.as_str().to_string(),
                label: category.as_str().to_string(),
                selected: chosen == Some(category),
            })
            .collect();

        let stores = stores
            .iter()
            .map(|store| {
                let value = store.id.to_string();
                SelectOption {
                    selected: value == form.store.trim(),
                    value,
                    label: store.title.clone(),
                }
            })
            .collect();

        Self { categories, stores }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// New item page template.
#[derive(Template, WebTemplate)]
#[template(path = "new_item.html")]
pub struct NewItemTemplate {
    pub page: Page,
    pub form: ItemForm,
    pub errors: FieldErrors,
    pub choices: ItemChoices,
}

/// Item detail page template, including the edit form.
#[derive(Template, WebTemplate)]
#[template(path = "item_detail.html")]
pub struct ItemDetailTemplate {
    pub page: Page,
    pub item: GroceryItem,
    pub store: Option<GroceryStore>,
    pub created_by: Option<String>,
    pub on_list: bool,
    pub form: ItemForm,
    pub errors: FieldErrors,
    pub choices: ItemChoices,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the new item form.
pub async fn new_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    render_new(&state, &session, &user, ItemForm::default(), FieldErrors::new()).await
}

/// Handle new item form submission.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    let service = ItemService::new(state.persistence());

    match service.create_item(&form.input(), &user).await {
        Ok(item) => {
            let item_id = item.id.to_string();
            add_breadcrumb("item", "Item created", Some(&[("item_id", item_id.as_str())]));
            push_flash(&session, "New grocery item was created successfully.").await?;
            Ok(Redirect::to(&format!("/item/{}", item.id)).into_response())
        }
        Err(ServiceError::Validation(errors)) => {
            render_new(&state, &session, &user, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

/// Display an item, its shopping list button and the edit form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    IdPath(item_id): IdPath<ItemId>,
) -> Result<Response, AppError> {
    let item = ItemService::new(state.persistence())
        .get_item(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;

    let form = ItemForm::from(&item);
    render_detail(&state, &session, &user, item, form, FieldErrors::new()).await
}

/// Handle item edit form submission.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    IdPath(item_id): IdPath<ItemId>,
    Form(form): Form<ItemForm>,
) -> Result<Response, AppError> {
    let service = ItemService::new(state.persistence());

    match service.update_item(item_id, &form.input()).await {
        Ok(item) => {
            push_flash(&session, "The grocery item was updated successfully.").await?;
            Ok(Redirect::to(&format!("/item/{}", item.id)).into_response())
        }
        Err(ServiceError::Validation(errors)) => {
            let item = service
                .get_item(item_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("item {item_id}")))?;
            render_detail(&state, &session, &user, item, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_new(
    state: &AppState,
    session: &Session,
    user: &User,
    form: ItemForm,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let stores = StoreService::new(state.persistence()).list_stores().await?;

    Ok(NewItemTemplate {
        page: Page::load(session, Some(user)).await?,
        choices: ItemChoices::build(&form, &stores),
        form,
        errors,
    }
    .into_response())
}

async fn render_detail(
    state: &AppState,
    session: &Session,
    user: &User,
    item: GroceryItem,
    form: ItemForm,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let persistence = state.persistence();
    let stores = StoreService::new(persistence).list_stores().await?;
    let store = stores.iter().find(|s| s.id == item.store_id).cloned();
    let on_list = ShoppingListService::new(persistence)
        .contains(user.id, item.id)
        .await?;

    let created_by = match item.created_by {
        Some(id) => persistence
            .users()
            .get_by_id(id)
            .await?
            .map(|u| u.username.to_string()),
        None => None,
    };

    Ok(ItemDetailTemplate {
        page: Page::load(session, Some(user)).await?,
        choices: ItemChoices::build(&form, &stores),
        item,
        store,
        created_by,
        on_list,
        form,
        errors,
    }
    .into_response())
}
