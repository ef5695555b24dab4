//! Grocery store route handlers.

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

use grocery_core::{FieldErrors, StoreId};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, push_flash};
use crate::models::{GroceryItem, GroceryStore, User};
use crate::routes::{IdPath, Page};
use crate::services::{ItemService, ServiceError, StoreService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Store create/edit form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreForm {
    pub title: String,
    pub address: String,
}

impl From<&GroceryStore> for StoreForm {
    fn from(store: &GroceryStore) -> Self {
        Self {
            title: store.title.clone(),
            address: store.address.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// New store page template.
#[derive(Template, WebTemplate)]
#[template(path = "new_store.html")]
pub struct NewStoreTemplate {
    pub page: Page,
    pub form: StoreForm,
    pub errors: FieldErrors,
}

/// Store detail page template, including the edit form.
#[derive(Template, WebTemplate)]
#[template(path = "store_detail.html")]
pub struct StoreDetailTemplate {
    pub page: Page,
    pub store: GroceryStore,
    pub created_by: Option<String>,
    pub items: Vec<GroceryItem>,
    pub form: StoreForm,
    pub errors: FieldErrors,
}

// =============================================================================
// Routes
// =============================================================================

/// Display the new store form.
pub async fn new_page(
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    Ok(NewStoreTemplate {
        page: Page::load(&session, Some(&user)).await?,
        form: StoreForm::default(),
        errors: FieldErrors::new(),
    })
}

/// Handle new store form submission.
#[instrument(skip(state, session, user, form), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<StoreForm>,
) -> Result<Response, AppError> {
    let service = StoreService::new(state.persistence());

    match service.create_store(&form.title, &form.address, &user).await {
        Ok(store) => {
            let store_id = store.id.to_string();
            add_breadcrumb("store", "Store created", Some(&[("store_id", store_id.as_str())]));
            push_flash(&session, "New grocery store was created successfully.").await?;
            Ok(Redirect::to(&format!("/store/{}", store.id)).into_response())
        }
        Err(ServiceError::Validation(errors)) => Ok(NewStoreTemplate {
            page: Page::load(&session, Some(&user)).await?,
            form,
            errors,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Display a store, its items and the edit form.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    IdPath(store_id): IdPath<StoreId>,
) -> Result<Response, AppError> {
    let store = StoreService::new(state.persistence())
        .get_store(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {store_id}")))?;

    let form = StoreForm::from(&store);
    render_detail(&state, &session, &user, store, form, FieldErrors::new()).await
}

/// Handle store edit form submission.
#[instrument(skip(state, session, user, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    IdPath(store_id): IdPath<StoreId>,
    Form(form): Form<StoreForm>,
) -> Result<Response, AppError> {
    let service = StoreService::new(state.persistence());

    match service
        .update_store(store_id, &form.title, &form.address)
        .await
    {
        Ok(store) => {
            push_flash(&session, "The grocery store was updated successfully.").await?;
            Ok(Redirect::to(&format!("/store/{}", store.id)).into_response())
        }
        Err(ServiceError::Validation(errors)) => {
            let store = service
                .get_store(store_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("store {store_id}")))?;
            render_detail(&state, &session, &user, store, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_detail(
    state: &AppState,
    session: &Session,
    user: &User,
    store: GroceryStore,
    form: StoreForm,
    errors: FieldErrors,
) -> Result<Response, AppError> {
    let persistence = state.persistence();
    let items = ItemService::new(persistence).list_by_store(store.id).await?;

    let created_by = match store.created_by {
        Some(id) => persistence
            .users()
            .get_by_id(id)
            .await?
            .map(|u| u.username.to_string()),
        None => None,
    };

    Ok(StoreDetailTemplate {
        page: Page::load(session, Some(user)).await?,
        store,
        created_by,
        items,
        form,
        errors,
    }
    .into_response())
}
