//! Selection route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use native_delight_core::{CategoryId, MenuItemId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{Catalog, MenuItem};
use crate::error::{AppError, Result};
use crate::selection::{Selection, SubcategoryChoice};
use crate::session::ShopSession;
use crate::state::AppState;

use super::{load_shop, save_shop};

/// Selection state with the items it resolves to.
#[derive(Debug, Serialize)]
pub struct SelectionView<'a> {
    pub selection: &'a Selection,
    /// Items previewed inside an open category.
    pub preview: Vec<&'a MenuItem>,
    /// Items of a committed result.
    pub items: Vec<&'a MenuItem>,
}

impl<'a> SelectionView<'a> {
    fn new(shop: &'a ShopSession, catalog: &'a Catalog) -> Self {
        let selection = shop.selection();
        Self {
            selection,
            preview: selection.preview_items(catalog),
            items: selection.displayed_items(catalog),
        }
    }
}

/// Open category request body.
#[derive(Debug, Deserialize)]
pub struct OpenCategoryRequest {
    pub category_id: CategoryId,
}

/// Preview subcategory request body.
#[derive(Debug, Deserialize)]
pub struct SelectSubcategoryRequest {
    /// A subcategory id, or `"all"`.
    pub subcategory: String,
}

/// Commit request body.
#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    pub category: String,
    /// A subcategory name, or the "All Items" label.
    pub subcategory: String,
    #[serde(default)]
    pub items: Vec<MenuItemId>,
}

async fn respond(session: &Session, shop: &ShopSession, catalog: &Catalog) -> Result<Response> {
    save_shop(session, shop).await?;
    Ok(Json(SelectionView::new(shop, catalog)).into_response())
}

/// Current selection.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Response> {
    let shop = load_shop(&session).await?;
    let catalog = state.catalog().await;
    Ok(Json(SelectionView::new(&shop, &catalog)).into_response())
}

/// Open a category.
#[instrument(skip(state, session))]
pub async fn open_category(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<OpenCategoryRequest>,
) -> Result<Response> {
    let catalog = state.catalog().await;
    let category = catalog
        .category(&body.category_id)
        .ok_or_else(|| AppError::NotFound(format!("category {}", body.category_id)))?;

    let mut shop = load_shop(&session).await?;
    shop.selection_mut().open_category(category)?;

    respond(&session, &shop, &catalog).await
}

/// Preview a subcategory of the open category.
#[instrument(skip(state, session))]
pub async fn select_subcategory(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SelectSubcategoryRequest>,
) -> Result<Response> {
    let catalog = state.catalog().await;
    let mut shop = load_shop(&session).await?;

    shop.selection_mut()
        .select_subcategory(&catalog, SubcategoryChoice::parse(&body.subcategory))?;

    respond(&session, &shop, &catalog).await
}

/// Commit a category / subcategory and show its items.
#[instrument(skip(state, session))]
pub async fn commit(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<CommitRequest>,
) -> Result<Response> {
    let catalog = state.catalog().await;
    let mut shop = load_shop(&session).await?;

    shop.selection_mut()
        .commit(&catalog, &body.category, &body.subcategory, body.items)?;

    respond(&session, &shop, &catalog).await
}

/// Back to the category grid. Also closes the cart and its overlays.
#[instrument(skip(state, session))]
pub async fn back(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.back_to_category();

    let catalog = state.catalog().await;
    respond(&session, &shop, &catalog).await
}
