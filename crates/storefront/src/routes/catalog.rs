//! Catalog route handlers.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::catalog::{Banner, Category, CatalogIssue, MenuItem};
use crate::error::Result;
use crate::selection::Selection;
use crate::state::AppState;

use super::load_shop;

/// Category with its derived subcategory count.
#[derive(Debug, Serialize)]
pub struct CategoryView<'a> {
    #[serde(flatten)]
    pub category: &'a Category,
    pub subcategory_count: usize,
}

/// A load failure the visitor should see.
#[derive(Debug, Serialize)]
pub struct IssueView {
    pub kind: CatalogIssue,
    pub message: &'static str,
}

/// Body of `GET /api/catalog`.
#[derive(Debug, Serialize)]
pub struct CatalogView<'a> {
    pub categories: Vec<CategoryView<'a>>,
    pub banners: &'a [Banner],
    pub issues: Vec<IssueView>,
}

/// Body of `GET /api/menu`.
#[derive(Debug, Serialize)]
pub struct MenuView<'a> {
    pub category_name: Option<&'a str>,
    pub subcategory_name: Option<&'a str>,
    pub item_count: usize,
    pub items: Vec<&'a MenuItem>,
}

/// Categories, banners and any load failures.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Response {
    let catalog = state.catalog().await;

    let view = CatalogView {
        categories: catalog
            .categories()
            .iter()
            .map(|category| CategoryView {
                category,
                subcategory_count: category.subcategory_count(),
            })
            .collect(),
        banners: catalog.banners(),
        issues: catalog
            .issues()
            .iter()
            .map(|&kind| IssueView {
                kind,
                message: kind.message(),
            })
            .collect(),
    };

    Json(view).into_response()
}

/// Items of the committed selection; empty while browsing.
#[instrument(skip(state, session))]
pub async fn menu(State(state): State<AppState>, session: Session) -> Result<Response> {
    let shop = load_shop(&session).await?;
    let catalog = state.catalog().await;

    let items = shop.selection().displayed_items(&catalog);
    let (category_name, subcategory_name) = match shop.selection() {
        Selection::SubcategoryResult {
            category_name,
            subcategory_name,
            ..
        } => (Some(category_name.as_str()), Some(subcategory_name.as_str())),
        _ => (None, None),
    };

    let view = MenuView {
        category_name,
        subcategory_name,
        item_count: items.len(),
        items,
    };

    Ok(Json(view).into_response())
}
