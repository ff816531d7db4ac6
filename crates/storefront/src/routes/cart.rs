//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutating handler answers
//! with the full [`CartView`] so the client can redraw without a second
//! request.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use native_delight_core::MenuItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::CartLine;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::ShopSession;
use crate::state::AppState;

use super::{load_shop, save_shop};

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub item_id: MenuItemId,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    pub image: Option<String>,
}

/// Cart display data, including the view flags of the cart page.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub item_count: u32,
    pub cart_open: bool,
    pub payment_options_open: bool,
    pub checkout_open: bool,
    pub order_placed: bool,
    pub checkout_error: Option<String>,
    pub reset_at: Option<DateTime<Utc>>,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item.id.clone(),
            name: line.item.name.clone(),
            quantity: line.quantity,
            price: line.item.price.to_string(),
            line_price: line.line_total().to_string(),
            image: line.item.image.clone(),
        }
    }
}

impl From<&ShopSession> for CartView {
    fn from(shop: &ShopSession) -> Self {
        let cart = shop.cart();
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.total().to_string(),
            total_amount: cart.total().amount(),
            item_count: cart.item_count(),
            cart_open: shop.is_cart_open(),
            payment_options_open: shop.is_payment_options_open(),
            checkout_open: shop.is_checkout_open(),
            order_placed: shop.is_order_placed(),
            checkout_error: shop.checkout_error().map(String::from),
            reset_at: shop.pending_reset().map(|reset| reset.due_at),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub count: u32,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub item_id: MenuItemId,
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub item_id: MenuItemId,
    /// Values below 1 remove the line.
    pub quantity: i64,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub item_id: MenuItemId,
}

/// Save the shop state and answer with its cart view.
pub(super) async fn respond(session: &Session, shop: &ShopSession) -> Result<Response> {
    save_shop(session, shop).await?;
    Ok(Json(CartView::from(shop)).into_response())
}

/// Display the cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let shop = load_shop(&session).await?;
    Ok(Json(CartView::from(&shop)))
}

/// Get the cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCountView>> {
    let shop = load_shop(&session).await?;
    Ok(Json(CartCountView {
        count: shop.cart().item_count(),
    }))
}

/// Add one unit of a menu item.
///
/// Inactive items are listed but refused here.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddToCartRequest>,
) -> Result<Response> {
    let catalog = state.catalog().await;
    let item = catalog
        .item(&body.item_id)
        .ok_or_else(|| AppError::NotFound(format!("menu item {}", body.item_id)))?;

    if !item.is_orderable() {
        return Err(AppError::Conflict(format!(
            "{} is not available right now.",
            item.name
        )));
    }

    let mut shop = load_shop(&session).await?;
    shop.add_to_cart(item);
    add_breadcrumb("cart", "Added item", Some(&[("item_id", item.id.as_str())]));

    respond(&session, &shop).await
}

/// Set the quantity of a line.
#[instrument(skip(session))]
pub async fn update(session: Session, Json(body): Json<UpdateCartRequest>) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.update_quantity(&body.item_id, body.quantity);
    respond(&session, &shop).await
}

/// Remove a line.
#[instrument(skip(session))]
pub async fn remove(session: Session, Json(body): Json<RemoveFromCartRequest>) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.remove_from_cart(&body.item_id);
    respond(&session, &shop).await
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.clear_cart();
    respond(&session, &shop).await
}

/// Show the cart (ignored while it is empty).
#[instrument(skip(session))]
pub async fn open(session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.open_cart();
    respond(&session, &shop).await
}

/// Hide the cart and its checkout overlays.
#[instrument(skip(session))]
pub async fn close(session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.close_cart();
    respond(&session, &shop).await
}
