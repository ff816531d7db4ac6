//! Checkout route handlers.
//!
//! Two exclusive ways to finish an order: the card checkout form, which goes
//! through the payment endpoint of the menu API, and the WhatsApp handoff.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::checkout::{CheckoutCoordinator, CheckoutError, CheckoutForm, CheckoutOutcome};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::session::ShopSession;
use crate::state::AppState;
use crate::whatsapp::order_link;

use super::cart::respond;
use super::{load_shop, save_shop};

/// Result of a successful checkout submission.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// Hosted payment page to send the visitor to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub order_placed: bool,
    /// When the cart will be cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

/// Result of the WhatsApp handoff.
#[derive(Debug, Serialize)]
pub struct WhatsAppResponse {
    pub url: String,
    pub reset_at: Option<DateTime<Utc>>,
}

fn ensure_not_placed(shop: &ShopSession) -> Result<()> {
    if shop.is_order_placed() {
        return Err(AppError::Conflict(
            "Your order has already been placed.".to_string(),
        ));
    }
    Ok(())
}

/// Offer the payment options.
#[instrument(skip(session))]
pub async fn place(session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    if shop.cart().is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    ensure_not_placed(&shop)?;

    shop.place_order();
    respond(&session, &shop).await
}

/// Move from the payment options to the card checkout form.
#[instrument(skip(session))]
pub async fn card(session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    if !shop.choose_card_payment() {
        return Err(AppError::Conflict(
            "Choose a payment option first.".to_string(),
        ));
    }
    respond(&session, &shop).await
}

/// Close the payment options or the checkout form.
#[instrument(skip(session))]
pub async fn close(session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    shop.close_checkout();
    respond(&session, &shop).await
}

/// Submit the checkout form.
///
/// Validation failures are answered with `422` and nothing is sent. A
/// payment page URL is returned as-is and the cart is kept; a confirmation
/// without a URL schedules the cart reset.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    ensure_not_placed(&shop)?;

    let outcome = CheckoutCoordinator::new(state.menu_api())
        .submit(shop.cart(), &form)
        .await;

    match outcome {
        Ok(CheckoutOutcome::Redirect(url)) => {
            add_breadcrumb("checkout", "Redirected to payment page", None);
            Ok(Json(CheckoutResponse {
                redirect_url: Some(url.to_string()),
                order_placed: false,
                reset_at: None,
            })
            .into_response())
        }
        Ok(CheckoutOutcome::Confirmed) => {
            shop.order_completed(Utc::now());
            save_shop(&session, &shop).await?;
            add_breadcrumb("checkout", "Order confirmed", None);
            Ok(Json(CheckoutResponse {
                redirect_url: None,
                order_placed: true,
                reset_at: shop.pending_reset().map(|reset| reset.due_at),
            })
            .into_response())
        }
        Err(CheckoutError::Payment(message)) => {
            shop.payment_failed(message.clone());
            save_shop(&session, &shop).await?;
            Err(CheckoutError::Payment(message).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Hand the order off to WhatsApp.
///
/// Answers with the deep link; the order counts as placed.
#[instrument(skip(state, session))]
pub async fn whatsapp(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut shop = load_shop(&session).await?;
    if shop.cart().is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    ensure_not_placed(&shop)?;

    let url = order_link(&state.config().whatsapp_number, &shop.cart().snapshot());
    shop.order_completed(Utc::now());
    save_shop(&session, &shop).await?;

    tracing::info!(items = shop.cart().item_count(), "Order handed off to WhatsApp");
    add_breadcrumb("checkout", "Order sent via WhatsApp", None);

    Ok(Json(WhatsAppResponse {
        url,
        reset_at: shop.pending_reset().map(|reset| reset.due_at),
    })
    .into_response())
}
