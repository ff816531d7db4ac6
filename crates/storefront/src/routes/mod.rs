//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Health check
//!
//! # Catalog
//! GET  /api/catalog                 - Categories, banners and load issues
//! GET  /api/menu                    - Items shown for the committed selection
//!
//! # Selection
//! GET  /api/selection               - Selection state with previewed/shown items
//! POST /api/selection/category      - Open a category
//! POST /api/selection/subcategory   - Preview a subcategory (or "all")
//! POST /api/selection/commit        - Show a category / subcategory result
//! POST /api/selection/back          - Back to the category grid
//!
//! # Cart
//! GET  /api/cart                    - Cart view
//! GET  /api/cart/count              - Cart count badge
//! POST /api/cart/add                - Add one unit of an item
//! POST /api/cart/update             - Set a line quantity (< 1 removes)
//! POST /api/cart/remove             - Remove a line
//! POST /api/cart/clear              - Empty the cart
//! POST /api/cart/open               - Show the cart
//! POST /api/cart/close              - Hide the cart
//!
//! # Checkout
//! POST /api/checkout/place          - Offer payment options
//! POST /api/checkout/card           - Open the card checkout form
//! POST /api/checkout/close          - Close payment options / checkout form
//! POST /api/checkout                - Submit the checkout form
//! POST /api/checkout/whatsapp       - Hand the order off to WhatsApp
//! ```
//!
//! Every handler works on the visitor's [`ShopSession`], loaded from the
//! session record (applying any reset that has come due) and saved back
//! after a change.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod selection;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{
    create_session_layer, make_request_span, request_id_middleware, serialize_visitor_requests,
};
use crate::session::ShopSession;
use crate::state::AppState;

/// Session key for the visitor's [`ShopSession`].
pub const SHOP_SESSION_KEY: &str = "shop";

/// Load the visitor's shop state, applying a reset that has come due.
pub(crate) async fn load_shop(session: &Session) -> Result<ShopSession> {
    let mut shop = session
        .get::<ShopSession>(SHOP_SESSION_KEY)
        .await?
        .unwrap_or_default();

    if shop.settle(Utc::now()) {
        tracing::debug!("Applied pending order reset");
        save_shop(session, &shop).await?;
    }

    Ok(shop)
}

/// Store the visitor's shop state.
pub(crate) async fn save_shop(session: &Session, shop: &ShopSession) -> Result<()> {
    session.insert(SHOP_SESSION_KEY, shop).await?;
    Ok(())
}

/// Create the selection routes router.
pub fn selection_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(selection::show))
        .route("/category", post(selection::open_category))
        .route("/subcategory", post(selection::select_subcategory))
        .route("/commit", post(selection::commit))
        .route("/back", post(selection::back))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/open", post(cart::open))
        .route("/close", post(cart::close))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::submit))
        .route("/place", post(checkout::place))
        .route("/card", post(checkout::card))
        .route("/close", post(checkout::close))
        .route("/whatsapp", post(checkout::whatsapp))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/catalog", get(catalog::show))
        .route("/api/menu", get(catalog::menu))
        .nest("/api/selection", selection_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}

/// Build the storefront application with its session, visitor-lock,
/// request-id and tracing layers.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    routes()
        .layer(session_layer)
        .layer(axum::middleware::from_fn_with_state(
            state.session_locks().clone(),
            serialize_visitor_requests,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the menu API.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;

    fn test_app() -> Router {
        app(AppState::new(StorefrontConfig::default()).unwrap())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_catalog_reports_unconfigured_api() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/catalog")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["categories"], serde_json::json!([]));
        assert_eq!(
            json["issues"][0]["message"],
            "Failed to load menu or categories. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_empty_cart_count() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/cart/count")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["count"], 0);
    }

    #[tokio::test]
    async fn test_add_unknown_item_is_not_found() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/cart/add")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"item_id":"nope"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_is_refused() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkout")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"name":"Ada","phone":"08012345678","address":"Ikeja","email":"ada@example.com"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["error"], "Your cart is empty.");
    }
}
