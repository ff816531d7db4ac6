//! Integration test harness for Native Delight.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p native-delight-integration-tests
//! ```
//!
//! # Pieces
//!
//! - [`FakeMenuApi`] - an axum server on a loopback port standing in for the
//!   menu API; records every order draft it receives
//! - [`Storefront`] - the real storefront router (real `reqwest` client,
//!   real session layer) driven with `tower::ServiceExt::oneshot`, carrying
//!   the session cookie between requests like a browser would

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use native_delight_storefront::config::{MenuApiConfig, StorefrontConfig};
use native_delight_storefront::routes;
use native_delight_storefront::state::AppState;

/// How the fake payment endpoint answers.
#[derive(Debug, Clone)]
pub enum PaymentBehavior {
    /// `200` with `data.authorization_url` set.
    Redirect(String),
    /// `200` with an empty object.
    Confirm,
    /// The given status with `{ "message": ... }`.
    Fail(u16, String),
}

#[derive(Clone)]
struct FakeState {
    products: Value,
    categories: Value,
    banners: Value,
    payment: PaymentBehavior,
    orders: Arc<Mutex<Vec<Value>>>,
    reads_failing: Arc<AtomicBool>,
}

impl FakeState {
    fn read(&self, body: &Value) -> (StatusCode, Json<Value>) {
        if self.reads_failing.load(Ordering::SeqCst) {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "message": "menu service unavailable" })),
            );
        }
        (StatusCode::OK, Json(body.clone()))
    }
}

/// A running fake menu API.
pub struct FakeMenuApi {
    pub base_url: String,
    orders: Arc<Mutex<Vec<Value>>>,
    reads_failing: Arc<AtomicBool>,
}

/// Menu items: two in Rice (Jollof, Fried), one inactive in Soups.
#[must_use]
pub fn sample_products() -> Value {
    json!({
        "success": true,
        "products": [
            {
                "_id": "p-jollof",
                "name": "Jollof Rice",
                "description": "Smoky party jollof",
                "price": 1000,
                "category": { "name": "Rice" },
                "subCategory": { "_id": "s-jollof", "name": "Jollof" },
                "status": "active",
                "stock": "In stock",
                "image": "https://cdn.example/jollof.jpg"
            },
            {
                "_id": "p-fried",
                "name": "Fried Rice",
                "price": 1500,
                "category": { "name": "Rice" },
                "subCategory": { "_id": "s-fried", "name": "Fried" },
                "status": "active",
                "stock": "In stock"
            },
            {
                "_id": "p-egusi",
                "name": "Egusi Soup",
                "price": 2200,
                "category": "Soups",
                "subCategory": "Egusi",
                "status": "inactive",
                "stock": "Sold out"
            }
        ]
    })
}

/// Categories matching [`sample_products`].
#[must_use]
pub fn sample_categories() -> Value {
    json!({
        "success": true,
        "categories": [
            {
                "_id": "c-rice",
                "name": "Rice",
                "description": "Rice dishes",
                "status": "active",
                "image": { "url": "https://cdn.example/rice.jpg" },
                "subcategories": [
                    { "_id": "s-jollof", "name": "Jollof" },
                    { "_id": "s-fried", "name": "Fried" }
                ]
            },
            {
                "_id": "c-soup",
                "name": "Soups",
                "status": "active",
                "image": "https://cdn.example/soup.jpg",
                "subcategories": [{ "_id": "s-egusi", "name": "Egusi" }]
            }
        ]
    })
}

impl FakeMenuApi {
    /// Start a fake API with the sample catalog.
    pub async fn start(payment: PaymentBehavior) -> Self {
        Self::start_with(
            sample_products(),
            sample_categories(),
            json!({ "banner": [] }),
            payment,
        )
        .await
    }

    /// Start a fake API serving the given bodies.
    ///
    /// # Panics
    ///
    /// Panics if the loopback listener cannot be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start_with(
        products: Value,
        categories: Value,
        banners: Value,
        payment: PaymentBehavior,
    ) -> Self {
        let orders = Arc::new(Mutex::new(Vec::new()));
        let reads_failing = Arc::new(AtomicBool::new(false));
        let state = FakeState {
            products,
            categories,
            banners,
            payment,
            orders: Arc::clone(&orders),
            reads_failing: Arc::clone(&reads_failing),
        };

        let app = Router::new()
            .route("/product", get(self::products))
            .route("/category", get(self::categories))
            .route("/banner", get(self::banners))
            .route("/order/checkout", post(checkout))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{addr}"),
            orders,
            reads_failing,
        }
    }

    /// Make the three read endpoints answer `503` from now on.
    pub fn fail_reads(&self) {
        self.reads_failing.store(true, Ordering::SeqCst);
    }

    /// Order drafts received so far.
    ///
    /// # Panics
    ///
    /// Panics if the recording lock is poisoned.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn orders(&self) -> Vec<Value> {
        self.orders.lock().unwrap().clone()
    }
}

async fn products(State(state): State<FakeState>) -> (StatusCode, Json<Value>) {
    state.read(&state.products)
}

async fn categories(State(state): State<FakeState>) -> (StatusCode, Json<Value>) {
    state.read(&state.categories)
}

async fn banners(State(state): State<FakeState>) -> (StatusCode, Json<Value>) {
    state.read(&state.banners)
}

#[allow(clippy::unwrap_used)]
async fn checkout(State(state): State<FakeState>, Json(draft): Json<Value>) -> (StatusCode, Json<Value>) {
    state.orders.lock().unwrap().push(draft);

    match state.payment {
        PaymentBehavior::Redirect(url) => (
            StatusCode::OK,
            Json(json!({
                "status": true,
                "data": { "authorization_url": url, "reference": "ref-123" }
            })),
        ),
        PaymentBehavior::Confirm => (StatusCode::OK, Json(json!({}))),
        PaymentBehavior::Fail(status, message) => (
            StatusCode::from_u16(status).unwrap(),
            Json(json!({ "message": message })),
        ),
    }
}

/// The storefront under test, with one visitor's cookie jar.
pub struct Storefront {
    app: Router,
    cookie: Option<String>,
}

/// A decoded storefront response.
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Storefront {
    /// Build a storefront talking to `menu_api`.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new(menu_api: &FakeMenuApi) -> Self {
        Self::with_cache_ttl(menu_api, MenuApiConfig::default().cache_ttl)
    }

    /// Build a storefront whose catalog cache expires after `cache_ttl`.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn with_cache_ttl(menu_api: &FakeMenuApi, cache_ttl: Duration) -> Self {
        let config = StorefrontConfig {
            menu_api: MenuApiConfig {
                base_url: Some(menu_api.base_url.parse().unwrap()),
                cache_ttl,
            },
            ..StorefrontConfig::default()
        };

        Self {
            app: routes::app(AppState::new(config).unwrap()),
            cookie: None,
        }
    }

    /// Another tab of the same visitor: same app, same session cookie.
    #[must_use]
    pub fn same_visitor(&self) -> Self {
        Self {
            app: self.app.clone(),
            cookie: self.cookie.clone(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> Reply {
        self.send("GET", uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> Reply {
        self.send("POST", uri, Some(body)).await
    }

    /// Send a request, keeping the session cookie.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body is not JSON.
    #[allow(clippy::unwrap_used)]
    pub async fn send(&mut self, method: &str, uri: &str, body: Option<Value>) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Reply { status, body }
    }
}

/// A checkout form that passes validation.
#[must_use]
pub fn valid_form() -> Value {
    json!({
        "name": "Ada Obi",
        "phone": "08012345678",
        "address": "12 Allen Avenue, Ikeja",
        "email": "ada@example.com"
    })
}
