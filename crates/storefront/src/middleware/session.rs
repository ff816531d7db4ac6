//! Session middleware configuration.
//!
//! Visitor state lives in an in-memory store; it does not survive a restart.
//! Requests carrying the same session cookie run one at a time, from before
//! the session record is loaded until after it is stored again.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_sessions::cookie::Cookie;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "delight_session";

/// Session expiry time in seconds (1 day).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Idle locks are dropped after the session itself would have expired.
const LOCK_IDLE: Duration = Duration::from_secs(24 * 60 * 60);

/// Create the session layer backed by a [`MemoryStore`].
///
/// The cookie is marked `Secure` when the public URL is HTTPS.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// One lock per session cookie value.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl SessionLocks {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder().time_to_idle(LOCK_IDLE).build(),
        }
    }

    /// The lock for `session`, created on first use.
    pub async fn lock_for(&self, session: &str) -> Arc<Mutex<()>> {
        self.locks
            .get_with(session.to_owned(), async { Arc::new(Mutex::new(())) })
            .await
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

/// Middleware that runs requests of one visitor one after another.
///
/// Must sit outside the session layer, which stores the record after the
/// handler returns. Requests without a session cookie start a fresh session
/// and are not held back.
pub async fn serialize_visitor_requests(
    State(locks): State<SessionLocks>,
    request: Request,
    next: Next,
) -> Response {
    let Some(session) = session_cookie(request.headers()) else {
        return next.run(request).await;
    };

    let lock = locks.lock_for(&session).await;
    let _guard = lock.lock().await;
    next.run(request).await
}

/// The session cookie value, if the request carries one.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
}
