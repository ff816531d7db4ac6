//! Application state shared across handlers.

use std::sync::Arc;

use crate::api::{ApiError, MenuApiClient};
use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::middleware::SessionLocks;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the menu API client and the per-visitor request locks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    menu_api: MenuApiClient,
    session_locks: SessionLocks,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the menu API client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let menu_api = MenuApiClient::new(&config.menu_api)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                menu_api,
                session_locks: SessionLocks::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the menu API client.
    #[must_use]
    pub fn menu_api(&self) -> &MenuApiClient {
        &self.inner.menu_api
    }

    /// Locks that serialize requests of one visitor.
    #[must_use]
    pub fn session_locks(&self) -> &SessionLocks {
        &self.inner.session_locks
    }

    /// Load the catalog for the current request.
    ///
    /// Served from the client's cache while it is fresh, and from the last
    /// good copy when a refresh fails.
    pub async fn catalog(&self) -> Catalog {
        Catalog::load(self.menu_api()).await
    }
}
