//! `reqwest` implementation of [`MenuApi`].
//!
//! Caches the three read endpoints using `moka` and keeps the last good
//! copy of each for when a refresh fails; payment requests are never cached.

use std::sync::Arc;

use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::cache::{CacheKey, CacheValue, Cached};
use super::{ApiError, MenuApi, PaymentInit, wire};
use crate::catalog::{Banner, Category, MenuItem};
use crate::checkout::OrderDraft;
use crate::config::MenuApiConfig;

/// Client for the menu API.
///
/// Cheap to clone; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct MenuApiClient {
    inner: Arc<MenuApiClientInner>,
}

struct MenuApiClientInner {
    client: reqwest::Client,
    /// Base URL without a trailing slash; `None` when not configured.
    base_url: Option<String>,
    cache: Cache<CacheKey, CacheValue>,
    /// Last successful response per endpoint; never expires.
    last_good: Cache<CacheKey, CacheValue>,
}

impl MenuApiClient {
    /// Create a new menu API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MenuApiConfig) -> Result<Self, ApiError> {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.cache_ttl)
            .build();

        let client = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            inner: Arc::new(MenuApiClientInner {
                client,
                base_url: config
                    .base_url
                    .as_ref()
                    .map(|url| url.as_str().trim_end_matches('/').to_string()),
                cache,
                last_good: Cache::new(3),
            }),
        })
    }

    /// Whether a base URL is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.base_url.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<String, ApiError> {
        self.inner
            .base_url
            .as_ref()
            .map(|base| format!("{base}{path}"))
            .ok_or(ApiError::NotConfigured)
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        let response = self.inner.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    /// Fetch a list endpoint through the cache.
    ///
    /// A failed refresh falls back to the last list that loaded successfully,
    /// so a catalog that was populated once never turns empty.
    async fn cached_list<T: Cached>(
        &self,
        path: &str,
        normalize: fn(Value) -> Result<Vec<T>, ApiError>,
    ) -> Result<Vec<T>, ApiError> {
        if let Some(records) = self.inner.cache.get(&T::KEY).await.and_then(T::from_cached) {
            debug!(key = ?T::KEY, "Cache hit");
            return Ok(records);
        }

        match self.get_json(path).await.and_then(normalize) {
            Ok(records) => {
                self.inner
                    .cache
                    .insert(T::KEY, T::cached(records.clone()))
                    .await;
                self.inner
                    .last_good
                    .insert(T::KEY, T::cached(records.clone()))
                    .await;
                Ok(records)
            }
            Err(e) => {
                let fallback = self.inner.last_good.get(&T::KEY).await;
                match fallback.and_then(T::from_cached) {
                    Some(records) => {
                        warn!(
                            error = %e,
                            key = ?T::KEY,
                            "Menu API refresh failed, serving last good copy"
                        );
                        Ok(records)
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Check the status and parse the body of a response.
    ///
    /// An empty success body reads as JSON `null`.
    async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Menu API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: wire::error_message(&response_text),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse menu API response"
            );
            ApiError::Parse(e)
        })
    }
}

impl MenuApi for MenuApiClient {
    #[instrument(skip(self))]
    async fn menu_items(&self) -> Result<Vec<MenuItem>, ApiError> {
        self.cached_list("/product", wire::menu_items).await
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.cached_list("/category", wire::categories).await
    }

    #[instrument(skip(self))]
    async fn banners(&self) -> Result<Vec<Banner>, ApiError> {
        self.cached_list("/banner", wire::banners).await
    }

    #[instrument(skip(self, draft), fields(lines = draft.items.len(), amount = %draft.amount))]
    async fn initiate_payment(&self, draft: &OrderDraft) -> Result<PaymentInit, ApiError> {
        let url = self.endpoint("/order/checkout")?;

        let response = self.inner.client.post(&url).json(draft).send().await?;
        let init = wire::payment(Self::read_json(response).await?)?;

        debug!(
            redirect = init.authorization_url.is_some(),
            reference = ?init.reference,
            "Payment initiated"
        );

        Ok(init)
    }
}
