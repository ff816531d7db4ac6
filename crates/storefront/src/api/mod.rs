//! Menu API collaborator.
//!
//! # Architecture
//!
//! - The menu API is the source of truth for categories, items and banners;
//!   nothing is persisted locally
//! - [`MenuApi`] is the seam used by the catalog loader and the checkout
//!   coordinator; [`MenuApiClient`] is the `reqwest` implementation
//! - Read endpoints are cached in memory via `moka` (5 minute TTL by default)
//! - Every response shape the API is known to send is normalized once, in
//!   [`wire`], into the types of [`crate::catalog`]
//!
//! # Endpoints
//!
//! | Operation        | Request               |
//! |------------------|-----------------------|
//! | Menu items       | `GET /product`        |
//! | Categories       | `GET /category`       |
//! | Banners          | `GET /banner`         |
//! | Initiate payment | `POST /order/checkout`|

mod cache;
mod client;
pub mod wire;

use std::future::Future;

pub use client::MenuApiClient;

use thiserror::Error;
use url::Url;

use crate::catalog::{Banner, Category, MenuItem};
use crate::checkout::OrderDraft;

/// Message shown when a payment request fails without an explanation.
pub const GENERIC_PAYMENT_FAILURE: &str = "Failed to process order. Please try again.";

/// Errors that can occur when talking to the menu API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Menu API returned {status}{}", .message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: u16,
        /// The `message` field of the error body, if the API sent one.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The body parsed but did not have a usable shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No base URL is configured.
    #[error("Menu API URL is not configured")]
    NotConfigured,
}

impl ApiError {
    /// Message to show a visitor whose payment request failed.
    ///
    /// Uses the API's own explanation when it sent one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => GENERIC_PAYMENT_FAILURE.to_string(),
        }
    }
}

/// Result of asking the menu API to start a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentInit {
    /// Hosted checkout page the visitor should be sent to.
    pub authorization_url: Option<Url>,
    /// Payment reference, when the API returns one.
    pub reference: Option<String>,
}

/// Operations the storefront needs from the menu API.
pub trait MenuApi: Send + Sync {
    /// List all menu items.
    fn menu_items(&self) -> impl Future<Output = Result<Vec<MenuItem>, ApiError>> + Send;

    /// List all categories with their subcategories.
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    /// List promotional banners.
    fn banners(&self) -> impl Future<Output = Result<Vec<Banner>, ApiError>> + Send;

    /// Submit an order draft to the payment endpoint.
    fn initiate_payment(
        &self,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<PaymentInit, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_api_message() {
        let err = ApiError::Status {
            status: 400,
            message: Some("Product out of stock".to_string()),
        };
        assert_eq!(err.user_message(), "Product out of stock");
        assert_eq!(err.to_string(), "Menu API returned 400: Product out of stock");
    }

    #[test]
    fn test_user_message_falls_back_to_generic() {
        let blank = ApiError::Status {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message(), GENERIC_PAYMENT_FAILURE);
        assert_eq!(ApiError::NotConfigured.user_message(), GENERIC_PAYMENT_FAILURE);
        assert_eq!(
            ApiError::Status {
                status: 502,
                message: None
            }
            .to_string(),
            "Menu API returned 502"
        );
    }
}
