//! Menu API client against a live (fake) HTTP server.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use native_delight_core::{MenuItemId, Status};
use native_delight_integration_tests::{FakeMenuApi, PaymentBehavior};
use native_delight_storefront::api::{ApiError, MenuApi, MenuApiClient};
use native_delight_storefront::checkout::{OrderDraft, OrderLine};
use native_delight_storefront::config::MenuApiConfig;
use serde_json::json;

fn client_for(api: &FakeMenuApi) -> MenuApiClient {
    MenuApiClient::new(&MenuApiConfig {
        base_url: Some(api.base_url.parse().unwrap()),
        ..MenuApiConfig::default()
    })
    .unwrap()
}

fn draft() -> OrderDraft {
    OrderDraft {
        items: vec![OrderLine {
            product_id: MenuItemId::new("p-jollof"),
            quantity: 1,
        }],
        email: "ada@example.com".to_string(),
        phone: "08012345678".to_string(),
        amount: 1000.into(),
        address: "12 Allen Avenue".to_string(),
    }
}

#[tokio::test]
async fn test_menu_items_are_normalized() {
    let api = FakeMenuApi::start(PaymentBehavior::Confirm).await;
    let client = client_for(&api);

    let items = client.menu_items().await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].category_name(), Some("Rice"));
    assert_eq!(items[0].subcategory_name(), Some("Jollof"));
    assert_eq!(items[2].category_name(), Some("Soups"));
    assert_eq!(items[2].status, Status::Inactive);
}

#[tokio::test]
async fn test_bare_list_bodies_are_accepted() {
    let api = FakeMenuApi::start_with(
        json!([{ "_id": "p1", "name": "Moi Moi", "price": 800 }]),
        json!([{ "_id": "c1", "name": "Sides" }]),
        json!([{ "_id": "b1", "image": "https://cdn.example/b.jpg" }]),
        PaymentBehavior::Confirm,
    )
    .await;
    let client = client_for(&api);

    assert_eq!(client.menu_items().await.unwrap().len(), 1);
    assert_eq!(client.categories().await.unwrap()[0].name, "Sides");
    assert_eq!(
        client.banners().await.unwrap()[0].image.url,
        "https://cdn.example/b.jpg"
    );
}

#[tokio::test]
async fn test_payment_redirect_is_parsed() {
    let api =
        FakeMenuApi::start(PaymentBehavior::Redirect("https://pay.example/xyz".to_string())).await;
    let client = client_for(&api);

    let init = client.initiate_payment(&draft()).await.unwrap();

    assert_eq!(
        init.authorization_url.unwrap().as_str(),
        "https://pay.example/xyz"
    );
    assert_eq!(init.reference.as_deref(), Some("ref-123"));
    assert_eq!(api.orders()[0]["items"][0]["quantity"], 1);
}

#[tokio::test]
async fn test_payment_failure_carries_api_message() {
    let api = FakeMenuApi::start(PaymentBehavior::Fail(400, "Invalid email".to_string())).await;
    let client = client_for(&api);

    let err = client.initiate_payment(&draft()).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 400, .. }));
    assert_eq!(err.user_message(), "Invalid email");
}

#[tokio::test]
async fn test_unconfigured_client_fails_every_call() {
    let client = MenuApiClient::new(&MenuApiConfig::default()).unwrap();

    assert!(matches!(
        client.menu_items().await,
        Err(ApiError::NotConfigured)
    ));
    assert!(matches!(
        client.initiate_payment(&draft()).await,
        Err(ApiError::NotConfigured)
    ));
}
