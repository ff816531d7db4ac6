//! Wire shapes of the menu API and their normalization.
//!
//! The API is loosely typed: lists come bare or wrapped in an envelope, ids
//! are `_id` or `id`, references are plain names or objects, images are a
//! URL string or `{ url }`. Everything is accepted here and converted into
//! the canonical types of [`crate::catalog`]; nothing outside this module
//! looks at raw JSON.
//!
//! Records are decoded one at a time, so a single malformed record is logged
//! and dropped without losing the rest of the list.

use native_delight_core::{Price, Status};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::{ApiError, PaymentInit};
use crate::catalog::{
    Banner, Category, CategoryRef, ImageRef, MenuItem, Subcategory, SubcategoryRef,
};

// =============================================================================
// Raw Shapes
// =============================================================================

/// A list endpoint body: a bare array or an object envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<Value>),
    Envelope(serde_json::Map<String, Value>),
}

/// Either a plain name or an object carrying an id and/or a name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRef {
    Name(String),
    Object {
        #[serde(rename = "_id", alias = "id", default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        /// Items sometimes nest their subcategory inside the category object.
        #[serde(default, alias = "subCategory")]
        subcategory: Option<Box<Self>>,
    },
}

impl RawRef {
    fn id(&self) -> Option<&str> {
        match self {
            Self::Name(_) => None,
            Self::Object { id, .. } => id.as_deref().filter(|id| !id.trim().is_empty()),
        }
    }

    fn name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name.as_str()),
            Self::Object { name, .. } => name.as_deref(),
        }
    }

    fn nested_subcategory(&self) -> Option<&Self> {
        match self {
            Self::Name(_) => None,
            Self::Object { subcategory, .. } => subcategory.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawImage {
    Url(String),
    Object {
        #[serde(alias = "secure_url")]
        url: String,
    },
}

impl RawImage {
    fn into_image(self) -> Option<ImageRef> {
        let url = match self {
            Self::Url(url) | Self::Object { url } => url,
        };
        let url = url.trim();
        (!url.is_empty()).then(|| ImageRef {
            url: url.to_string(),
        })
    }
}

/// Free-text stock label; some records send a count instead.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStock {
    Label(String),
    Count(i64),
}

impl RawStock {
    fn into_label(self) -> String {
        match self {
            Self::Label(label) => label,
            Self::Count(count) => count.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawMenuItem {
    #[serde(rename = "_id", alias = "id", default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    #[serde(default)]
    category: Option<RawRef>,
    #[serde(default, alias = "subCategory", alias = "subcategory")]
    sub_category: Option<RawRef>,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    stock: Option<RawStock>,
    #[serde(default)]
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    image: Option<RawImage>,
    #[serde(default)]
    subcategories: Vec<RawSubcategory>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSubcategory {
    Name(String),
    Object {
        #[serde(rename = "_id", alias = "id", default)]
        id: Option<String>,
        name: String,
        #[serde(default)]
        items: Option<Vec<RawIdRef>>,
    },
}

/// An item reference inside a subcategory: a bare id or a populated record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawIdRef {
    Id(String),
    Object {
        #[serde(rename = "_id", alias = "id")]
        id: String,
    },
}

impl RawIdRef {
    fn into_id(self) -> String {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawBanner {
    #[serde(rename = "_id", alias = "id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    image: RawImage,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPaymentResponse {
    #[serde(default)]
    data: Option<RawPaymentData>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPaymentData {
    #[serde(default)]
    authorization_url: Option<String>,
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// =============================================================================
// Normalization
// =============================================================================

/// Normalize a `GET /product` body.
///
/// # Errors
///
/// Returns [`ApiError::InvalidResponse`] if the body is neither a list nor an
/// object envelope.
pub fn menu_items(body: Value) -> Result<Vec<MenuItem>, ApiError> {
    Ok(records::<RawMenuItem>(body, &["products"])?
        .into_iter()
        .filter_map(menu_item)
        .collect())
}

/// Normalize a `GET /category` body.
///
/// # Errors
///
/// Returns [`ApiError::InvalidResponse`] if the body is neither a list nor an
/// object envelope.
pub fn categories(body: Value) -> Result<Vec<Category>, ApiError> {
    Ok(records::<RawCategory>(body, &["categories"])?
        .into_iter()
        .map(category)
        .collect())
}

/// Normalize a `GET /banner` body.
///
/// # Errors
///
/// Returns [`ApiError::InvalidResponse`] if the body is neither a list nor an
/// object envelope.
pub fn banners(body: Value) -> Result<Vec<Banner>, ApiError> {
    Ok(records::<RawBanner>(body, &["banner", "banners"])?
        .into_iter()
        .filter_map(banner)
        .collect())
}

/// Normalize a `POST /order/checkout` body.
///
/// An empty or `data`-less body is a valid answer without a redirect.
///
/// # Errors
///
/// Returns [`ApiError::InvalidResponse`] if the authorization URL is present
/// but is not an absolute URL.
pub fn payment(body: Value) -> Result<PaymentInit, ApiError> {
    let raw: RawPaymentResponse = if body.is_null() {
        RawPaymentResponse::default()
    } else {
        serde_json::from_value(body)?
    };

    let data = raw.data.unwrap_or_default();
    let authorization_url = data
        .authorization_url
        .filter(|url| !url.trim().is_empty())
        .map(|url| {
            Url::parse(url.trim()).map_err(|e| {
                ApiError::InvalidResponse(format!("authorization_url '{url}': {e}"))
            })
        })
        .transpose()?;

    Ok(PaymentInit {
        authorization_url,
        reference: data.reference,
    })
}

/// Extract the explanation from an error body, if there is one.
#[must_use]
pub fn error_message(body: &str) -> Option<String> {
    let raw: RawErrorBody = serde_json::from_str(body).ok()?;
    raw.message
        .or(raw.error)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

/// Pull the record list out of a list body and decode each record.
fn records<T: DeserializeOwned>(body: Value, keys: &[&str]) -> Result<Vec<T>, ApiError> {
    let values = match serde_json::from_value::<ListBody>(body)? {
        ListBody::Bare(values) => values,
        ListBody::Envelope(mut envelope) => {
            if envelope.get("success").and_then(Value::as_bool) == Some(false) {
                tracing::warn!(
                    message = ?envelope.get("message"),
                    "Menu API envelope reported failure, treating as empty"
                );
                return Ok(Vec::new());
            }

            match keys.iter().find_map(|key| envelope.remove(*key)) {
                Some(Value::Array(values)) => values,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(ApiError::InvalidResponse(format!(
                        "expected a list under {keys:?}, got {}",
                        json_kind(&other)
                    )));
                }
            }
        }
    };

    Ok(values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed menu API record");
                None
            }
        })
        .collect())
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

fn menu_item(raw: RawMenuItem) -> Option<MenuItem> {
    let Some(id) = raw.id.filter(|id| !id.trim().is_empty()) else {
        tracing::warn!(name = %raw.name, "Dropping menu item without an id");
        return None;
    };

    let price = match Price::new(raw.price) {
        Ok(price) => price,
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "Dropping menu item with invalid price");
            return None;
        }
    };

    // The subcategory may sit beside the category or nested inside it.
    let sub_category = raw
        .sub_category
        .as_ref()
        .or_else(|| raw.category.as_ref().and_then(RawRef::nested_subcategory))
        .and_then(|reference| {
            reference.name().map(|name| SubcategoryRef {
                id: reference.id().map(Into::into),
                name: name.to_string(),
            })
        });

    let category = raw.category.as_ref().and_then(|reference| {
        reference.name().map(|name| CategoryRef {
            id: reference.id().map(Into::into),
            name: name.to_string(),
        })
    });

    Some(MenuItem {
        id: id.into(),
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        price,
        category,
        sub_category,
        status: raw.status.unwrap_or_default(),
        stock: raw.stock.map(RawStock::into_label).unwrap_or_default(),
        image: raw.image.and_then(RawImage::into_image).map(|image| image.url),
    })
}

fn category(raw: RawCategory) -> Category {
    let subcategories = raw
        .subcategories
        .into_iter()
        .map(|sub| match sub {
            // A bare name doubles as the identifier.
            RawSubcategory::Name(name) => Subcategory {
                id: name.as_str().into(),
                name,
                category_name: raw.name.clone(),
                items: None,
            },
            RawSubcategory::Object { id, name, items } => Subcategory {
                id: id
                    .filter(|id| !id.trim().is_empty())
                    .unwrap_or_else(|| name.clone())
                    .into(),
                name,
                category_name: raw.name.clone(),
                items: items.map(|items| {
                    items
                        .into_iter()
                        .map(|item| item.into_id().into())
                        .collect()
                }),
            },
        })
        .collect();

    Category {
        id: raw.id.into(),
        name: raw.name,
        description: raw.description.unwrap_or_default(),
        status: raw.status.unwrap_or_default(),
        image: raw.image.and_then(RawImage::into_image),
        subcategories,
    }
}

fn banner(raw: RawBanner) -> Option<Banner> {
    let Some(image) = raw.image.into_image() else {
        tracing::warn!(id = %raw.id, "Dropping banner without an image");
        return None;
    };

    Some(Banner {
        id: raw.id.into(),
        title: raw.title.filter(|title| !title.trim().is_empty()),
        image,
        link: raw.link.filter(|link| !link.trim().is_empty()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_menu_items_accepts_envelope_and_bare_list() {
        let record = json!({
            "_id": "p1",
            "name": "Jollof Rice",
            "price": 2500,
            "category": { "name": "Rice", "subcategory": "Party" },
            "status": "active",
            "stock": "In stock",
            "image": "https://cdn.example/jollof.jpg"
        });

        let wrapped = menu_items(json!({ "success": true, "products": [record.clone()] })).unwrap();
        let plain = menu_items(json!({ "products": [record.clone()] })).unwrap();
        let bare = menu_items(json!([record])).unwrap();

        assert_eq!(wrapped, plain);
        assert_eq!(wrapped, bare);

        let item = &wrapped[0];
        assert_eq!(item.id.as_str(), "p1");
        assert_eq!(item.price.to_string(), "N2500.00");
        assert_eq!(item.category_name(), Some("Rice"));
        assert_eq!(item.subcategory_name(), Some("Party"));
        assert_eq!(item.image.as_deref(), Some("https://cdn.example/jollof.jpg"));
        assert!(item.is_orderable());
    }

    #[test]
    fn test_failed_envelope_is_empty() {
        let items = menu_items(json!({ "success": false, "message": "db down" })).unwrap();
        assert!(items.is_empty());

        let categories = categories(json!({ "success": false })).unwrap();
        assert!(categories.is_empty());
    }

    #[test]
    fn test_invalid_records_are_dropped() {
        let items = menu_items(json!([
            { "_id": "ok", "name": "Egusi", "price": "1800.50" },
            { "name": "No id", "price": 100 },
            { "_id": "neg", "name": "Refund", "price": -5 },
            { "_id": "noprice", "name": "Free?" },
        ]))
        .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), "ok");
        assert_eq!(items[0].price.to_string(), "N1800.50");
    }

    #[test]
    fn test_unknown_status_is_inactive() {
        let items = menu_items(json!([
            { "id": "p2", "name": "Suya", "price": 1000, "status": "archived", "stock": 0 }
        ]))
        .unwrap();

        assert_eq!(items[0].status, Status::Inactive);
        assert_eq!(items[0].stock, "0");
        assert!(!items[0].is_orderable());
    }

    #[test]
    fn test_item_without_status_is_not_orderable() {
        let items = menu_items(json!([{ "_id": "p", "name": "Puff Puff", "price": 10 }])).unwrap();

        assert_eq!(items[0].status, Status::Inactive);
        assert!(!items[0].is_orderable());
    }

    #[test]
    fn test_item_references_with_ids() {
        let items = menu_items(json!([{
            "_id": "p3",
            "name": "Fried Rice",
            "price": 3000,
            "category": { "_id": "c1", "name": "Rice" },
            "subCategory": { "_id": "s1", "name": "Fried" }
        }]))
        .unwrap();

        let sub = items[0].sub_category.as_ref().unwrap();
        assert_eq!(sub.id.as_ref().map(|id| id.as_str()), Some("s1"));
        assert_eq!(sub.name, "Fried");
        assert_eq!(
            items[0].category.as_ref().and_then(|c| c.id.as_ref()).map(|id| id.as_str()),
            Some("c1")
        );
    }

    #[test]
    fn test_categories_normalize_images_and_subcategories() {
        let categories = categories(json!({
            "categories": [
                {
                    "_id": "c1",
                    "name": "Rice",
                    "status": "Active",
                    "image": { "url": "https://cdn.example/rice.jpg" },
                    "subcategoryCount": 99,
                    "subcategories": [
                        { "_id": "s1", "name": "Jollof", "items": ["p1", { "_id": "p2" }] },
                        "Fried"
                    ]
                },
                { "_id": "c2", "name": "Soups", "image": "https://cdn.example/soup.jpg" }
            ]
        }))
        .unwrap();

        assert_eq!(categories.len(), 2);
        let rice = &categories[0];
        assert_eq!(rice.image.as_ref().unwrap().url, "https://cdn.example/rice.jpg");
        assert_eq!(rice.subcategory_count(), 2);
        assert_eq!(rice.subcategories[0].category_name, "Rice");
        assert_eq!(
            rice.subcategories[0].items.as_ref().unwrap().len(),
            2
        );
        assert_eq!(rice.subcategories[1].id.as_str(), "Fried");
        assert!(rice.subcategories[1].items.is_none());

        assert_eq!(
            categories[1].image.as_ref().unwrap().url,
            "https://cdn.example/soup.jpg"
        );
        assert!(categories[1].subcategories.is_empty());
    }

    #[test]
    fn test_banners() {
        let banners = banners(json!({
            "banner": [
                { "_id": "b1", "title": "Weekend deal", "image": { "url": "https://cdn.example/b1.jpg" } },
                { "_id": "b2", "image": "" },
            ]
        }))
        .unwrap();

        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].title.as_deref(), Some("Weekend deal"));
        assert!(banners[0].link.is_none());
    }

    #[test]
    fn test_non_list_body_is_invalid() {
        assert!(matches!(
            menu_items(json!("nope")),
            Err(ApiError::Parse(_))
        ));
        assert!(matches!(
            menu_items(json!({ "products": "nope" })),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_payment_with_redirect() {
        let init = payment(json!({
            "status": true,
            "data": {
                "authorization_url": "https://checkout.paystack.com/abc",
                "reference": "ref-1"
            }
        }))
        .unwrap();

        assert_eq!(
            init.authorization_url.unwrap().as_str(),
            "https://checkout.paystack.com/abc"
        );
        assert_eq!(init.reference.as_deref(), Some("ref-1"));
    }

    #[test]
    fn test_payment_without_redirect() {
        assert_eq!(payment(json!({})).unwrap(), PaymentInit::default());
        assert_eq!(payment(Value::Null).unwrap(), PaymentInit::default());
        assert_eq!(
            payment(json!({ "data": { "authorization_url": "" } })).unwrap(),
            PaymentInit::default()
        );
    }

    #[test]
    fn test_payment_rejects_relative_url() {
        assert!(matches!(
            payment(json!({ "data": { "authorization_url": "/pay/abc" } })),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"message":"Insufficient stock"}"#).as_deref(),
            Some("Insufficient stock")
        );
        assert_eq!(
            error_message(r#"{"error":"Bad request"}"#).as_deref(),
            Some("Bad request")
        );
        assert_eq!(error_message(r#"{"message":""}"#), None);
        assert_eq!(error_message("<html>502</html>"), None);
    }
}
