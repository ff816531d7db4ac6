//! Checkout coordinator: form validation, order draft, payment handoff.

use native_delight_core::{Email, MenuItemId, PhoneNumber};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::api::MenuApi;
use crate::cart::{CartLedger, CartSnapshot};

/// Reasons a checkout attempt is refused.
///
/// The display text is shown to the visitor as-is.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("Please enter a valid Nigerian phone number.")]
    InvalidPhone,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    /// The payment request failed; carries the message for the visitor.
    #[error("{0}")]
    Payment(String),
}

/// The checkout form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
}

/// Contact details that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub email: Email,
}

impl CheckoutForm {
    /// Validate the form. The first failing rule decides the error.
    ///
    /// Blank fields count as missing. Phone and email are checked exactly as
    /// typed, so surrounding whitespace fails their pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::MissingFields`], [`CheckoutError::InvalidPhone`]
    /// or [`CheckoutError::InvalidEmail`], checked in that order.
    pub fn validate(&self) -> Result<ContactDetails, CheckoutError> {
        let name = self.name.trim();
        let address = self.address.trim();

        if [name, self.phone.trim(), address, self.email.trim()]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(CheckoutError::MissingFields);
        }

        let phone = PhoneNumber::parse(&self.phone).map_err(|_| CheckoutError::InvalidPhone)?;
        let email = Email::parse(&self.email).map_err(|_| CheckoutError::InvalidEmail)?;

        Ok(ContactDetails {
            name: name.to_string(),
            phone,
            address: address.to_string(),
            email,
        })
    }
}

/// One order line as the payment endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: MenuItemId,
    pub quantity: u32,
}

/// Body of `POST /order/checkout`.
///
/// The customer's name is used for validation only and is not sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub email: String,
    pub phone: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub address: String,
}

impl OrderDraft {
    /// Build a draft from the cart as it is now.
    #[must_use]
    pub fn new(cart: &CartSnapshot, contact: &ContactDetails) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| OrderLine {
                    product_id: line.item.id.clone(),
                    quantity: line.quantity,
                })
                .collect(),
            email: contact.email.as_str().to_string(),
            phone: contact.phone.as_str().to_string(),
            amount: cart.total().amount(),
            address: contact.address.clone(),
        }
    }
}

/// How a successful submission continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Send the visitor to the hosted payment page. The cart is kept.
    Redirect(Url),
    /// The order was accepted without a payment page.
    Confirmed,
}

/// Runs a checkout against a [`MenuApi`].
pub struct CheckoutCoordinator<'a, A> {
    api: &'a A,
}

impl<'a, A: MenuApi> CheckoutCoordinator<'a, A> {
    #[must_use]
    pub const fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Validate the cart and form and build the order draft.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure; see [`CheckoutForm::validate`].
    pub fn prepare(cart: &CartLedger, form: &CheckoutForm) -> Result<OrderDraft, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let contact = form.validate()?;
        Ok(OrderDraft::new(&cart.snapshot(), &contact))
    }

    /// Validate and submit an order.
    ///
    /// Nothing is sent when validation fails.
    ///
    /// # Errors
    ///
    /// Returns a validation error, or [`CheckoutError::Payment`] if the
    /// payment request fails.
    #[instrument(skip_all, fields(lines = cart.lines().len()))]
    pub async fn submit(
        &self,
        cart: &CartLedger,
        form: &CheckoutForm,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let draft = Self::prepare(cart, form)?;

        match self.api.initiate_payment(&draft).await {
            Ok(init) => match init.authorization_url {
                Some(url) => {
                    tracing::info!(amount = %draft.amount, "Redirecting to payment page");
                    Ok(CheckoutOutcome::Redirect(url))
                }
                None => {
                    tracing::info!(amount = %draft.amount, "Order confirmed without redirect");
                    Ok(CheckoutOutcome::Confirmed)
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Payment initiation failed");
                Err(CheckoutError::Payment(e.user_message()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::api::{ApiError, GENERIC_PAYMENT_FAILURE, PaymentInit};
    use crate::catalog::fixtures::item;
    use crate::catalog::{Banner, Category, MenuItem};

    /// Records the drafts it receives and answers with a fixed result.
    struct FakePayments {
        answer: fn() -> Result<PaymentInit, ApiError>,
        received: Mutex<Vec<OrderDraft>>,
    }

    impl FakePayments {
        fn new(answer: fn() -> Result<PaymentInit, ApiError>) -> Self {
            Self {
                answer,
                received: Mutex::new(Vec::new()),
            }
        }
    }

    impl MenuApi for FakePayments {
        async fn menu_items(&self) -> Result<Vec<MenuItem>, ApiError> {
            Ok(Vec::new())
        }

        async fn categories(&self) -> Result<Vec<Category>, ApiError> {
            Ok(Vec::new())
        }

        async fn banners(&self) -> Result<Vec<Banner>, ApiError> {
            Ok(Vec::new())
        }

        async fn initiate_payment(&self, draft: &OrderDraft) -> Result<PaymentInit, ApiError> {
            self.received.lock().unwrap().push(draft.clone());
            (self.answer)()
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Ada".to_string(),
            phone: "08012345678".to_string(),
            address: "12 Allen Avenue, Ikeja".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    fn cart_with_two() -> CartLedger {
        let mut cart = CartLedger::new();
        let rice = item("i-1", 1000, "Rice", ("s-jollof", "Jollof"));
        cart.add(&rice);
        cart.add(&rice);
        cart
    }

    #[test]
    fn test_empty_name_fails_first() {
        let form = CheckoutForm {
            name: "   ".to_string(),
            phone: "bad".to_string(),
            ..form()
        };
        assert_eq!(form.validate(), Err(CheckoutError::MissingFields));
        assert_eq!(
            CheckoutError::MissingFields.to_string(),
            "Please fill in all fields."
        );
    }

    #[test]
    fn test_phone_rules() {
        for phone in ["07099999999", "+2348199999999"] {
            let form = CheckoutForm {
                phone: phone.to_string(),
                ..form()
            };
            assert!(form.validate().is_ok(), "{phone} should be accepted");
        }

        let form = CheckoutForm {
            phone: "0912345678".to_string(),
            ..form()
        };
        assert_eq!(form.validate(), Err(CheckoutError::InvalidPhone));
    }

    #[test]
    fn test_padded_phone_and_email_are_rejected() {
        let form = CheckoutForm {
            phone: " 08012345678".to_string(),
            ..form()
        };
        assert_eq!(form.validate(), Err(CheckoutError::InvalidPhone));

        let form = CheckoutForm {
            email: "ada@example.com ".to_string(),
            ..self::form()
        };
        assert_eq!(form.validate(), Err(CheckoutError::InvalidEmail));
    }

    #[test]
    fn test_phone_checked_before_email() {
        let form = CheckoutForm {
            phone: "123".to_string(),
            email: "not-an-email".to_string(),
            ..form()
        };
        assert_eq!(form.validate(), Err(CheckoutError::InvalidPhone));
    }

    #[test]
    fn test_invalid_email() {
        let form = CheckoutForm {
            email: "ada@example".to_string(),
            ..form()
        };
        assert_eq!(form.validate(), Err(CheckoutError::InvalidEmail));
    }

    #[test]
    fn test_empty_cart_is_refused() {
        let result = CheckoutCoordinator::<FakePayments>::prepare(&CartLedger::new(), &form());
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_draft_amount_and_shape() {
        let draft = CheckoutCoordinator::<FakePayments>::prepare(&cart_with_two(), &form()).unwrap();

        assert_eq!(draft.amount, Decimal::from(2000));
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            serde_json::json!({
                "items": [{ "productId": "i-1", "quantity": 2 }],
                "email": "ada@example.com",
                "phone": "08012345678",
                "amount": 2000.0,
                "address": "12 Allen Avenue, Ikeja"
            })
        );
    }

    #[tokio::test]
    async fn test_submit_redirect() {
        let api = FakePayments::new(|| {
            Ok(PaymentInit {
                authorization_url: Some("https://checkout.paystack.com/xyz".parse().unwrap()),
                reference: None,
            })
        });
        let cart = cart_with_two();

        let outcome = CheckoutCoordinator::new(&api)
            .submit(&cart, &form())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CheckoutOutcome::Redirect("https://checkout.paystack.com/xyz".parse().unwrap())
        );
        assert_eq!(api.received.lock().unwrap().len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_submit_without_url_confirms() {
        let api = FakePayments::new(|| Ok(PaymentInit::default()));

        let outcome = CheckoutCoordinator::new(&api)
            .submit(&cart_with_two(), &form())
            .await
            .unwrap();

        assert_eq!(outcome, CheckoutOutcome::Confirmed);
    }

    #[tokio::test]
    async fn test_submit_failure_messages() {
        let api = FakePayments::new(|| {
            Err(ApiError::Status {
                status: 400,
                message: Some("Item unavailable".to_string()),
            })
        });
        let result = CheckoutCoordinator::new(&api)
            .submit(&cart_with_two(), &form())
            .await;
        assert_eq!(
            result,
            Err(CheckoutError::Payment("Item unavailable".to_string()))
        );

        let api = FakePayments::new(|| Err(ApiError::NotConfigured));
        let result = CheckoutCoordinator::new(&api)
            .submit(&cart_with_two(), &form())
            .await;
        assert_eq!(
            result,
            Err(CheckoutError::Payment(GENERIC_PAYMENT_FAILURE.to_string()))
        );
    }

    #[tokio::test]
    async fn test_invalid_form_never_submits() {
        let api = FakePayments::new(|| Ok(PaymentInit::default()));
        let bad = CheckoutForm {
            email: String::new(),
            ..form()
        };

        let result = CheckoutCoordinator::new(&api)
            .submit(&cart_with_two(), &bad)
            .await;

        assert_eq!(result, Err(CheckoutError::MissingFields));
        assert!(api.received.lock().unwrap().is_empty());
    }
}
