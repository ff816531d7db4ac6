//! Per-visitor shop state.
//!
//! [`ShopSession`] owns everything one visitor can change: the cart, the
//! menu selection and the open/closed state of the cart and checkout views.
//! It is stored in the visitor's session record and loaded and saved around
//! every request.
//!
//! Completing an order schedules a reset a few seconds later. The reset is a
//! deadline stored in the state itself; [`ShopSession::settle`] applies it
//! when the next request arrives.

use chrono::{DateTime, TimeDelta, Utc};
use native_delight_core::MenuItemId;
use serde::{Deserialize, Serialize};

use crate::cart::CartLedger;
use crate::catalog::MenuItem;
use crate::selection::Selection;

/// Seconds between a completed order and the cart reset.
pub const RESET_DELAY_SECS: i64 = 3;

/// A reset scheduled by a completed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReset {
    pub due_at: DateTime<Utc>,
}

/// Everything one visitor can change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSession {
    cart: CartLedger,
    selection: Selection,
    cart_open: bool,
    payment_options_open: bool,
    checkout_open: bool,
    order_placed: bool,
    checkout_error: Option<String>,
    pending_reset: Option<PendingReset>,
}

impl ShopSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &CartLedger {
        &self.cart
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub const fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    #[must_use]
    pub const fn is_cart_open(&self) -> bool {
        self.cart_open
    }

    #[must_use]
    pub const fn is_payment_options_open(&self) -> bool {
        self.payment_options_open
    }

    #[must_use]
    pub const fn is_checkout_open(&self) -> bool {
        self.checkout_open
    }

    #[must_use]
    pub const fn is_order_placed(&self) -> bool {
        self.order_placed
    }

    #[must_use]
    pub fn checkout_error(&self) -> Option<&str> {
        self.checkout_error.as_deref()
    }

    #[must_use]
    pub const fn pending_reset(&self) -> Option<PendingReset> {
        self.pending_reset
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&mut self, item: &MenuItem) {
        self.cart.add(item);
        self.sync_cart_view();
    }

    pub fn update_quantity(&mut self, id: &MenuItemId, quantity: i64) {
        self.cart.update_quantity(id, quantity);
        self.sync_cart_view();
    }

    pub fn remove_from_cart(&mut self, id: &MenuItemId) {
        self.cart.remove(id);
        self.sync_cart_view();
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.sync_cart_view();
    }

    /// An empty cart cannot be shown, and neither can its checkout overlays.
    fn sync_cart_view(&mut self) {
        if self.cart.item_count() == 0 {
            self.close_cart();
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Show the cart. Ignored while the cart is empty.
    pub fn open_cart(&mut self) {
        self.cart_open = !self.cart.is_empty();
    }

    /// Hide the cart together with its checkout overlays.
    pub fn close_cart(&mut self) {
        self.cart_open = false;
        self.close_checkout();
    }

    /// Offer the payment options.
    ///
    /// Returns `false` (and changes nothing) if the cart is empty or an order
    /// has already been placed.
    pub fn place_order(&mut self) -> bool {
        if self.cart.is_empty() || self.order_placed {
            return false;
        }
        self.payment_options_open = true;
        self.checkout_error = None;
        true
    }

    /// Move from the payment options to the card checkout form.
    ///
    /// Returns `false` if the payment options are not open.
    pub fn choose_card_payment(&mut self) -> bool {
        if !self.payment_options_open {
            return false;
        }
        self.payment_options_open = false;
        self.checkout_open = true;
        true
    }

    pub fn close_checkout(&mut self) {
        self.payment_options_open = false;
        self.checkout_open = false;
        self.checkout_error = None;
    }

    /// Leave the cart and any committed selection for the category grid.
    pub fn back_to_category(&mut self) {
        self.close_cart();
        self.selection.back();
    }

    // =========================================================================
    // Order Lifecycle
    // =========================================================================

    /// Mark the order placed and schedule the cart reset.
    ///
    /// A reset scheduled earlier is replaced.
    pub fn order_completed(&mut self, now: DateTime<Utc>) {
        self.order_placed = true;
        self.checkout_error = None;
        self.pending_reset = Some(PendingReset {
            due_at: now + TimeDelta::seconds(RESET_DELAY_SECS),
        });
    }

    /// Apply a scheduled reset once it is due.
    ///
    /// Returns `true` if a reset was applied.
    pub fn settle(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending_reset {
            Some(reset) if reset.due_at <= now => {
                self.pending_reset = None;
                self.cart.clear();
                self.order_placed = false;
                self.close_cart();
                true
            }
            _ => false,
        }
    }

    pub fn cancel_pending_reset(&mut self) {
        self.pending_reset = None;
    }

    /// Record a failed payment so the visitor can try again.
    pub fn payment_failed(&mut self, message: impl Into<String>) {
        self.order_placed = false;
        self.checkout_error = Some(message.into());
    }
}
