//! WhatsApp order handoff.
//!
//! Builds a plain-text order summary and a `wa.me` deep link carrying it.
//! This path does not go through the payment endpoint.

use std::fmt::Write as _;

use crate::cart::CartSnapshot;

/// Plain-text order summary.
///
/// ```text
/// Order Details:
/// Jollof Rice (Qty: 2) - N5000.00
/// Total: N5000.00
/// Please confirm my order.
/// ```
#[must_use]
pub fn order_summary(cart: &CartSnapshot) -> String {
    let mut text = String::from("Order Details:\n");
    for line in cart.lines() {
        let _ = writeln!(
            text,
            "{} (Qty: {}) - {}",
            line.item.name,
            line.quantity,
            line.line_total()
        );
    }
    let _ = write!(text, "Total: {}\nPlease confirm my order.", cart.total());
    text
}

/// Deep link that opens a chat with `number` prefilled with the summary.
#[must_use]
pub fn order_link(number: &str, cart: &CartSnapshot) -> String {
    format!(
        "https://wa.me/{number}?text={}",
        urlencoding::encode(&order_summary(cart))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLedger;
    use crate::catalog::fixtures::item;

    fn cart() -> CartLedger {
        let mut cart = CartLedger::new();
        let rice = item("i-1", 2500, "Rice", ("s-jollof", "Jollof"));
        let soup = item("i-3", 1800, "Soups", ("s-egusi", "Egusi"));
        cart.add(&rice);
        cart.add(&rice);
        cart.add(&soup);
        cart
    }

    #[test]
    fn test_order_summary() {
        assert_eq!(
            order_summary(&cart().snapshot()),
            "Order Details:\n\
             Item i-1 (Qty: 2) - N5000.00\n\
             Item i-3 (Qty: 1) - N1800.00\n\
             Total: N6800.00\n\
             Please confirm my order."
        );
    }

    #[test]
    fn test_order_link_encodes_text() {
        let link = order_link("2348142809371", &cart().snapshot());

        assert!(link.starts_with("https://wa.me/2348142809371?text=Order%20Details%3A%0AItem%20i-1"));
        assert!(link.ends_with("Please%20confirm%20my%20order."));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_empty_cart_summary() {
        assert_eq!(
            order_summary(&CartLedger::new().snapshot()),
            "Order Details:\nTotal: N0.00\nPlease confirm my order."
        );
    }
}
