//! Cart ledger.
//!
//! The ledger owns the visitor's cart lines. Every mutation replaces the
//! whole line list, so a [`CartSnapshot`] taken earlier keeps seeing the
//! lines as they were.

use std::sync::Arc;

use native_delight_core::{MenuItemId, Price};
use serde::{Deserialize, Serialize};

use crate::catalog::MenuItem;

/// One item in the cart with its quantity (always at least 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: MenuItem,
    pub quantity: u32,
}

impl CartLine {
    /// Price of the line (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.price.times(self.quantity)
    }
}

/// The visitor's cart: at most one line per menu item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLedger {
    lines: Arc<Vec<CartLine>>,
}

/// Read-only view of the cart at one point in time.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    lines: Arc<Vec<CartLine>>,
}

impl CartLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `item`, creating its line if needed.
    pub fn add(&mut self, item: &MenuItem) {
        let mut lines = self.lines.as_ref().clone();
        match lines.iter_mut().find(|line| line.item.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => lines.push(CartLine {
                item: item.clone(),
                quantity: 1,
            }),
        }
        self.replace(lines);
    }

    /// Set the quantity of an existing line.
    ///
    /// A quantity below 1 removes the line. Unknown ids are ignored.
    pub fn update_quantity(&mut self, id: &MenuItemId, quantity: i64) {
        if quantity < 1 {
            self.remove(id);
            return;
        }
        if self.line(id).is_none() {
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let lines = self
            .lines
            .iter()
            .map(|line| {
                if &line.item.id == id {
                    CartLine {
                        item: line.item.clone(),
                        quantity,
                    }
                } else {
                    line.clone()
                }
            })
            .collect();
        self.replace(lines);
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&mut self, id: &MenuItemId) {
        if self.line(id).is_none() {
            return;
        }
        let lines = self
            .lines
            .iter()
            .filter(|line| &line.item.id != id)
            .cloned()
            .collect();
        self.replace(lines);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: &MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Capture the current lines; later mutations do not affect it.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: Arc::clone(&self.lines),
        }
    }

    fn replace(&mut self, lines: Vec<CartLine>) {
        self.lines = Arc::new(lines);
    }
}

impl CartSnapshot {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }
}
