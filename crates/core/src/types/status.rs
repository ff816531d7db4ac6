//! Catalog record status.

use serde::{Deserialize, Serialize};

/// Availability status of a category or menu item.
///
/// Inactive items are still listed but cannot be ordered. Any status string
/// the menu API sends that is not recognised as active is treated as inactive,
/// and so is a missing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[serde(alias = "Active", alias = "ACTIVE")]
    Active,
    #[default]
    #[serde(other)]
    Inactive,
}

impl Status {
    /// Whether records with this status can be added to an order.
    #[must_use]
    pub const fn is_orderable(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}
