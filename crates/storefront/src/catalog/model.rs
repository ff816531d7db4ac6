//! Canonical catalog records.
//!
//! These are the shapes the rest of the storefront works with. Whatever the
//! menu API sends is converted into them once, in [`crate::api::wire`].

use native_delight_core::{BannerId, CategoryId, MenuItemId, Price, Status, SubcategoryId};
use serde::{Deserialize, Serialize};

/// An image hosted by the menu API's media provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// A menu category with its subcategories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub status: Status,
    pub image: Option<ImageRef>,
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    /// Number of subcategories, derived from the list itself.
    #[must_use]
    pub fn subcategory_count(&self) -> usize {
        self.subcategories.len()
    }

    /// Find one of this category's subcategories by id.
    #[must_use]
    pub fn subcategory(&self, id: &SubcategoryId) -> Option<&Subcategory> {
        self.subcategories.iter().find(|sub| &sub.id == id)
    }
}

/// A subcategory inside a [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    /// Name of the owning category.
    pub category_name: String,
    /// Item ids the menu API pre-joined into this subcategory, if it did.
    pub items: Option<Vec<MenuItemId>>,
}

/// Reference from a menu item to its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Option<CategoryId>,
    pub name: String,
}

/// Reference from a menu item to its subcategory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryRef {
    pub id: Option<SubcategoryId>,
    pub name: String,
}

impl SubcategoryRef {
    /// Whether this reference points at `subcategory`.
    ///
    /// Identifiers are compared when the reference carries one. Only
    /// references without an identifier fall back to comparing names.
    #[must_use]
    pub fn matches(&self, subcategory: &Subcategory) -> bool {
        match &self.id {
            Some(id) if !id.is_empty() => id == &subcategory.id,
            _ => self.name == subcategory.name,
        }
    }
}

/// A purchasable menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: Option<CategoryRef>,
    pub sub_category: Option<SubcategoryRef>,
    pub status: Status,
    /// Free-text stock label ("In stock", "Few left", ...), not a quantity.
    pub stock: String,
    pub image: Option<String>,
}

impl MenuItem {
    /// Whether the item may be added to an order.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        self.status.is_orderable()
    }

    /// Name of the item's category, if it has one.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Name of the item's subcategory, if it has one.
    #[must_use]
    pub fn subcategory_name(&self) -> Option<&str> {
        self.sub_category.as_ref().map(|s| s.name.as_str())
    }

    /// Whether the item belongs to `subcategory` (identifier join, name fallback).
    #[must_use]
    pub fn belongs_to(&self, subcategory: &Subcategory) -> bool {
        self.sub_category
            .as_ref()
            .is_some_and(|reference| reference.matches(subcategory))
    }
}

/// A promotional banner shown above the category grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: Option<String>,
    pub image: ImageRef,
    pub link: Option<String>,
}
