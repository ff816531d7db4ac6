//! Catalog store: categories, menu items and banners for a visitor.
//!
//! The catalog is reference data. It is assembled from three independent
//! fetches that are issued together; each failure leaves its own collection
//! empty and is reported as a [`CatalogIssue`] instead of failing the page.

mod model;

pub use model::{
    Banner, Category, CategoryRef, ImageRef, MenuItem, Subcategory, SubcategoryRef,
};

use native_delight_core::{CategoryId, MenuItemId};
use serde::Serialize;
use tracing::instrument;

use crate::api::MenuApi;

/// A fetch that failed while loading the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogIssue {
    /// Menu items or categories could not be loaded.
    Menu,
    /// Banners could not be loaded.
    Banners,
}

impl CatalogIssue {
    /// Message shown to the visitor.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Menu => "Failed to load menu or categories. Please try again later.",
            Self::Banners => "Failed to load banners.",
        }
    }
}

/// Read-only catalog data for one page load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    categories: Vec<Category>,
    items: Vec<MenuItem>,
    banners: Vec<Banner>,
    issues: Vec<CatalogIssue>,
}

impl Catalog {
    /// Build a catalog from already-normalized data.
    #[must_use]
    pub const fn new(categories: Vec<Category>, items: Vec<MenuItem>, banners: Vec<Banner>) -> Self {
        Self {
            categories,
            items,
            banners,
            issues: Vec::new(),
        }
    }

    /// Fetch menu items, categories and banners concurrently.
    ///
    /// Never fails: a failed fetch is logged and recorded in [`Self::issues`].
    #[instrument(skip(api))]
    pub async fn load<A: MenuApi>(api: &A) -> Self {
        let (items, categories, banners) =
            tokio::join!(api.menu_items(), api.categories(), api.banners());

        let mut catalog = Self::default();

        match items {
            Ok(items) => catalog.items = items,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch menu items");
                catalog.record(CatalogIssue::Menu);
            }
        }

        match categories {
            Ok(categories) => catalog.categories = categories,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch categories");
                catalog.record(CatalogIssue::Menu);
            }
        }

        match banners {
            Ok(banners) => catalog.banners = banners,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch banners");
                catalog.record(CatalogIssue::Banners);
            }
        }

        tracing::debug!(
            categories = catalog.categories.len(),
            items = catalog.items.len(),
            banners = catalog.banners.len(),
            "Catalog loaded"
        );

        catalog
    }

    fn record(&mut self, issue: CatalogIssue) {
        if !self.issues.contains(&issue) {
            self.issues.push(issue);
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    #[must_use]
    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    #[must_use]
    pub fn issues(&self) -> &[CatalogIssue] {
        &self.issues
    }

    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn item(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Items whose category reference carries `category_name`.
    #[must_use]
    pub fn items_in_category(&self, category_name: &str) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| item.category_name() == Some(category_name))
            .collect()
    }

    /// Items matching both a category name and a subcategory name.
    #[must_use]
    pub fn items_in_subcategory(&self, category_name: &str, subcategory_name: &str) -> Vec<&MenuItem> {
        self.items
            .iter()
            .filter(|item| {
                item.category_name() == Some(category_name)
                    && item.subcategory_name() == Some(subcategory_name)
            })
            .collect()
    }

    /// Items of one subcategory.
    ///
    /// Uses the list pre-joined by the menu API when there is one, otherwise
    /// joins on the items' subcategory references.
    #[must_use]
    pub fn subcategory_items(&self, subcategory: &Subcategory) -> Vec<&MenuItem> {
        match &subcategory.items {
            Some(ids) if !ids.is_empty() => ids.iter().filter_map(|id| self.item(id)).collect(),
            _ => self
                .items
                .iter()
                .filter(|item| item.belongs_to(subcategory))
                .collect(),
        }
    }

    /// Every item that belongs to one of the category's subcategories.
    #[must_use]
    pub fn category_items(&self, category: &Category) -> Vec<&MenuItem> {
        let mut items: Vec<&MenuItem> = Vec::new();
        for subcategory in &category.subcategories {
            for item in self.subcategory_items(subcategory) {
                if !items.iter().any(|seen| seen.id == item.id) {
                    items.push(item);
                }
            }
        }
        items
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Catalog records for unit tests.

    use native_delight_core::{Price, Status};
    use rust_decimal::Decimal;

    use super::*;

    pub fn item(id: &str, price: i64, category: &str, subcategory: (&str, &str)) -> MenuItem {
        MenuItem {
            id: id.into(),
            name: format!("Item {id}"),
            description: String::new(),
            price: Price::new(Decimal::from(price)).unwrap_or_default(),
            category: Some(CategoryRef {
                id: None,
                name: category.to_string(),
            }),
            sub_category: Some(SubcategoryRef {
                id: Some(subcategory.0.into()),
                name: subcategory.1.to_string(),
            }),
            status: Status::Active,
            stock: "In stock".to_string(),
            image: None,
        }
    }

    pub fn category(id: &str, name: &str, subcategories: &[(&str, &str)]) -> Category {
        Category {
            id: id.into(),
            name: name.to_string(),
            description: String::new(),
            status: Status::Active,
            image: None,
            subcategories: subcategories
                .iter()
                .map(|(sub_id, sub_name)| Subcategory {
                    id: (*sub_id).into(),
                    name: (*sub_name).to_string(),
                    category_name: name.to_string(),
                    items: None,
                })
                .collect(),
        }
    }

    /// Two categories: "Rice" (Jollof, Fried) and "Soups" (Egusi).
    pub fn sample_catalog() -> Catalog {
        Catalog::new(
            vec![
                category("c-rice", "Rice", &[("s-jollof", "Jollof"), ("s-fried", "Fried")]),
                category("c-soup", "Soups", &[("s-egusi", "Egusi")]),
            ],
            vec![
                item("i-1", 2500, "Rice", ("s-jollof", "Jollof")),
                item("i-2", 3000, "Rice", ("s-fried", "Fried")),
                item("i-3", 1800, "Soups", ("s-egusi", "Egusi")),
            ],
            Vec::new(),
        )
    }
}
