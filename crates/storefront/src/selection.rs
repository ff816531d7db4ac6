//! Category / subcategory selection state machine.
//!
//! ```text
//! Browsing ──open_category──▶ CategoryDetail ──commit──▶ SubcategoryResult
//!    ▲                            │   ▲ select_subcategory       │
//!    └──────────── back ──────────┴───┘                          │
//!    └──────────────────────────── back ─────────────────────────┘
//! ```
//!
//! The machine only holds ids and names; items are looked up in the
//! [`Catalog`] when they are displayed.

use native_delight_core::{CategoryId, MenuItemId, SubcategoryId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, Category, MenuItem};

/// Label used for "every item of the category" in place of a subcategory name.
pub const ALL_ITEMS_LABEL: &str = "All Items";

/// Errors returned by selection transitions.
///
/// A failed transition leaves the state unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown subcategory: {0}")]
    UnknownSubcategory(String),
}

/// The previewed subset inside an open category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubcategoryChoice {
    #[default]
    All,
    Subcategory(SubcategoryId),
}

impl SubcategoryChoice {
    /// Parse the form value: `"all"` or a subcategory id.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Subcategory(value.into())
        }
    }
}

/// Where the visitor is in the menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    /// The category grid.
    #[default]
    Browsing,
    /// A category is open and one of its subsets is previewed.
    CategoryDetail {
        category_id: CategoryId,
        category_name: String,
        preview: SubcategoryChoice,
    },
    /// A committed list of items under a category / subcategory header.
    SubcategoryResult {
        category_name: String,
        subcategory_name: String,
        items: Vec<MenuItemId>,
    },
}

impl Selection {
    const fn state_name(&self) -> &'static str {
        match self {
            Self::Browsing => "browsing",
            Self::CategoryDetail { .. } => "a category is open",
            Self::SubcategoryResult { .. } => "showing a subcategory",
        }
    }

    const fn invalid(&self, action: &'static str) -> SelectionError {
        SelectionError::InvalidTransition {
            action,
            state: self.state_name(),
        }
    }

    /// Open `category`, previewing all of its items.
    ///
    /// Allowed from the grid, or to switch from another open category.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidTransition`] while a committed result
    /// is shown.
    pub fn open_category(&mut self, category: &Category) -> Result<(), SelectionError> {
        if matches!(self, Self::SubcategoryResult { .. }) {
            return Err(self.invalid("open a category"));
        }

        *self = Self::CategoryDetail {
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            preview: SubcategoryChoice::All,
        };
        Ok(())
    }

    /// Change the previewed subset of the open category.
    ///
    /// # Errors
    ///
    /// Returns an error if no category is open, if the open category is no
    /// longer in the catalog, or if the subcategory does not belong to it.
    pub fn select_subcategory(
        &mut self,
        catalog: &Catalog,
        choice: SubcategoryChoice,
    ) -> Result<(), SelectionError> {
        let state = self.state_name();
        let Self::CategoryDetail {
            category_id,
            preview,
            ..
        } = self
        else {
            return Err(SelectionError::InvalidTransition {
                action: "select a subcategory",
                state,
            });
        };

        let category = catalog
            .category(category_id)
            .ok_or_else(|| SelectionError::UnknownCategory(category_id.to_string()))?;

        if let SubcategoryChoice::Subcategory(id) = &choice
            && category.subcategory(id).is_none()
        {
            return Err(SelectionError::UnknownSubcategory(id.to_string()));
        }

        *preview = choice;
        Ok(())
    }

    /// Commit a category / subcategory pair and show its items.
    ///
    /// A non-empty `items` list is stored as given. Otherwise the list is
    /// derived from the catalog by name: the category alone for
    /// [`ALL_ITEMS_LABEL`], category and subcategory otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidTransition`] unless a category is open.
    pub fn commit(
        &mut self,
        catalog: &Catalog,
        category_name: &str,
        subcategory_name: &str,
        items: Vec<MenuItemId>,
    ) -> Result<(), SelectionError> {
        if !matches!(self, Self::CategoryDetail { .. }) {
            return Err(self.invalid("commit a subcategory"));
        }

        let items = if items.is_empty() {
            let derived = if subcategory_name == ALL_ITEMS_LABEL {
                catalog.items_in_category(category_name)
            } else {
                catalog.items_in_subcategory(category_name, subcategory_name)
            };
            derived.into_iter().map(|item| item.id.clone()).collect()
        } else {
            items
        };

        tracing::debug!(
            category = %category_name,
            subcategory = %subcategory_name,
            items = items.len(),
            "Selection committed"
        );

        *self = Self::SubcategoryResult {
            category_name: category_name.to_string(),
            subcategory_name: subcategory_name.to_string(),
            items,
        };
        Ok(())
    }

    /// Return to the category grid, dropping any open category or result.
    pub fn back(&mut self) {
        *self = Self::Browsing;
    }

    /// Items previewed inside the open category.
    #[must_use]
    pub fn preview_items<'c>(&self, catalog: &'c Catalog) -> Vec<&'c MenuItem> {
        let Self::CategoryDetail {
            category_id,
            preview,
            ..
        } = self
        else {
            return Vec::new();
        };

        let Some(category) = catalog.category(category_id) else {
            return Vec::new();
        };

        match preview {
            SubcategoryChoice::All => catalog.category_items(category),
            SubcategoryChoice::Subcategory(id) => category
                .subcategory(id)
                .map(|sub| catalog.subcategory_items(sub))
                .unwrap_or_default(),
        }
    }

    /// Items of the committed result, in stored order.
    ///
    /// Ids no longer present in the catalog are skipped.
    #[must_use]
    pub fn displayed_items<'c>(&self, catalog: &'c Catalog) -> Vec<&'c MenuItem> {
        match self {
            Self::SubcategoryResult { items, .. } => {
                items.iter().filter_map(|id| catalog.item(id)).collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{item, sample_catalog};

    fn ids(items: &[&MenuItem]) -> Vec<String> {
        items.iter().map(|item| item.id.to_string()).collect()
    }

    #[test]
    fn test_open_then_commit_all_items() {
        let catalog = sample_catalog();
        let rice = catalog.category_by_name("Rice").unwrap();
        let mut selection = Selection::default();

        selection.open_category(rice).unwrap();
        selection
            .commit(&catalog, "Rice", ALL_ITEMS_LABEL, Vec::new())
            .unwrap();

        assert_eq!(ids(&selection.displayed_items(&catalog)), ["i-1", "i-2"]);
    }

    #[test]
    fn test_commit_named_subcategory_filters_by_both_names() {
        let catalog = sample_catalog();
        let mut selection = Selection::default();
        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();

        selection
            .commit(&catalog, "Rice", "Fried", Vec::new())
            .unwrap();

        assert_eq!(ids(&selection.displayed_items(&catalog)), ["i-2"]);
        assert!(matches!(
            selection,
            Selection::SubcategoryResult { ref subcategory_name, .. } if subcategory_name == "Fried"
        ));
    }

    #[test]
    fn test_commit_keeps_passed_items() {
        let catalog = sample_catalog();
        let mut selection = Selection::default();
        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();

        selection
            .commit(&catalog, "Rice", "Jollof", vec!["i-3".into()])
            .unwrap();

        assert_eq!(ids(&selection.displayed_items(&catalog)), ["i-3"]);
    }

    #[test]
    fn test_open_category_resets_preview() {
        let catalog = sample_catalog();
        let mut selection = Selection::default();
        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();
        selection
            .select_subcategory(&catalog, SubcategoryChoice::parse("s-fried"))
            .unwrap();
        assert_eq!(ids(&selection.preview_items(&catalog)), ["i-2"]);

        selection
            .open_category(catalog.category_by_name("Soups").unwrap())
            .unwrap();

        assert!(matches!(
            selection,
            Selection::CategoryDetail { preview: SubcategoryChoice::All, .. }
        ));
        assert_eq!(ids(&selection.preview_items(&catalog)), ["i-3"]);
    }

    #[test]
    fn test_select_subcategory_rejects_foreign_id() {
        let catalog = sample_catalog();
        let mut selection = Selection::default();
        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();
        let before = selection.clone();

        let result = selection.select_subcategory(&catalog, SubcategoryChoice::parse("s-egusi"));

        assert_eq!(
            result,
            Err(SelectionError::UnknownSubcategory("s-egusi".to_string()))
        );
        assert_eq!(selection, before);
    }

    #[test]
    fn test_invalid_transitions_leave_state() {
        let catalog = sample_catalog();
        let mut selection = Selection::default();

        assert!(matches!(
            selection.commit(&catalog, "Rice", ALL_ITEMS_LABEL, Vec::new()),
            Err(SelectionError::InvalidTransition { .. })
        ));
        assert!(matches!(
            selection.select_subcategory(&catalog, SubcategoryChoice::All),
            Err(SelectionError::InvalidTransition { .. })
        ));
        assert_eq!(selection, Selection::Browsing);

        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();
        selection
            .commit(&catalog, "Rice", ALL_ITEMS_LABEL, Vec::new())
            .unwrap();
        let committed = selection.clone();

        assert!(matches!(
            selection.open_category(catalog.category_by_name("Soups").unwrap()),
            Err(SelectionError::InvalidTransition { .. })
        ));
        assert_eq!(selection, committed);
    }

    #[test]
    fn test_back_returns_to_browsing() {
        let catalog = sample_catalog();
        let mut selection = Selection::default();
        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();
        selection.back();
        assert_eq!(selection, Selection::Browsing);

        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();
        selection
            .commit(&catalog, "Rice", "Jollof", Vec::new())
            .unwrap();
        selection.back();

        assert_eq!(selection, Selection::Browsing);
        assert!(selection.displayed_items(&catalog).is_empty());
    }

    #[test]
    fn test_all_items_label_ignores_subcategory_names() {
        // An item whose subcategory happens to be called "All Items" is not special.
        let base = sample_catalog();
        let extra = item("i-9", 100, "Soups", ("s-x", ALL_ITEMS_LABEL));
        let catalog = Catalog::new(
            base.categories().to_vec(),
            base.items().iter().cloned().chain([extra]).collect(),
            Vec::new(),
        );
        let mut selection = Selection::default();
        selection
            .open_category(catalog.category_by_name("Rice").unwrap())
            .unwrap();

        selection
            .commit(&catalog, "Rice", ALL_ITEMS_LABEL, Vec::new())
            .unwrap();

        assert_eq!(ids(&selection.displayed_items(&catalog)), ["i-1", "i-2"]);
    }

    #[test]
    fn test_serialized_state_tag() {
        let json = serde_json::to_value(Selection::Browsing).unwrap();
        assert_eq!(json["state"], "browsing");
        assert_eq!(SubcategoryChoice::parse(" ALL "), SubcategoryChoice::All);
    }
}
