//! Cache types for menu API responses.

use crate::catalog::{Banner, Category, MenuItem};

/// Cache key for the read endpoints.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    MenuItems,
    Categories,
    Banners,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    MenuItems(Vec<MenuItem>),
    Categories(Vec<Category>),
    Banners(Vec<Banner>),
}

/// A record type listed by one read endpoint.
pub trait Cached: Clone + Send + Sync + 'static {
    const KEY: CacheKey;

    fn cached(records: Vec<Self>) -> CacheValue;

    fn from_cached(value: CacheValue) -> Option<Vec<Self>>;
}

impl Cached for MenuItem {
    const KEY: CacheKey = CacheKey::MenuItems;

    fn cached(records: Vec<Self>) -> CacheValue {
        CacheValue::MenuItems(records)
    }

    fn from_cached(value: CacheValue) -> Option<Vec<Self>> {
        match value {
            CacheValue::MenuItems(records) => Some(records),
            _ => None,
        }
    }
}

impl Cached for Category {
    const KEY: CacheKey = CacheKey::Categories;

    fn cached(records: Vec<Self>) -> CacheValue {
        CacheValue::Categories(records)
    }

    fn from_cached(value: CacheValue) -> Option<Vec<Self>> {
        match value {
            CacheValue::Categories(records) => Some(records),
            _ => None,
        }
    }
}

impl Cached for Banner {
    const KEY: CacheKey = CacheKey::Banners;

    fn cached(records: Vec<Self>) -> CacheValue {
        CacheValue::Banners(records)
    }

    fn from_cached(value: CacheValue) -> Option<Vec<Self>> {
        match value {
            CacheValue::Banners(records) => Some(records),
            _ => None,
        }
    }
}
