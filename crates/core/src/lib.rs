//! Native Delight Core - Shared domain value types.
//!
//! This crate provides the value types used by the storefront:
//! - string identifiers for categories, subcategories, menu items and banners
//! - [`Price`] in naira, backed by decimal arithmetic
//! - validated contact details ([`Email`], [`PhoneNumber`])
//! - catalog [`Status`]
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. This keeps it lightweight and allows it to be used anywhere.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
