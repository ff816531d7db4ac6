//! Native Delight Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.
//!
//! # Modules
//!
//! - [`cart`] - cart ledger
//! - [`selection`] - category / subcategory selection state machine
//! - [`checkout`] - form validation, order draft and payment handoff
//! - [`whatsapp`] - chat order handoff
//! - [`session`] - per-visitor shop state
//! - [`catalog`] - categories, menu items and banners
//! - [`api`] - menu API client
//! - [`routes`] - JSON API on axum

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod selection;
pub mod session;
pub mod state;
pub mod whatsapp;
