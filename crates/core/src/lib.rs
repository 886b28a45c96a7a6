//! Atelier Core - Shared types library.
//!
//! This crate provides common types used across all Atelier components:
//! - `shop` - Domain library (repositories, checkout, order lifecycle)
//! - `storefront` - Public-facing e-commerce API
//! - `admin` - Internal administration API
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, order status machine, variant enums, reason codes
//! - [`slug`] - Token normalization used by SKU generation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod slug;
pub mod types;

pub use types::*;
