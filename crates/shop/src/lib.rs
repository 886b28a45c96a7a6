//! Domain layer shared by the Atelier storefront and admin binaries.
//!
//! # Layout
//!
//! - [`config`] - Environment-based configuration per binary
//! - [`db`] - Repositories over `sqlx::PgPool` (products, inventory ledger,
//!   carts, orders)
//! - [`models`] - Domain models the repositories return
//! - [`services`] - Checkout orchestration and the order lifecycle
//!
//! Both binaries share one `shop` schema; the repositories here are the only
//! code that touches it. Migrations live in `migrations/` and are embedded
//! into the CLI via `sqlx::migrate!`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod models;
pub mod services;
