//! Database operations for the `shop` `PostgreSQL` schema.
//!
//! ## Tables
//!
//! - `products` - Catalog, with variant capability sets and materialized stock
//! - `inventory_records` - The per-variant ledger (one row per product/size/color)
//! - `carts` / `cart_lines` - User and anonymous-session carts
//! - `orders` / `order_lines` - Placed orders with lifecycle sub-records
//!
//! # Migrations
//!
//! Migrations are stored in `crates/shop/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod carts;
pub mod inventory;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::{CartOwner, CartRepository};
pub use inventory::{
    BulkAdjustReport, BulkOp, ConflictPreview, InventoryFilter, InventoryRepository, StockFilter,
};
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique SKU).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a stored enum-ish text column, mapping failure to `DataCorruption`.
pub(crate) fn parse_column<T>(raw: &str, what: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid {what} in database: {e}"))
    })
}
