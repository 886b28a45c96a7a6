//! Integration tests for Atelier.
//!
//! These tests exercise the shared domain layer across crate boundaries
//! without a database: the order state machine, SKU generation, and the
//! cart/checkout value types. Database-backed repository behavior is covered
//! by the migrations plus the services' own transaction tests.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `order_lifecycle` - Transition legality, bulk eligibility, return window
//! - `sku_generation` - Slugs, SKU bases, collision suffixes
//! - `cart_and_buyer` - Cart totals, buyer validation, variant capability
