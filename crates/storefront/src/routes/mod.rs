//! HTTP route handlers for the storefront.
//!
//! All endpoints speak JSON and identify the shopper from trusted gateway
//! headers (see [`crate::extract::Shopper`]).
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database)
//!
//! # Cart
//! GET    /cart                      - Cart summary with totals
//! POST   /cart/add                  - Add a variant (merges into existing line)
//! POST   /cart/lines/{id}           - Overwrite a line's quantity (<= 0 deletes)
//! DELETE /cart/lines/{id}           - Remove a line
//! POST   /cart/merge                - Merge an anonymous cart into the user cart
//!
//! # Checkout
//! POST /checkout                    - Convert the cart into a pending order
//!
//! # Orders (signed-in)
//! GET  /orders                      - Order history
//! POST /orders/{id}/cancel          - Cancel (pending/confirmed; restocks)
//! POST /orders/{id}/return          - Request a return (delivered, 7-day window)
//! POST /orders/{id}/reorder         - Merge a delivered order back into the cart
//!
//! # Inventory
//! GET /products/{id}/inventory      - Variant quantities (optionally one cell)
//! ```

pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod orders;

use axum::Router;
use axum::routing::{get, post};

use crate::state::AppState;

/// Build the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::summary))
        .route("/cart/add", post(cart::add))
        .route(
            "/cart/lines/{line_id}",
            post(cart::update_line).delete(cart::remove_line),
        )
        .route("/cart/merge", post(cart::merge))
        .route("/checkout", post(checkout::checkout))
        .route("/orders", get(orders::list))
        .route("/orders/{order_id}/cancel", post(orders::cancel))
        .route("/orders/{order_id}/return", post(orders::request_return))
        .route("/orders/{order_id}/reorder", post(orders::reorder))
        .route("/products/{product_id}/inventory", get(inventory::lookup))
}
