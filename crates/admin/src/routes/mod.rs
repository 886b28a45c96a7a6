//! HTTP route handlers for the admin binary.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (database)
//!
//! # Inventory
//! GET    /inventory                 - List ledger records (filters in query)
//! POST   /inventory                 - Create one record (SKU auto-generated)
//! PUT    /inventory/{id}            - Adjust one record (set/add/subtract)
//! DELETE /inventory/{id}            - Delete one record
//! POST   /inventory/bulk            - Bulk adjust a sizes x colors grid
//! POST   /inventory/check           - Conflict preview for a planned bulk run
//!
//! # Orders
//! POST /orders/bulk                 - Bulk status action over many orders
//! POST /orders/{id}/status          - Single status update via the state machine
//! POST /orders/{id}/return-info     - Edit return reason / detail / refund amount
//! ```

pub mod inventory;
pub mod orders;

use axum::Router;
use axum::routing::{get, post, put};

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(inventory::list).post(inventory::create))
        .route(
            "/inventory/{record_id}",
            put(inventory::adjust).delete(inventory::delete),
        )
        .route("/inventory/bulk", post(inventory::bulk))
        .route("/inventory/check", post(inventory::check))
        .route("/orders/bulk", post(orders::bulk))
        .route("/orders/{order_id}/status", post(orders::update_status))
        .route("/orders/{order_id}/return-info", post(orders::update_return_info))
}
