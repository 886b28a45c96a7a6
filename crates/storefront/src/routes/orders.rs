//! Order self-service handlers: history, cancel, return, reorder.

use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{CancelReason, ReturnReason, UserId};
use atelier_shop::db::OrderRepository;
use atelier_shop::models::Order;
use atelier_shop::services::OrderLifecycleService;

use crate::error::{AppError, Result};
use crate::extract::SignedInUser;
use crate::state::AppState;

/// Input for cancelling an order.
#[derive(Debug, Deserialize)]
pub struct CancelInput {
    pub reason: CancelReason,
    pub detail: Option<String>,
}

/// Input for requesting a return.
#[derive(Debug, Deserialize)]
pub struct ReturnInput {
    pub reason: ReturnReason,
    pub detail: Option<String>,
}

/// The signed-in user's orders, newest first.
#[instrument(skip(state, user))]
pub async fn list(State(state): State<AppState>, user: SignedInUser) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.0)
        .await?;
    Ok(Json(orders))
}

/// Load an order and confirm the caller owns it. Foreign orders read as 404.
async fn owned_order(state: &AppState, order_id: Uuid, user_id: UserId) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get_by_public_id(order_id)
        .await?
        .filter(|o| o.user_id == Some(user_id))
        .ok_or_else(|| AppError::NotFound("order not found".to_owned()))?;
    Ok(order)
}

/// Cancel a pending or confirmed order, restoring its inventory.
#[instrument(skip(state, user, input))]
pub async fn cancel(
    State(state): State<AppState>,
    user: SignedInUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<CancelInput>,
) -> Result<Json<Value>> {
    owned_order(&state, order_id, user.0).await?;
    OrderLifecycleService::new(state.pool())
        .cancel(order_id, input.reason, input.detail.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "message": "order cancelled" })))
}

/// Request a return for a delivered order within the return window.
#[instrument(skip(state, user, input))]
pub async fn request_return(
    State(state): State<AppState>,
    user: SignedInUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReturnInput>,
) -> Result<Json<Value>> {
    owned_order(&state, order_id, user.0).await?;
    OrderLifecycleService::new(state.pool())
        .request_return(order_id, input.reason, input.detail.as_deref(), Utc::now())
        .await?;
    Ok(Json(json!({ "success": true, "message": "return requested" })))
}

/// Merge a delivered order's still-available lines back into the cart.
#[instrument(skip(state, user))]
pub async fn reorder(
    State(state): State<AppState>,
    user: SignedInUser,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>> {
    owned_order(&state, order_id, user.0).await?;
    let report = OrderLifecycleService::new(state.pool())
        .reorder(order_id, user.0)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} lines added, {} skipped", report.added, report.skipped),
        "added": report.added,
        "skipped": report.skipped,
    })))
}
