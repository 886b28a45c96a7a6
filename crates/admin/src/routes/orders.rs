//! Order management handlers.

use axum::Json;
use axum::extract::{Path, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{BulkOrderAction, OrderStatus, ReturnReason};
use atelier_shop::db::OrderRepository;
use atelier_shop::services::OrderLifecycleService;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Input for a bulk order action.
#[derive(Debug, Deserialize)]
pub struct BulkInput {
    pub action: BulkOrderAction,
    pub order_ids: Vec<Uuid>,
}

/// Input for a single status update.
#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: OrderStatus,
    /// Only meaningful when moving to `refunded`; defaults to the order total.
    pub refund_amount: Option<Decimal>,
}

/// Input for editing the return sub-record.
#[derive(Debug, Deserialize)]
pub struct ReturnInfoInput {
    pub return_reason: Option<ReturnReason>,
    pub return_detail: Option<String>,
    pub refund_amount: Option<Decimal>,
}

/// Apply one action to many orders; ineligible orders are skipped.
#[instrument(skip(state, input))]
pub async fn bulk(
    State(state): State<AppState>,
    Json(input): Json<BulkInput>,
) -> Result<Json<Value>> {
    if input.order_ids.is_empty() {
        return Err(AppError::BadRequest("no orders specified".to_owned()));
    }
    let report = OrderLifecycleService::new(state.pool())
        .bulk(input.action, &input.order_ids)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{} of {} orders updated", report.succeeded, report.total),
        "report": report,
    })))
}

/// Move one order to a new status through the state machine.
#[instrument(skip(state, input))]
pub async fn update_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<StatusInput>,
) -> Result<Json<Value>> {
    let lifecycle = OrderLifecycleService::new(state.pool());
    if input.status == OrderStatus::Refunded {
        lifecycle.refund(order_id, input.refund_amount).await?;
    } else {
        lifecycle.update_status(order_id, input.status).await?;
    }
    Ok(Json(json!({
        "success": true,
        "message": format!("order moved to {}", input.status),
    })))
}

/// Edit a return's reason, free-text detail, or refund amount.
#[instrument(skip(state, input))]
pub async fn update_return_info(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReturnInfoInput>,
) -> Result<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .update_return_info(
            order_id,
            input.return_reason,
            input.return_detail.as_deref(),
            input.refund_amount,
        )
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "return info updated",
        "order": order,
    })))
}
