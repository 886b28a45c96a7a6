//! Inventory management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use atelier_core::{Color, InventoryRecordId, ProductId, Size};
use atelier_shop::db::{BulkOp, ConflictPreview, InventoryFilter, InventoryRepository};
use atelier_shop::models::InventoryRecord;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Input for creating one ledger record.
#[derive(Debug, Deserialize)]
pub struct CreateInput {
    pub product_id: ProductId,
    pub size: Size,
    pub color: Color,
    #[serde(default)]
    pub quantity: i32,
}

/// Input for adjusting one ledger record.
#[derive(Debug, Deserialize)]
pub struct AdjustInput {
    pub op: BulkOp,
    pub amount: i32,
}

/// Input for a bulk adjustment over a sizes x colors grid.
#[derive(Debug, Deserialize)]
pub struct BulkInput {
    pub product_id: ProductId,
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
    pub op: BulkOp,
    pub amount: i32,
}

/// Input for a conflict preview.
#[derive(Debug, Deserialize)]
pub struct CheckInput {
    pub product_id: ProductId,
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
}

fn validate_amount(amount: i32) -> Result<()> {
    if amount < 0 {
        return Err(AppError::BadRequest("amount must not be negative".to_owned()));
    }
    Ok(())
}

fn validate_grid(sizes: &[Size], colors: &[Color]) -> Result<()> {
    if sizes.is_empty() || colors.is_empty() {
        return Err(AppError::BadRequest(
            "at least one size and one color are required".to_owned(),
        ));
    }
    Ok(())
}

/// List ledger records, filtered by product, axes, and stock level.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<InventoryFilter>,
) -> Result<Json<Vec<InventoryRecord>>> {
    let records = InventoryRepository::new(state.pool()).list(filter).await?;
    Ok(Json(records))
}

/// Create a ledger record for a new variant; the SKU is generated.
#[instrument(skip(state, input))]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateInput>,
) -> Result<Json<Value>> {
    validate_amount(input.quantity)?;
    let record = InventoryRepository::new(state.pool())
        .create(input.product_id, input.size, input.color, input.quantity)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "inventory record created",
        "record": record,
    })))
}

/// Adjust one record's quantity. `subtract` floors at zero.
#[instrument(skip(state, input))]
pub async fn adjust(
    State(state): State<AppState>,
    Path(record_id): Path<InventoryRecordId>,
    Json(input): Json<AdjustInput>,
) -> Result<Json<Value>> {
    validate_amount(input.amount)?;
    let record = InventoryRepository::new(state.pool())
        .adjust(record_id, input.op, input.amount)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "inventory updated",
        "record": record,
    })))
}

/// Delete one ledger record.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(record_id): Path<InventoryRecordId>,
) -> Result<Json<Value>> {
    InventoryRepository::new(state.pool()).delete(record_id).await?;
    Ok(Json(json!({ "success": true, "message": "inventory record deleted" })))
}

/// Bulk adjust a sizes x colors grid in one transaction.
///
/// Per-cell rejections (subtract on a missing variant, variant outside the
/// capability set) are reported without aborting sibling cells.
#[instrument(skip(state, input))]
pub async fn bulk(
    State(state): State<AppState>,
    Json(input): Json<BulkInput>,
) -> Result<Json<Value>> {
    validate_amount(input.amount)?;
    validate_grid(&input.sizes, &input.colors)?;
    let report = InventoryRepository::new(state.pool())
        .bulk_adjust(
            input.product_id,
            &input.sizes,
            &input.colors,
            input.op,
            input.amount,
        )
        .await?;
    Ok(Json(json!({
        "success": report.rejected == 0,
        "message": format!(
            "{} created, {} updated, {} rejected",
            report.created, report.updated, report.rejected
        ),
        "report": report,
    })))
}

/// Preview which cells of a planned bulk run exist and which would be created.
#[instrument(skip(state, input))]
pub async fn check(
    State(state): State<AppState>,
    Json(input): Json<CheckInput>,
) -> Result<Json<ConflictPreview>> {
    validate_grid(&input.sizes, &input.colors)?;
    let preview = InventoryRepository::new(state.pool())
        .check_conflicts(input.product_id, &input.sizes, &input.colors)
        .await?;
    Ok(Json(preview))
}
