//! Variant inventory lookup for product pages.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use atelier_core::{Color, ProductId, Size};
use atelier_shop::db::{InventoryFilter, InventoryRepository};

use crate::error::Result;
use crate::state::AppState;

/// Optional variant axes; both present narrows the lookup to one cell.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub size: Option<Size>,
    pub color: Option<Color>,
}

/// Variant quantities for a product.
///
/// With both `size` and `color` given, answers for that single cell (an
/// absent record reads as quantity 0). Otherwise lists the product's ledger
/// records, optionally narrowed by one axis.
#[instrument(skip(state))]
pub async fn lookup(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<Value>> {
    let inventory = InventoryRepository::new(state.pool());

    if let (Some(size), Some(color)) = (query.size, query.color) {
        let record = inventory.find_variant(product_id, size, color).await?;
        return Ok(Json(match record {
            Some(r) => json!({
                "success": true,
                "quantity": r.quantity,
                "sku": r.sku,
                "in_stock": r.is_in_stock(),
            }),
            None => json!({
                "success": true,
                "quantity": 0,
                "sku": Value::Null,
                "in_stock": false,
            }),
        }));
    }

    let records = inventory
        .list(InventoryFilter {
            product_id: Some(product_id),
            size: query.size,
            color: query.color,
            stock: None,
        })
        .await?;
    Ok(Json(json!({ "success": true, "variants": records })))
}
