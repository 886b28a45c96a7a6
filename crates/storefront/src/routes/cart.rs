//! Cart handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use atelier_core::{CartLineId, Color, ProductId, Size};
use atelier_shop::db::{CartRepository, InventoryRepository, ProductRepository};
use atelier_shop::models::CartSummary;

use crate::error::{AppError, Result};
use crate::extract::{Shopper, SignedInUser};
use crate::state::AppState;

/// Input for adding a variant to the cart.
#[derive(Debug, Deserialize)]
pub struct AddInput {
    pub product_id: ProductId,
    pub size: Size,
    pub color: Color,
    pub quantity: i32,
}

/// Input for overwriting a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateInput {
    pub quantity: i32,
}

/// Input for merging an anonymous cart after login.
#[derive(Debug, Deserialize)]
pub struct MergeInput {
    pub session_key: String,
}

/// Cart summary with lines and totals.
#[instrument(skip(state, shopper))]
pub async fn summary(
    State(state): State<AppState>,
    shopper: Shopper,
) -> Result<Json<CartSummary>> {
    let carts = CartRepository::new(state.pool());
    let summary = match carts.find(&shopper.cart_owner()).await? {
        Some(cart) => carts.summary(cart.id).await?,
        None => CartSummary::empty(atelier_core::CartId::new(0)),
    };
    Ok(Json(summary))
}

/// Add a variant to the cart.
///
/// Gated on the product being active, the variant being in its capability
/// set, and the ledger having enough quantity to cover the request.
#[instrument(skip(state, shopper))]
pub async fn add(
    State(state): State<AppState>,
    shopper: Shopper,
    Json(input): Json<AddInput>,
) -> Result<Json<Value>> {
    if input.quantity <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .get_active(input.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;
    if !product.allows_variant(input.size, input.color) {
        return Err(AppError::BadRequest(format!(
            "variant {}/{} is not offered for this product",
            input.size, input.color
        )));
    }
    let available = InventoryRepository::new(state.pool())
        .get_quantity(product.id, input.size, input.color)
        .await?;
    if available < input.quantity {
        return Err(AppError::BadRequest(format!(
            "only {available} in stock for {}/{}",
            input.size, input.color
        )));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(&shopper.cart_owner()).await?;
    let line = carts
        .add_line(cart.id, product.id, input.size, input.color, input.quantity)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "added to cart",
        "line_id": line.id,
        "quantity": line.quantity,
    })))
}

/// Overwrite a line's quantity; zero or less removes the line.
#[instrument(skip(state, shopper))]
pub async fn update_line(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(line_id): Path<CartLineId>,
    Json(input): Json<UpdateInput>,
) -> Result<Json<Value>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .find(&shopper.cart_owner())
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_owned()))?;
    carts.update_line(cart.id, line_id, input.quantity).await?;
    Ok(Json(json!({ "success": true, "message": "cart updated" })))
}

/// Remove a line from the cart.
#[instrument(skip(state, shopper))]
pub async fn remove_line(
    State(state): State<AppState>,
    shopper: Shopper,
    Path(line_id): Path<CartLineId>,
) -> Result<Json<Value>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts
        .find(&shopper.cart_owner())
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_owned()))?;
    carts.remove_line(cart.id, line_id).await?;
    Ok(Json(json!({ "success": true, "message": "line removed" })))
}

/// Merge the shopper's anonymous cart into their user cart after login.
#[instrument(skip(state, user, input))]
pub async fn merge(
    State(state): State<AppState>,
    user: SignedInUser,
    Json(input): Json<MergeInput>,
) -> Result<Json<Value>> {
    let merged = CartRepository::new(state.pool())
        .merge_session_cart(&input.session_key, user.0)
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": "carts merged",
        "merged_lines": merged,
    })))
}
