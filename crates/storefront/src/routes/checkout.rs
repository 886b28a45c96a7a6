//! Checkout handler.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use atelier_shop::db::CartRepository;
use atelier_shop::models::BuyerInfo;
use atelier_shop::services::CheckoutService;

use crate::error::{AppError, Result};
use crate::extract::Shopper;
use crate::state::AppState;

/// Raw buyer details from the checkout form.
#[derive(Debug, Deserialize)]
pub struct CheckoutInput {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub notes: Option<String>,
}

/// Convert the shopper's cart into a pending order.
///
/// Buyer validation failures and an empty cart are rejected without touching
/// storage.
#[instrument(skip(state, shopper, input))]
pub async fn checkout(
    State(state): State<AppState>,
    shopper: Shopper,
    Json(input): Json<CheckoutInput>,
) -> Result<Json<Value>> {
    let buyer = BuyerInfo::parse(
        &input.full_name,
        &input.email,
        &input.phone,
        &input.address,
        input.notes.as_deref(),
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let cart = CartRepository::new(state.pool())
        .find(&shopper.cart_owner())
        .await?
        .ok_or(AppError::Checkout(
            atelier_shop::services::CheckoutError::EmptyCart,
        ))?;

    let order = CheckoutService::new(state.pool())
        .checkout(cart.id, shopper.user_id(), &buyer)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "order placed",
        "order_id": order.public_id,
        "status": order.status,
        "total_amount": order.total_amount,
    })))
}
