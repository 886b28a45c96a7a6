//! Checkout orchestration.
//!
//! Turns a cart into a pending order in one transaction: order header with
//! the total frozen at the current effective prices, order lines with their
//! unit prices snapshotted, inventory decremented per line (deficits
//! allowed), product stock recomputed, cart lines cleared. The cart itself
//! survives for the next purchase.

use std::collections::HashSet;

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use atelier_core::{CartId, OrderStatus, ProductId, UserId};

use crate::db::inventory::apply_ledger_delta;
use crate::db::products::recompute_stock;
use crate::db::{RepositoryError, parse_column};
use crate::models::{BuyerInfo, Order};

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines; nothing was written.
    #[error("cart is empty")]
    EmptyCart,

    /// Storage-level failure; the transaction rolled back.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Orchestrates cart-to-order conversion.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct CheckoutLine {
    product_id: i32,
    product_name: String,
    size: String,
    color: String,
    quantity: i32,
    unit_price: Decimal,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert the cart into a pending order.
    ///
    /// Buyer info must already be validated ([`BuyerInfo::parse`]); an
    /// invalid buyer never reaches this function, so the only non-structural
    /// failure left is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
    /// Returns [`CheckoutError::Repository`] on database failure; no partial
    /// state survives.
    pub async fn checkout(
        &self,
        cart_id: CartId,
        user_id: Option<UserId>,
        buyer: &BuyerInfo,
    ) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let lines = sqlx::query_as::<_, CheckoutLine>(
            "SELECT cl.product_id, p.name AS product_name, cl.size, cl.color, cl.quantity,
                    COALESCE(p.discount_price, p.price) AS unit_price
             FROM shop.cart_lines cl
             JOIN shop.products p ON p.id = cl.product_id
             WHERE cl.cart_id = $1
             ORDER BY cl.id
             FOR UPDATE",
        )
        .bind(cart_id.as_i32())
        .fetch_all(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total: Decimal = lines
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();

        let order = insert_order(&mut tx, user_id, buyer, total).await?;

        let mut touched: HashSet<i32> = HashSet::new();
        for line in &lines {
            let size = parse_column(&line.size, "size")?;
            let color = parse_column(&line.color, "color")?;
            sqlx::query(
                "INSERT INTO shop.order_lines
                     (order_id, product_id, product_name, size, color, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(order.id.as_i32())
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.size.as_str())
            .bind(line.color.as_str())
            .bind(line.quantity)
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            // May create a negative-quantity deficit record.
            apply_ledger_delta(
                &mut tx,
                ProductId::new(line.product_id),
                &line.product_name,
                size,
                color,
                -line.quantity,
            )
            .await?;
            touched.insert(line.product_id);
        }

        for product_id in touched {
            recompute_stock(&mut tx, ProductId::new(product_id))
                .await
                .map_err(RepositoryError::from)?;
        }

        sqlx::query("DELETE FROM shop.cart_lines WHERE cart_id = $1")
            .bind(cart_id.as_i32())
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(order_id = %order.public_id, %total, "checkout completed");
        Ok(order)
    }
}

async fn insert_order(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    user_id: Option<UserId>,
    buyer: &BuyerInfo,
    total: Decimal,
) -> Result<Order, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct Inserted {
        id: i32,
        public_id: Uuid,
        created_at: chrono::DateTime<chrono::Utc>,
        updated_at: chrono::DateTime<chrono::Utc>,
    }

    let row = sqlx::query_as::<_, Inserted>(
        "INSERT INTO shop.orders
             (public_id, user_id, full_name, email, phone, address, notes, status, total_amount)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING id, public_id, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(user_id.map(|u| u.as_i32()))
    .bind(buyer.full_name())
    .bind(buyer.email().as_str())
    .bind(buyer.phone())
    .bind(buyer.address())
    .bind(buyer.notes())
    .bind(OrderStatus::Pending.to_string())
    .bind(total)
    .fetch_one(&mut **tx)
    .await?;

    Ok(Order {
        id: atelier_core::OrderId::new(row.id),
        public_id: row.public_id,
        user_id,
        full_name: buyer.full_name().to_owned(),
        email: buyer.email().clone(),
        phone: buyer.phone().to_owned(),
        address: buyer.address().to_owned(),
        notes: buyer.notes().map(str::to_owned),
        status: OrderStatus::Pending,
        total_amount: total,
        cancel_reason: None,
        cancel_detail: None,
        cancelled_at: None,
        return_reason: None,
        return_detail: None,
        return_requested_at: None,
        return_approved_at: None,
        return_completed_at: None,
        refund_amount: None,
        refund_completed_at: None,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
