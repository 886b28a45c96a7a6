//! Order lifecycle state machine over storage.
//!
//! Every status change funnels through [`OrderLifecycleService`]; there are
//! no ad-hoc status writes anywhere else. Each legal transition stamps its
//! timestamp, cancellation restores inventory, and refunding defaults the
//! refund amount to the order total.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use uuid::Uuid;

use atelier_core::{
    BulkOrderAction, CancelReason, OrderStatus, ProductId, ReturnReason, UserId,
    within_return_window,
};

use crate::db::inventory::apply_ledger_delta;
use crate::db::orders::{LockedOrder, lock_by_public_id};
use crate::db::products::recompute_stock;
use crate::db::{
    CartOwner, CartRepository, InventoryRepository, ProductRepository, RepositoryError,
    parse_column,
};

/// Errors from lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Order does not exist.
    #[error("order not found")]
    NotFound,

    /// The requested move is not a legal transition.
    #[error("cannot move order from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Return requested after the window closed; status unchanged.
    #[error("return window of {0} days has expired")]
    ReturnWindowExpired(i64),

    /// Reorder attempted on an order that is not delivered.
    #[error("only delivered orders can be reordered (order is {0})")]
    NotReorderable(OrderStatus),

    /// Storage-level failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Outcome of a bulk status action.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulkTransitionReport {
    pub succeeded: u32,
    pub total: u32,
}

/// Outcome of a reorder: lines merged into the cart vs. skipped.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ReorderReport {
    pub added: u32,
    pub skipped: u32,
}

/// Drives all order status changes.
pub struct OrderLifecycleService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderLifecycleService<'a> {
    /// Create a new lifecycle service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Buyer cancellation: pending or confirmed orders only. Restores every
    /// line's quantity, recreating missing ledger records, and captures the
    /// structured reason.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] for any other status.
    pub async fn cancel(
        &self,
        public_id: Uuid,
        reason: CancelReason,
        detail: Option<&str>,
    ) -> Result<(), LifecycleError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let order = require(lock_by_public_id(&mut tx, public_id).await?)?;
        check_transition(&order, OrderStatus::Cancelled)?;

        sqlx::query(
            "UPDATE shop.orders
             SET status = $2, cancel_reason = $3, cancel_detail = $4,
                 cancelled_at = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(order.id.as_i32())
        .bind(OrderStatus::Cancelled.to_string())
        .bind(reason.as_str())
        .bind(detail)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        restock_lines(&mut tx, &order).await?;
        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(order_id = %public_id, %reason, "order cancelled");
        Ok(())
    }

    /// Buyer return request: delivered orders only, within the return window
    /// measured from order creation.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::ReturnWindowExpired`] past the window; the
    /// order is left untouched.
    pub async fn request_return(
        &self,
        public_id: Uuid,
        reason: ReturnReason,
        detail: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let order = require(lock_by_public_id(&mut tx, public_id).await?)?;
        check_transition(&order, OrderStatus::ReturnRequested)?;
        if !within_return_window(order.created_at, now) {
            return Err(LifecycleError::ReturnWindowExpired(
                atelier_core::RETURN_WINDOW_DAYS,
            ));
        }

        sqlx::query(
            "UPDATE shop.orders
             SET status = $2, return_reason = $3, return_detail = $4,
                 return_requested_at = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(order.id.as_i32())
        .bind(OrderStatus::ReturnRequested.to_string())
        .bind(reason.as_str())
        .bind(detail)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(order_id = %public_id, %reason, "return requested");
        Ok(())
    }

    /// Move an order to `next` through the state machine, stamping the
    /// transition's timestamp. This is the admin single-order update; the
    /// named buyer flows add their reason capture on top of the same rules.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::IllegalTransition`] if the move is not legal
    /// from the order's current status.
    pub async fn update_status(
        &self,
        public_id: Uuid,
        next: OrderStatus,
    ) -> Result<(), LifecycleError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let order = require(lock_by_public_id(&mut tx, public_id).await?)?;
        check_transition(&order, next)?;

        apply_transition(&mut tx, &order, next).await?;
        if next == OrderStatus::Cancelled {
            restock_lines(&mut tx, &order).await?;
        }
        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(order_id = %public_id, from = %order.status, to = %next, "status updated");
        Ok(())
    }

    /// Refund with an explicit amount. `None` falls back to any amount
    /// already on the return sub-record, then to the order total.
    ///
    /// # Errors
    ///
    /// Same as [`Self::update_status`].
    pub async fn refund(
        &self,
        public_id: Uuid,
        amount: Option<Decimal>,
    ) -> Result<(), LifecycleError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let order = require(lock_by_public_id(&mut tx, public_id).await?)?;
        check_transition(&order, OrderStatus::Refunded)?;

        sqlx::query(
            "UPDATE shop.orders
             SET status = $2,
                 refund_amount = COALESCE($3, refund_amount, total_amount),
                 refund_completed_at = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(order.id.as_i32())
        .bind(OrderStatus::Refunded.to_string())
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(order_id = %public_id, "order refunded");
        Ok(())
    }

    /// Apply a bulk action to many orders. Each order's eligibility is
    /// checked independently; ineligible or missing orders are silently
    /// skipped. Reports how many of the requested orders succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Repository`] on structural failure; orders
    /// already transitioned stay transitioned.
    pub async fn bulk(
        &self,
        action: BulkOrderAction,
        public_ids: &[Uuid],
    ) -> Result<BulkTransitionReport, LifecycleError> {
        let mut succeeded = 0u32;
        for &public_id in public_ids {
            let result = if action == BulkOrderAction::MarkRefunded {
                self.refund(public_id, None).await
            } else {
                self.update_status(public_id, action.target()).await
            };
            match result {
                Ok(()) => succeeded += 1,
                Err(LifecycleError::IllegalTransition { .. } | LifecycleError::NotFound) => {}
                Err(e) => return Err(e),
            }
        }
        #[allow(clippy::cast_possible_truncation)]
        let total = public_ids.len() as u32;
        Ok(BulkTransitionReport { succeeded, total })
    }

    /// Merge a delivered order's lines back into the user's cart.
    ///
    /// Lines whose product is inactive or whose variant lacks sufficient
    /// inventory are skipped and counted; the rest land in the cart at
    /// current prices.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotReorderable`] unless the order is
    /// delivered.
    pub async fn reorder(
        &self,
        public_id: Uuid,
        user_id: UserId,
    ) -> Result<ReorderReport, LifecycleError> {
        let orders = crate::db::OrderRepository::new(self.pool);
        let order = orders
            .get_by_public_id(public_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;
        if order.status != OrderStatus::Delivered {
            return Err(LifecycleError::NotReorderable(order.status));
        }

        let products = ProductRepository::new(self.pool);
        let inventory = InventoryRepository::new(self.pool);
        let carts = CartRepository::new(self.pool);
        let cart = carts.get_or_create(&CartOwner::User(user_id)).await?;

        let mut report = ReorderReport::default();
        for line in orders.lines(order.id).await? {
            let Some(product) = products.get_active(line.product_id).await? else {
                report.skipped += 1;
                continue;
            };
            let available = inventory
                .get_quantity(product.id, line.size, line.color)
                .await?;
            if available < line.quantity {
                report.skipped += 1;
                continue;
            }
            carts
                .add_line(cart.id, product.id, line.size, line.color, line.quantity)
                .await?;
            report.added += 1;
        }
        tracing::info!(order_id = %public_id, added = report.added, skipped = report.skipped, "reorder");
        Ok(report)
    }
}

fn require(order: Option<LockedOrder>) -> Result<LockedOrder, LifecycleError> {
    order.ok_or(LifecycleError::NotFound)
}

fn check_transition(order: &LockedOrder, next: OrderStatus) -> Result<(), LifecycleError> {
    if order.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(LifecycleError::IllegalTransition {
            from: order.status,
            to: next,
        })
    }
}

/// Write `next` plus the timestamp that transition stamps.
async fn apply_transition(
    tx: &mut Transaction<'_, Postgres>,
    order: &LockedOrder,
    next: OrderStatus,
) -> Result<(), RepositoryError> {
    let stamp = match next {
        OrderStatus::Cancelled => ", cancelled_at = now()",
        OrderStatus::ReturnRequested => ", return_requested_at = now()",
        OrderStatus::ReturnApproved => ", return_approved_at = now()",
        OrderStatus::Returned => ", return_completed_at = now()",
        OrderStatus::Refunded => {
            ", refund_amount = COALESCE(refund_amount, total_amount), refund_completed_at = now()"
        }
        _ => "",
    };
    sqlx::query(&format!(
        "UPDATE shop.orders SET status = $2, updated_at = now(){stamp} WHERE id = $1"
    ))
    .bind(order.id.as_i32())
    .bind(next.to_string())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Put every line's quantity back on the ledger, recreating missing records,
/// then recompute stock for the touched products.
async fn restock_lines(
    tx: &mut Transaction<'_, Postgres>,
    order: &LockedOrder,
) -> Result<(), RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct Line {
        product_id: i32,
        product_name: String,
        size: String,
        color: String,
        quantity: i32,
    }

    // Every ledger transaction locks product rows before inventory rows.
    sqlx::query(
        "SELECT id FROM shop.products
         WHERE id IN (SELECT product_id FROM shop.order_lines WHERE order_id = $1)
         ORDER BY id
         FOR UPDATE",
    )
    .bind(order.id.as_i32())
    .execute(&mut **tx)
    .await?;

    let lines = sqlx::query_as::<_, Line>(
        "SELECT product_id, product_name, size, color, quantity
         FROM shop.order_lines WHERE order_id = $1",
    )
    .bind(order.id.as_i32())
    .fetch_all(&mut **tx)
    .await?;

    let mut touched: HashSet<i32> = HashSet::new();
    for line in lines {
        let size = parse_column(&line.size, "size")?;
        let color = parse_column(&line.color, "color")?;
        apply_ledger_delta(
            tx,
            ProductId::new(line.product_id),
            &line.product_name,
            size,
            color,
            line.quantity,
        )
        .await?;
        touched.insert(line.product_id);
    }
    for product_id in touched {
        recompute_stock(tx, ProductId::new(product_id)).await?;
    }
    Ok(())
}
