//! Order repository (reads and small edits).
//!
//! Status changes never happen here; they go through
//! [`crate::services::lifecycle`], which owns the transition rules and their
//! timestamp side effects.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use atelier_core::{
    CancelReason, Email, OrderId, OrderLineId, OrderStatus, ProductId, ReturnReason, UserId,
};

use super::{RepositoryError, parse_column};
use crate::models::{Order, OrderLine};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    public_id: Uuid,
    user_id: Option<i32>,
    full_name: String,
    email: String,
    phone: String,
    address: String,
    notes: Option<String>,
    status: String,
    total_amount: Decimal,
    cancel_reason: Option<String>,
    cancel_detail: Option<String>,
    cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
    return_reason: Option<String>,
    return_detail: Option<String>,
    return_requested_at: Option<chrono::DateTime<chrono::Utc>>,
    return_approved_at: Option<chrono::DateTime<chrono::Utc>>,
    return_completed_at: Option<chrono::DateTime<chrono::Utc>>,
    refund_amount: Option<Decimal>,
    refund_completed_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let cancel_reason = row
            .cancel_reason
            .as_deref()
            .map(|r| parse_column::<CancelReason>(r, "cancel reason"))
            .transpose()?;
        let return_reason = row
            .return_reason
            .as_deref()
            .map(|r| parse_column::<ReturnReason>(r, "return reason"))
            .transpose()?;
        Ok(Self {
            id: OrderId::new(row.id),
            public_id: row.public_id,
            user_id: row.user_id.map(UserId::new),
            full_name: row.full_name,
            email,
            phone: row.phone,
            address: row.address,
            notes: row.notes,
            status: parse_column(&row.status, "order status")?,
            total_amount: row.total_amount,
            cancel_reason,
            cancel_detail: row.cancel_detail,
            cancelled_at: row.cancelled_at,
            return_reason,
            return_detail: row.return_detail,
            return_requested_at: row.return_requested_at,
            return_approved_at: row.return_approved_at,
            return_completed_at: row.return_completed_at,
            refund_amount: row.refund_amount,
            refund_completed_at: row.refund_completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderLineRow {
    id: i32,
    order_id: i32,
    product_id: i32,
    product_name: String,
    size: String,
    color: String,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderLineId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            size: parse_column(&row.size, "size")?,
            color: parse_column(&row.color, "color")?,
            quantity: row.quantity,
            unit_price: row.unit_price,
        })
    }
}

const SELECT_ORDER: &str = "
    SELECT id, public_id, user_id, full_name, email, phone, address, notes,
           status, total_amount,
           cancel_reason, cancel_detail, cancelled_at,
           return_reason, return_detail, return_requested_at, return_approved_at,
           return_completed_at, refund_amount, refund_completed_at,
           created_at, updated_at
    FROM shop.orders
";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order by its public UUID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status, reason
    /// or email is invalid.
    pub async fn get_by_public_id(&self, public_id: Uuid) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_ORDER} WHERE public_id = $1"))
            .bind(public_id)
            .fetch_optional(self.pool)
            .await?;
        row.map(Order::try_from).transpose()
    }

    /// All lines of an order.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_by_public_id`].
    pub async fn lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT id, order_id, product_id, product_name, size, color, quantity, unit_price
             FROM shop.order_lines
             WHERE order_id = $1
             ORDER BY id",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(OrderLine::try_from).collect()
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_by_public_id`].
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{SELECT_ORDER} WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    /// Admin edit of the return sub-record: reason, free-text detail and
    /// refund amount. Fields passed as `None` are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_return_info(
        &self,
        public_id: Uuid,
        return_reason: Option<ReturnReason>,
        return_detail: Option<&str>,
        refund_amount: Option<Decimal>,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE shop.orders
             SET return_reason = COALESCE($2, return_reason),
                 return_detail = COALESCE($3, return_detail),
                 refund_amount = COALESCE($4, refund_amount),
                 updated_at = now()
             WHERE public_id = $1
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(public_id)
        .bind(return_reason.map(|r| r.as_str()))
        .bind(return_detail)
        .bind(refund_amount)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }
}

const SELECT_COLUMNS: &str = "
    id, public_id, user_id, full_name, email, phone, address, notes,
    status, total_amount,
    cancel_reason, cancel_detail, cancelled_at,
    return_reason, return_detail, return_requested_at, return_approved_at,
    return_completed_at, refund_amount, refund_completed_at,
    created_at, updated_at
";

/// Order header loaded and row-locked for a status transition.
pub(crate) struct LockedOrder {
    pub id: OrderId,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Lock an order header by public id inside the caller's transaction.
pub(crate) async fn lock_by_public_id(
    tx: &mut Transaction<'_, Postgres>,
    public_id: Uuid,
) -> Result<Option<LockedOrder>, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: i32,
        status: String,
        created_at: chrono::DateTime<chrono::Utc>,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT id, status, created_at
         FROM shop.orders WHERE public_id = $1 FOR UPDATE",
    )
    .bind(public_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(|r| {
        Ok(LockedOrder {
            id: OrderId::new(r.id),
            status: parse_column(&r.status, "order status")?,
            created_at: r.created_at,
        })
    })
    .transpose()
}
