//! Cart repository.

use sqlx::PgPool;

use atelier_core::{CartId, CartLineId, Color, ProductId, Size, UserId};

use super::{RepositoryError, parse_column};
use crate::models::{Cart, CartLine, CartSummary, CartSummaryLine};

/// The single owner of a cart: a signed-in user or an anonymous session.
#[derive(Debug, Clone)]
pub enum CartOwner {
    User(UserId),
    Session(String),
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: Option<i32>,
    session_key: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            session_key: row.session_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    cart_id: i32,
    product_id: i32,
    size: String,
    color: String,
    quantity: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CartLineId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            product_id: ProductId::new(row.product_id),
            size: parse_column(&row.size, "size")?,
            color: parse_column(&row.color, "color")?,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SummaryLineRow {
    id: i32,
    product_id: i32,
    product_name: String,
    size: String,
    color: String,
    quantity: i32,
    unit_price: rust_decimal::Decimal,
}

const SELECT_CART: &str = "SELECT id, user_id, session_key, created_at, updated_at FROM shop.carts";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find the owner's cart, if one exists. Carts are created lazily.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, owner: &CartOwner) -> Result<Option<Cart>, RepositoryError> {
        let row = match owner {
            CartOwner::User(user_id) => {
                sqlx::query_as::<_, CartRow>(&format!("{SELECT_CART} WHERE user_id = $1"))
                    .bind(user_id.as_i32())
                    .fetch_optional(self.pool)
                    .await?
            }
            CartOwner::Session(key) => {
                sqlx::query_as::<_, CartRow>(&format!("{SELECT_CART} WHERE session_key = $1"))
                    .bind(key)
                    .fetch_optional(self.pool)
                    .await?
            }
        };
        Ok(row.map(Cart::from))
    }

    /// Get the owner's cart, creating it if absent.
    ///
    /// A concurrent create for the same owner loses the race on the partial
    /// unique index and falls back to the winner's row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the queries fail.
    pub async fn get_or_create(&self, owner: &CartOwner) -> Result<Cart, RepositoryError> {
        if let Some(cart) = self.find(owner).await? {
            return Ok(cart);
        }
        let inserted = match owner {
            CartOwner::User(user_id) => {
                sqlx::query_as::<_, CartRow>(
                    "INSERT INTO shop.carts (user_id) VALUES ($1)
                     RETURNING id, user_id, session_key, created_at, updated_at",
                )
                .bind(user_id.as_i32())
                .fetch_one(self.pool)
                .await
            }
            CartOwner::Session(key) => {
                sqlx::query_as::<_, CartRow>(
                    "INSERT INTO shop.carts (session_key) VALUES ($1)
                     RETURNING id, user_id, session_key, created_at, updated_at",
                )
                .bind(key)
                .fetch_one(self.pool)
                .await
            }
        };
        match inserted {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => self
                .find(owner)
                .await?
                .ok_or(RepositoryError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// All lines of a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored size/color is unknown.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT id, cart_id, product_id, size, color, quantity, created_at, updated_at
             FROM shop.cart_lines
             WHERE cart_id = $1
             ORDER BY id",
        )
        .bind(cart_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// The cart's lines joined with product names, priced at the current
    /// effective price, plus totals.
    ///
    /// # Errors
    ///
    /// Same as [`Self::lines`].
    pub async fn summary(&self, cart_id: CartId) -> Result<CartSummary, RepositoryError> {
        let rows = sqlx::query_as::<_, SummaryLineRow>(
            "SELECT cl.id, cl.product_id, p.name AS product_name, cl.size, cl.color,
                    cl.quantity, COALESCE(p.discount_price, p.price) AS unit_price
             FROM shop.cart_lines cl
             JOIN shop.products p ON p.id = cl.product_id
             WHERE cl.cart_id = $1
             ORDER BY cl.id",
        )
        .bind(cart_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let line_total = row.unit_price * rust_decimal::Decimal::from(row.quantity);
            lines.push(CartSummaryLine {
                line_id: CartLineId::new(row.id),
                product_id: ProductId::new(row.product_id),
                product_name: row.product_name,
                size: parse_column(&row.size, "size")?,
                color: parse_column(&row.color, "color")?,
                quantity: row.quantity,
                unit_price: row.unit_price,
                line_total,
            });
        }
        Ok(CartSummary::from_lines(cart_id, lines))
    }

    /// Add a variant to the cart, merging into an existing line for the same
    /// variant by incrementing its quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn add_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        size: Size,
        color: Color,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            "INSERT INTO shop.cart_lines (cart_id, product_id, size, color, quantity)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (cart_id, product_id, size, color)
             DO UPDATE SET quantity = shop.cart_lines.quantity + EXCLUDED.quantity,
                           updated_at = now()
             RETURNING id, cart_id, product_id, size, color, quantity, created_at, updated_at",
        )
        .bind(cart_id.as_i32())
        .bind(product_id.as_i32())
        .bind(size.as_str())
        .bind(color.as_str())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;
        row.try_into()
    }

    /// Overwrite a line's quantity. A quantity of zero or less deletes the
    /// line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this cart.
    pub async fn update_line(
        &self,
        cart_id: CartId,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = if quantity <= 0 {
            sqlx::query("DELETE FROM shop.cart_lines WHERE id = $1 AND cart_id = $2")
                .bind(line_id.as_i32())
                .bind(cart_id.as_i32())
                .execute(self.pool)
                .await?
        } else {
            sqlx::query(
                "UPDATE shop.cart_lines SET quantity = $3, updated_at = now()
                 WHERE id = $1 AND cart_id = $2",
            )
            .bind(line_id.as_i32())
            .bind(cart_id.as_i32())
            .bind(quantity)
            .execute(self.pool)
            .await?
        };
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in this cart.
    pub async fn remove_line(
        &self,
        cart_id: CartId,
        line_id: CartLineId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_lines WHERE id = $1 AND cart_id = $2")
            .bind(line_id.as_i32())
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Merge an anonymous session cart into the user's cart on login.
    ///
    /// Lines for a variant already in the user's cart add their quantities;
    /// other lines move over. The session cart is deleted. Returns the number
    /// of merged lines; no session cart is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn merge_session_cart(
        &self,
        session_key: &str,
        user_id: UserId,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let source_id: Option<i32> =
            sqlx::query_scalar("SELECT id FROM shop.carts WHERE session_key = $1 FOR UPDATE")
                .bind(session_key)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(source_id) = source_id else {
            return Ok(0);
        };

        let target_id: Option<i32> =
            sqlx::query_scalar("SELECT id FROM shop.carts WHERE user_id = $1 FOR UPDATE")
                .bind(user_id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;
        let target_id = match target_id {
            Some(id) => id,
            None => {
                sqlx::query_scalar("INSERT INTO shop.carts (user_id) VALUES ($1) RETURNING id")
                    .bind(user_id.as_i32())
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        let merged = sqlx::query(
            "INSERT INTO shop.cart_lines (cart_id, product_id, size, color, quantity)
             SELECT $2::int4, product_id, size, color, quantity
             FROM shop.cart_lines
             WHERE cart_id = $1
             ON CONFLICT (cart_id, product_id, size, color)
             DO UPDATE SET quantity = shop.cart_lines.quantity + EXCLUDED.quantity,
                           updated_at = now()",
        )
        .bind(source_id)
        .bind(target_id)
        .execute(&mut *tx)
        .await?;

        // Cascades to the source lines.
        sqlx::query("DELETE FROM shop.carts WHERE id = $1")
            .bind(source_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(merged.rows_affected())
    }
}
