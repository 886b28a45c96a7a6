//! Product repository.

use sqlx::PgPool;

use atelier_core::ProductId;

use super::{RepositoryError, parse_column};
use crate::models::Product;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    slug: String,
    description: String,
    price: rust_decimal::Decimal,
    discount_price: Option<rust_decimal::Decimal>,
    stock: i32,
    allowed_sizes: Vec<String>,
    allowed_colors: Vec<String>,
    is_featured: bool,
    is_hot_trend: bool,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let allowed_sizes = row
            .allowed_sizes
            .iter()
            .map(|s| parse_column(s, "size"))
            .collect::<Result<_, _>>()?;
        let allowed_colors = row
            .allowed_colors
            .iter()
            .map(|c| parse_column(c, "color"))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: row.price,
            discount_price: row.discount_price,
            stock: row.stock,
            allowed_sizes,
            allowed_colors,
            is_featured: row.is_featured,
            is_hot_trend: row.is_hot_trend,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_PRODUCT: &str = "
    SELECT id, name, slug, description, price, discount_price, stock,
           allowed_sizes, allowed_colors, is_featured, is_hot_trend, is_active,
           created_at, updated_at
    FROM shop.products
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored capability value
    /// is not a known size or color.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{SELECT_PRODUCT} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        row.map(Product::try_from).transpose()
    }

    /// Get an active product by its ID. Inactive products read as absent.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn get_active(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "{SELECT_PRODUCT} WHERE id = $1 AND is_active"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        row.map(Product::try_from).transpose()
    }

    /// Recompute the materialized `stock` column for every product.
    ///
    /// Used by the CLI after manual data surgery. Returns the number of
    /// products whose stock changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn recount_all_stock(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "
            UPDATE shop.products p
            SET stock = COALESCE(agg.total, 0), updated_at = now()
            FROM (
                SELECT pr.id, SUM(ir.quantity) AS total
                FROM shop.products pr
                LEFT JOIN shop.inventory_records ir ON ir.product_id = pr.id
                GROUP BY pr.id
            ) agg
            WHERE p.id = agg.id AND p.stock IS DISTINCT FROM COALESCE(agg.total, 0)
            ",
        )
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Recompute one product's materialized `stock` from its ledger rows.
///
/// Runs on the caller's transaction so the aggregate commits atomically with
/// the ledger write that invalidated it.
pub(crate) async fn recompute_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    product_id: ProductId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "
        UPDATE shop.products
        SET stock = COALESCE(
                (SELECT SUM(quantity) FROM shop.inventory_records WHERE product_id = $1), 0),
            updated_at = now()
        WHERE id = $1
        ",
    )
    .bind(product_id.as_i32())
    .execute(&mut **tx)
    .await?;
    Ok(())
}
