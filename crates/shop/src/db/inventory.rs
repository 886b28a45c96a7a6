//! Variant inventory ledger repository.
//!
//! One row per (product, size, color). Quantities are signed: checkout may
//! drive a cell negative and the deficit stays on the books until an admin
//! reconciles it. Every write here recomputes the owning product's
//! materialized `stock` inside the same transaction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

use atelier_core::{Color, InventoryRecordId, ProductId, Size, slug};

use super::products::recompute_stock;
use super::{RepositoryError, parse_column};
use crate::models::InventoryRecord;

/// At most this many per-cell error messages are surfaced by a bulk run;
/// the rest are only counted.
pub const MAX_SURFACED_ERRORS: usize = 5;

const MAX_SKU_ATTEMPTS: u32 = 10_000;

#[derive(sqlx::FromRow)]
struct InventoryRow {
    id: i32,
    product_id: i32,
    size: String,
    color: String,
    sku: String,
    quantity: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<InventoryRow> for InventoryRecord {
    type Error = RepositoryError;

    fn try_from(row: InventoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: InventoryRecordId::new(row.id),
            product_id: ProductId::new(row.product_id),
            size: parse_column(&row.size, "size")?,
            color: parse_column(&row.color, "color")?,
            sku: row.sku,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_RECORD: &str = "
    SELECT id, product_id, size, color, sku, quantity, created_at, updated_at
    FROM shop.inventory_records
";

/// Quantity operation applied by single and bulk adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOp {
    Set,
    Add,
    Subtract,
}

impl std::fmt::Display for BulkOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Set => "set",
            Self::Add => "add",
            Self::Subtract => "subtract",
        };
        f.write_str(s)
    }
}

/// Stock-level filter for admin listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFilter {
    OutOfStock,
    LowStock,
    InStock,
}

/// Admin listing filter. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct InventoryFilter {
    pub product_id: Option<ProductId>,
    pub size: Option<Size>,
    pub color: Option<Color>,
    pub stock: Option<StockFilter>,
}

/// Outcome of a bulk adjustment run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkAdjustReport {
    pub created: u32,
    pub updated: u32,
    pub rejected: u32,
    /// First [`MAX_SURFACED_ERRORS`] per-cell error messages.
    pub errors: Vec<String>,
    /// Error messages beyond the surfaced cap, counted only.
    pub suppressed: u32,
}

impl BulkAdjustReport {
    fn reject(&mut self, message: String) {
        self.rejected += 1;
        if self.errors.len() < MAX_SURFACED_ERRORS {
            self.errors.push(message);
        } else {
            self.suppressed += 1;
        }
    }
}

/// One existing cell reported by a conflict preview.
#[derive(Debug, Clone, Serialize)]
pub struct ExistingCell {
    pub size: Size,
    pub color: Color,
    pub quantity: i32,
    pub sku: String,
}

/// One cell a planned bulk operation would create.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedCell {
    pub size: Size,
    pub color: Color,
    pub preview_sku: String,
}

/// Preview of which cells of a planned bulk operation already exist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictPreview {
    pub existing: Vec<ExistingCell>,
    pub to_create: Vec<PlannedCell>,
}

/// Repository for inventory ledger operations.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryRepository<'a> {
    /// Create a new inventory repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Quantity on hand for one variant. An absent record reads as 0.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_quantity(
        &self,
        product_id: ProductId,
        size: Size,
        color: Color,
    ) -> Result<i32, RepositoryError> {
        let quantity: Option<i32> = sqlx::query_scalar(
            "SELECT quantity FROM shop.inventory_records
             WHERE product_id = $1 AND size = $2 AND color = $3",
        )
        .bind(product_id.as_i32())
        .bind(size.as_str())
        .bind(color.as_str())
        .fetch_optional(self.pool)
        .await?;
        Ok(quantity.unwrap_or(0))
    }

    /// Get a ledger record by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored size/color is unknown.
    pub async fn get(
        &self,
        id: InventoryRecordId,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!("{SELECT_RECORD} WHERE id = $1"))
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        row.map(InventoryRecord::try_from).transpose()
    }

    /// Find the record for one variant, if stocked.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn find_variant(
        &self,
        product_id: ProductId,
        size: Size,
        color: Color,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "{SELECT_RECORD} WHERE product_id = $1 AND size = $2 AND color = $3"
        ))
        .bind(product_id.as_i32())
        .bind(size.as_str())
        .bind(color.as_str())
        .fetch_optional(self.pool)
        .await?;
        row.map(InventoryRecord::try_from).transpose()
    }

    /// List ledger records matching `filter`, ordered by product and variant.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get`].
    pub async fn list(
        &self,
        filter: InventoryFilter,
    ) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let stock_clause = match filter.stock {
            None => "TRUE",
            Some(StockFilter::OutOfStock) => "quantity <= 0",
            Some(StockFilter::LowStock) => "quantity BETWEEN 1 AND 5",
            Some(StockFilter::InStock) => "quantity > 0",
        };
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            "{SELECT_RECORD}
             WHERE ($1::int4 IS NULL OR product_id = $1)
               AND ($2::text IS NULL OR size = $2)
               AND ($3::text IS NULL OR color = $3)
               AND {stock_clause}
             ORDER BY product_id, size, color"
        ))
        .bind(filter.product_id.map(|p| p.as_i32()))
        .bind(filter.size.map(Size::as_str))
        .bind(filter.color.map(Color::as_str))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(InventoryRecord::try_from).collect()
    }

    /// Create a ledger record for a new variant with a freshly generated SKU.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the variant is outside the
    /// product's capability set, already stocked, or the SKU insert races.
    pub async fn create(
        &self,
        product_id: ProductId,
        size: Size,
        color: Color,
        quantity: i32,
    ) -> Result<InventoryRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let product = lock_product(&mut tx, product_id).await?;
        if !product.allows(size, color) {
            return Err(RepositoryError::Conflict(format!(
                "variant {size}/{color} is not in the product's capability set"
            )));
        }
        let sku = generate_unique_sku(&mut tx, &product.name, color, size).await?;
        let record = insert_record(&mut tx, product_id, size, color, &sku, quantity).await?;
        recompute_stock(&mut tx, product_id).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Apply `op` with `amount` to one existing record. `subtract` floors
    /// at 0; deficits are only ever produced by checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    pub async fn adjust(
        &self,
        id: InventoryRecordId,
        op: BulkOp,
        amount: i32,
    ) -> Result<InventoryRecord, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "{SELECT_RECORD} WHERE id = $1 FOR UPDATE"
        ))
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let new_quantity = apply_op(row.quantity, op, amount);
        let updated = sqlx::query_as::<_, InventoryRow>(
            "UPDATE shop.inventory_records
             SET quantity = $2, updated_at = now()
             WHERE id = $1
             RETURNING id, product_id, size, color, sku, quantity, created_at, updated_at",
        )
        .bind(id.as_i32())
        .bind(new_quantity)
        .fetch_one(&mut *tx)
        .await?;
        recompute_stock(&mut tx, ProductId::new(updated.product_id)).await?;
        tx.commit().await?;
        updated.try_into()
    }

    /// Delete a ledger record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    pub async fn delete(&self, id: InventoryRecordId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let product_id: Option<i32> = sqlx::query_scalar(
            "DELETE FROM shop.inventory_records WHERE id = $1 RETURNING product_id",
        )
        .bind(id.as_i32())
        .fetch_optional(&mut *tx)
        .await?;
        let Some(product_id) = product_id else {
            return Err(RepositoryError::NotFound);
        };
        recompute_stock(&mut tx, ProductId::new(product_id)).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Apply `op` with `amount` across the sizes x colors Cartesian product.
    ///
    /// Runs in one transaction. `set`/`add` on a missing cell creates the
    /// record with a fresh SKU; `subtract` on a missing cell is a per-cell
    /// rejection that never aborts sibling cells. Cells outside the product's
    /// capability set are rejected the same way. The product's stock is
    /// recomputed once before commit.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Structural database failures abort the whole run.
    pub async fn bulk_adjust(
        &self,
        product_id: ProductId,
        sizes: &[Size],
        colors: &[Color],
        op: BulkOp,
        amount: i32,
    ) -> Result<BulkAdjustReport, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let product = lock_product(&mut tx, product_id).await?;

        let mut report = BulkAdjustReport::default();
        for &size in sizes {
            for &color in colors {
                if !product.allows(size, color) {
                    report.reject(format!(
                        "variant {size}/{color} is not in the product's capability set"
                    ));
                    continue;
                }
                let existing: Option<i32> = sqlx::query_scalar(
                    "SELECT quantity FROM shop.inventory_records
                     WHERE product_id = $1 AND size = $2 AND color = $3
                     FOR UPDATE",
                )
                .bind(product_id.as_i32())
                .bind(size.as_str())
                .bind(color.as_str())
                .fetch_optional(&mut *tx)
                .await?;

                match existing {
                    Some(quantity) => {
                        let new_quantity = apply_op(quantity, op, amount);
                        sqlx::query(
                            "UPDATE shop.inventory_records
                             SET quantity = $4, updated_at = now()
                             WHERE product_id = $1 AND size = $2 AND color = $3",
                        )
                        .bind(product_id.as_i32())
                        .bind(size.as_str())
                        .bind(color.as_str())
                        .bind(new_quantity)
                        .execute(&mut *tx)
                        .await?;
                        report.updated += 1;
                    }
                    None if op == BulkOp::Subtract => {
                        report.reject(format!("cannot subtract from missing variant {size}/{color}"));
                    }
                    None => {
                        let sku = generate_unique_sku(&mut tx, &product.name, color, size).await?;
                        insert_record(&mut tx, product_id, size, color, &sku, amount).await?;
                        report.created += 1;
                    }
                }
            }
        }

        recompute_stock(&mut tx, product_id).await?;
        tx.commit().await?;
        Ok(report)
    }

    /// Preview a planned bulk operation without writing anything.
    ///
    /// Reports which cells already exist (with current quantity and SKU) and
    /// which would be created, with the SKU each creation would receive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn check_conflicts(
        &self,
        product_id: ProductId,
        sizes: &[Size],
        colors: &[Color],
    ) -> Result<ConflictPreview, RepositoryError> {
        let name: Option<String> =
            sqlx::query_scalar("SELECT name FROM shop.products WHERE id = $1")
                .bind(product_id.as_i32())
                .fetch_optional(self.pool)
                .await?;
        let name = name.ok_or(RepositoryError::NotFound)?;

        let mut preview = ConflictPreview::default();
        // SKUs handed out earlier in this preview count as taken too.
        let mut reserved: HashSet<String> = HashSet::new();
        for &size in sizes {
            for &color in colors {
                let row = self.find_variant(product_id, size, color).await?;
                if let Some(record) = row {
                    preview.existing.push(ExistingCell {
                        size,
                        color,
                        quantity: record.quantity,
                        sku: record.sku,
                    });
                } else {
                    let base = slug::sku_base(&name, color, size);
                    let mut candidate = None;
                    for suffix in 0..MAX_SKU_ATTEMPTS {
                        let c = slug::sku_candidate(&base, suffix);
                        if !reserved.contains(&c) && !self.sku_exists(&c).await? {
                            candidate = Some(c);
                            break;
                        }
                    }
                    // Same exhaustion rule as the write paths.
                    let candidate = candidate.ok_or_else(|| {
                        RepositoryError::Conflict(format!(
                            "could not find a free SKU for base '{base}'"
                        ))
                    })?;
                    reserved.insert(candidate.clone());
                    preview.to_create.push(PlannedCell {
                        size,
                        color,
                        preview_sku: candidate,
                    });
                }
            }
        }
        Ok(preview)
    }

    /// Regenerate SKUs for records whose SKU is empty or duplicated.
    ///
    /// The lowest-id holder of each duplicated SKU keeps it; later holders
    /// and every empty-SKU record get a fresh one. Runs as a single
    /// transaction and returns the number of repaired records.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn repair_skus(&self) -> Result<u64, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct BrokenRow {
            id: i32,
            name: String,
            size: String,
            color: String,
            sku: String,
        }

        let mut tx = self.pool.begin().await?;
        let broken = sqlx::query_as::<_, BrokenRow>(
            "
            SELECT ir.id, p.name, ir.size, ir.color, ir.sku
            FROM shop.inventory_records ir
            JOIN shop.products p ON p.id = ir.product_id
            WHERE ir.sku = ''
               OR EXISTS (
                      SELECT 1 FROM shop.inventory_records other
                      WHERE other.sku = ir.sku AND other.id < ir.id
                  )
            ORDER BY ir.id
            FOR UPDATE OF ir
            ",
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut repaired = 0u64;
        for row in broken {
            let size: Size = parse_column(&row.size, "size")?;
            let color: Color = parse_column(&row.color, "color")?;
            let sku = generate_unique_sku(&mut tx, &row.name, color, size).await?;
            sqlx::query(
                "UPDATE shop.inventory_records SET sku = $2, updated_at = now() WHERE id = $1",
            )
            .bind(row.id)
            .bind(&sku)
            .execute(&mut *tx)
            .await?;
            tracing::info!(record_id = row.id, old_sku = %row.sku, new_sku = %sku, "repaired SKU");
            repaired += 1;
        }
        tx.commit().await?;
        Ok(repaired)
    }

    async fn sku_exists(&self, sku: &str) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shop.inventory_records WHERE sku = $1)",
        )
        .bind(sku)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }
}

/// Quantity arithmetic shared by single and bulk adjustments. Admin
/// `subtract` can never take a cell below zero.
const fn apply_op(current: i32, op: BulkOp, amount: i32) -> i32 {
    match op {
        BulkOp::Set => amount,
        BulkOp::Add => current + amount,
        BulkOp::Subtract => {
            let next = current - amount;
            if next < 0 { 0 } else { next }
        }
    }
}

struct LockedProduct {
    name: String,
    allowed_sizes: Vec<Size>,
    allowed_colors: Vec<Color>,
}

impl LockedProduct {
    fn allows(&self, size: Size, color: Color) -> bool {
        self.allowed_sizes.contains(&size) && self.allowed_colors.contains(&color)
    }
}

/// Lock a product row for the duration of a ledger transaction.
async fn lock_product(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
) -> Result<LockedProduct, RepositoryError> {
    #[derive(sqlx::FromRow)]
    struct Row {
        name: String,
        allowed_sizes: Vec<String>,
        allowed_colors: Vec<String>,
    }

    let row = sqlx::query_as::<_, Row>(
        "SELECT name, allowed_sizes, allowed_colors FROM shop.products WHERE id = $1 FOR UPDATE",
    )
    .bind(product_id.as_i32())
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(LockedProduct {
        name: row.name,
        allowed_sizes: row
            .allowed_sizes
            .iter()
            .map(|s| parse_column(s, "size"))
            .collect::<Result<_, _>>()?,
        allowed_colors: row
            .allowed_colors
            .iter()
            .map(|c| parse_column(c, "color"))
            .collect::<Result<_, _>>()?,
    })
}

/// Generate a ledger-wide unique SKU inside the caller's transaction.
///
/// Base token, then `-1`, `-2`, ... re-checking uniqueness on every attempt.
/// A concurrent insert slipping between check and insert still hits the
/// UNIQUE constraint, which callers surface as a retryable `Conflict`.
pub(crate) async fn generate_unique_sku(
    tx: &mut Transaction<'_, Postgres>,
    product_name: &str,
    color: Color,
    size: Size,
) -> Result<String, RepositoryError> {
    let base = slug::sku_base(product_name, color, size);
    for suffix in 0..MAX_SKU_ATTEMPTS {
        let candidate = slug::sku_candidate(&base, suffix);
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM shop.inventory_records WHERE sku = $1)",
        )
        .bind(&candidate)
        .fetch_one(&mut **tx)
        .await?;
        if !exists {
            return Ok(candidate);
        }
    }
    Err(RepositoryError::Conflict(format!(
        "could not find a free SKU for base '{base}'"
    )))
}

/// Insert a fresh ledger record, mapping unique violations to `Conflict`.
pub(crate) async fn insert_record(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    size: Size,
    color: Color,
    sku: &str,
    quantity: i32,
) -> Result<InventoryRecord, RepositoryError> {
    let row = sqlx::query_as::<_, InventoryRow>(
        "INSERT INTO shop.inventory_records (product_id, size, color, sku, quantity)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, product_id, size, color, sku, quantity, created_at, updated_at",
    )
    .bind(product_id.as_i32())
    .bind(size.as_str())
    .bind(color.as_str())
    .bind(sku)
    .bind(quantity)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict("variant or SKU already exists".to_owned());
        }
        RepositoryError::Database(e)
    })?;
    row.try_into()
}

/// Apply a signed delta to one variant for checkout/cancel paths.
///
/// Unlike admin adjustments this may drive the quantity negative, and a
/// missing record is created on the spot (with a fresh SKU) holding the
/// delta itself. Runs on the caller's transaction; the caller recomputes
/// product stock before commit.
pub(crate) async fn apply_ledger_delta(
    tx: &mut Transaction<'_, Postgres>,
    product_id: ProductId,
    product_name: &str,
    size: Size,
    color: Color,
    delta: i32,
) -> Result<(), RepositoryError> {
    let updated = sqlx::query(
        "UPDATE shop.inventory_records
         SET quantity = quantity + $4, updated_at = now()
         WHERE product_id = $1 AND size = $2 AND color = $3",
    )
    .bind(product_id.as_i32())
    .bind(size.as_str())
    .bind(color.as_str())
    .bind(delta)
    .execute(&mut **tx)
    .await?;

    if updated.rows_affected() == 0 {
        let sku = generate_unique_sku(tx, product_name, color, size).await?;
        insert_record(tx, product_id, size, color, &sku, delta).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_op() {
        assert_eq!(apply_op(3, BulkOp::Set, 10), 10);
        assert_eq!(apply_op(3, BulkOp::Add, 4), 7);
        assert_eq!(apply_op(10, BulkOp::Subtract, 4), 6);
    }

    #[test]
    fn test_subtract_floors_at_zero() {
        assert_eq!(apply_op(3, BulkOp::Subtract, 10), 0);
        assert_eq!(apply_op(0, BulkOp::Subtract, 1), 0);
    }

    #[test]
    fn test_report_surfaces_at_most_five_errors() {
        let mut report = BulkAdjustReport::default();
        for i in 0..8 {
            report.reject(format!("cell {i}"));
        }
        assert_eq!(report.rejected, 8);
        assert_eq!(report.errors.len(), MAX_SURFACED_ERRORS);
        assert_eq!(report.suppressed, 3);
    }
}
