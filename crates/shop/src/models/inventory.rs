//! Variant inventory ledger model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{Color, InventoryRecordId, ProductId, Size};

const LOW_STOCK_THRESHOLD: i32 = 5;

/// One (product, size, color) cell of the inventory ledger.
///
/// `quantity` is signed: a negative value records an oversell deficit from
/// checkout and is preserved until an admin reconciles it. The SKU is stable
/// once assigned and unique across the whole ledger.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRecord {
    pub id: InventoryRecordId,
    pub product_id: ProductId,
    pub size: Size,
    pub color: Color,
    pub sku: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity > 0 && self.quantity <= LOW_STOCK_THRESHOLD
    }

    /// Whether checkout has oversold this variant.
    #[must_use]
    pub const fn is_deficit(&self) -> bool {
        self.quantity < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(quantity: i32) -> InventoryRecord {
        InventoryRecord {
            id: InventoryRecordId::new(1),
            product_id: ProductId::new(1),
            size: Size::M,
            color: Color::Black,
            sku: "tee-black-m".to_owned(),
            quantity,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_helpers() {
        assert!(record(10).is_in_stock());
        assert!(!record(10).is_low_stock());
        assert!(record(5).is_low_stock());
        assert!(record(1).is_low_stock());
        assert!(!record(0).is_in_stock());
        assert!(!record(0).is_low_stock());
    }

    #[test]
    fn test_deficit() {
        assert!(record(-2).is_deficit());
        assert!(!record(-2).is_in_stock());
        assert!(!record(0).is_deficit());
    }
}
