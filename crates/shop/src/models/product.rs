//! Product catalog model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use atelier_core::{Color, ProductId, Size};

/// A catalog product.
///
/// `stock` is a materialized aggregate: it always equals the sum of the
/// product's inventory record quantities and is recomputed by the
/// repositories after every ledger write.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    pub discount_price: Option<Decimal>,
    pub stock: i32,
    /// Sizes this product can be stocked in.
    pub allowed_sizes: Vec<Size>,
    /// Colors this product can be stocked in.
    pub allowed_colors: Vec<Color>,
    pub is_featured: bool,
    pub is_hot_trend: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer pays right now.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }

    /// Whether this product may be stocked in the given variant.
    #[must_use]
    pub fn allows_variant(&self, size: Size, color: Color) -> bool {
        self.allowed_sizes.contains(&size) && self.allowed_colors.contains(&color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: &str, discount: Option<&str>) -> Product {
        #[allow(clippy::unwrap_used)]
        Product {
            id: ProductId::new(1),
            name: "Wool Overcoat".to_owned(),
            slug: "wool-overcoat".to_owned(),
            description: String::new(),
            price: price.parse().unwrap(),
            discount_price: discount.map(|d| d.parse().unwrap()),
            stock: 0,
            allowed_sizes: vec![Size::S, Size::M, Size::L],
            allowed_colors: vec![Color::Navy, Color::Black],
            is_featured: false,
            is_hot_trend: false,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let p = product("120.00", Some("89.50"));
        assert_eq!(p.effective_price().to_string(), "89.50");
        let p = product("120.00", None);
        assert_eq!(p.effective_price().to_string(), "120.00");
    }

    #[test]
    fn test_allows_variant_checks_both_axes() {
        let p = product("10.00", None);
        assert!(p.allows_variant(Size::M, Color::Navy));
        assert!(!p.allows_variant(Size::Xxl, Color::Navy));
        assert!(!p.allows_variant(Size::M, Color::Pink));
    }
}
