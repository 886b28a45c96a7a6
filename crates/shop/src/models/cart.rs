//! Cart and cart line models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use atelier_core::{CartId, CartLineId, Color, ProductId, Size, UserId};

/// A shopping cart, owned by exactly one of a user or an anonymous session.
///
/// The XOR of `user_id` / `session_key` is enforced by a database CHECK; the
/// model keeps both optional and lets the repository uphold the constraint.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: Option<UserId>,
    pub session_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One variant line in a cart. Prices stay live until checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub size: Size,
    pub color: Color,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with its product, priced at the current effective price.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummaryLine {
    pub line_id: CartLineId,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: Size,
    pub color: Color,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A cart with its lines resolved and totalled.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub cart_id: CartId,
    pub lines: Vec<CartSummaryLine>,
    pub total_items: i64,
    pub total_price: Decimal,
}

impl CartSummary {
    /// An empty summary for a cart with no lines.
    #[must_use]
    pub const fn empty(cart_id: CartId) -> Self {
        Self {
            cart_id,
            lines: Vec::new(),
            total_items: 0,
            total_price: Decimal::ZERO,
        }
    }

    /// Build a summary from resolved lines.
    #[must_use]
    pub fn from_lines(cart_id: CartId, lines: Vec<CartSummaryLine>) -> Self {
        let total_items = lines.iter().map(|l| i64::from(l.quantity)).sum();
        let total_price = lines.iter().map(|l| l.line_total).sum();
        Self {
            cart_id,
            lines,
            total_items,
            total_price,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, unit_price: &str) -> CartSummaryLine {
        #[allow(clippy::unwrap_used)]
        let unit_price: Decimal = unit_price.parse().unwrap();
        CartSummaryLine {
            line_id: CartLineId::new(1),
            product_id: ProductId::new(1),
            product_name: "Linen Shirt".to_owned(),
            size: Size::M,
            color: Color::White,
            quantity,
            unit_price,
            line_total: unit_price * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = CartSummary::from_lines(
            CartId::new(7),
            vec![line(2, "45.00"), line(1, "120.50")],
        );
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_price.to_string(), "210.50");
        assert!(!summary.is_empty());
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::empty(CartId::new(7));
        assert!(summary.is_empty());
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_price, Decimal::ZERO);
    }
}
