//! Integration tests for cart totals, buyer validation, and variant
//! capability checks.

use chrono::Utc;
use rust_decimal::Decimal;

use atelier_core::{CartId, CartLineId, Color, ProductId, Size};
use atelier_shop::models::{
    BuyerInfo, BuyerInfoError, CartSummary, CartSummaryLine, Product,
};

fn price(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

fn summary_line(quantity: i32, unit_price: &str) -> CartSummaryLine {
    let unit_price = price(unit_price);
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

fn product() -> Product {
    Product {
        id: ProductId::new(1),
        name: "Wool Overcoat".to_owned(),
        slug: "wool-overcoat".to_owned(),
        description: String::new(),
        price: price("189.00"),
        discount_price: Some(price("149.00")),
        stock: 12,
        allowed_sizes: vec![Size::S, Size::M, Size::L],
        allowed_colors: vec![Color::Navy, Color::Black],
        is_featured: false,
        is_hot_trend: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

#[test]
fn test_totals_sum_over_lines() {
    let summary = CartSummary::from_lines(
        CartId::new(3),
        vec![
            summary_line(2, "45.00"),
            summary_line(1, "120.50"),
            summary_line(3, "9.99"),
        ],
    );
    assert_eq!(summary.total_items, 6);
    assert_eq!(summary.total_price, price("240.47"));
}

#[test]
fn test_cart_totals_match_effective_price() {
    // The summary must be priced at what the buyer pays now, which for a
    // discounted product is the discount price.
    let p = product();
    let line = CartSummaryLine {
        line_id: CartLineId::new(1),
        product_id: p.id,
        product_name: p.name.clone(),
        size: Size::M,
        color: Color::Navy,
        quantity: 2,
        unit_price: p.effective_price(),
        line_total: p.effective_price() * Decimal::from(2),
    };
    let summary = CartSummary::from_lines(CartId::new(1), vec![line]);
    assert_eq!(summary.total_price, price("298.00"));
}

// =============================================================================
// Buyer Validation
// =============================================================================

#[test]
fn test_valid_buyer_is_normalized() {
    let buyer = BuyerInfo::parse(
        "  An Nguyen  ",
        "an@example.com",
        "+84 (90) 123-4567",
        " 12 Rue des Ateliers ",
        Some("   "),
    )
    .expect("valid buyer");
    assert_eq!(buyer.full_name(), "An Nguyen");
    assert_eq!(buyer.phone(), "+84 (90) 123-4567");
    assert_eq!(buyer.address(), "12 Rue des Ateliers");
    assert_eq!(buyer.notes(), None);
}

#[test]
fn test_rejections() {
    assert!(matches!(
        BuyerInfo::parse("", "a@b.com", "0901234567", "addr", None),
        Err(BuyerInfoError::EmptyName)
    ));
    assert!(matches!(
        BuyerInfo::parse("A", "not-an-email", "0901234567", "addr", None),
        Err(BuyerInfoError::InvalidEmail(_))
    ));
    // Formatting characters do not count as phone digits.
    assert!(matches!(
        BuyerInfo::parse("A", "a@b.com", "+-() 12345", "addr", None),
        Err(BuyerInfoError::PhoneTooShort(_))
    ));
    assert!(matches!(
        BuyerInfo::parse("A", "a@b.com", "0901234567", "   ", None),
        Err(BuyerInfoError::EmptyAddress)
    ));
}

// =============================================================================
// Variant Capability
// =============================================================================

#[test]
fn test_capability_is_the_size_color_cross_product() {
    let p = product();
    let mut allowed = 0;
    for size in Size::ALL {
        for color in Color::ALL {
            if p.allows_variant(size, color) {
                allowed += 1;
            }
        }
    }
    assert_eq!(allowed, p.allowed_sizes.len() * p.allowed_colors.len());
}

#[test]
fn test_effective_price_prefers_discount() {
    let mut p = product();
    assert_eq!(p.effective_price(), price("149.00"));
    p.discount_price = None;
    assert_eq!(p.effective_price(), price("189.00"));
}
