//! Integration tests for slug and SKU generation.

use std::collections::HashSet;

use atelier_core::slug::{sku_base, sku_candidate, slugify};
use atelier_core::{Color, Size};

// =============================================================================
// Slugs
// =============================================================================

#[test]
fn test_slugs_are_url_safe() {
    let names = [
        "Wool Overcoat",
        "Áo Sơ Mi Trắng",
        "Café Crème Tee (2024)",
        "  spaced   out  ",
        "100% Cotton!",
    ];
    for name in names {
        let slug = slugify(name);
        assert!(!slug.is_empty(), "{name:?} should not slug to nothing");
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "{name:?} produced non-slug chars: {slug:?}"
        );
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
        assert!(!slug.contains("--"));
    }
}

#[test]
fn test_vietnamese_product_names() {
    assert_eq!(slugify("Đầm Dạ Hội"), "dam-da-hoi");
    assert_eq!(slugify("Quần Jeans Đen"), "quan-jeans-den");
}

#[test]
fn test_symbol_only_name_slugs_empty() {
    assert_eq!(slugify("!!! ***"), "");
}

// =============================================================================
// SKU Bases
// =============================================================================

#[test]
fn test_variant_grid_yields_distinct_skus() {
    let mut seen = HashSet::new();
    for size in Size::ALL {
        for color in Color::ALL {
            let sku = sku_base("Wool Overcoat", color, size);
            assert!(seen.insert(sku.clone()), "duplicate SKU base: {sku}");
        }
    }
    assert_eq!(seen.len(), Size::ALL.len() * Color::ALL.len());
}

#[test]
fn test_sku_base_encodes_all_three_parts() {
    let sku = sku_base("Linen Shirt", Color::Navy, Size::Xl);
    assert_eq!(sku, "linen-shirt-navy-xl");
}

#[test]
fn test_unsluggable_name_falls_back() {
    let sku = sku_base("???", Color::Black, Size::M);
    assert_eq!(sku, "item-black-m");
}

// =============================================================================
// Collision Suffixes
// =============================================================================

#[test]
fn test_candidate_sequence() {
    let base = sku_base("Tee", Color::White, Size::S);
    let candidates: Vec<String> = (0..4).map(|n| sku_candidate(&base, n)).collect();
    assert_eq!(
        candidates,
        vec![
            "tee-white-s".to_owned(),
            "tee-white-s-1".to_owned(),
            "tee-white-s-2".to_owned(),
            "tee-white-s-3".to_owned(),
        ]
    );
}

#[test]
fn test_candidates_are_distinct() {
    let base = sku_base("Tee", Color::White, Size::S);
    let mut seen = HashSet::new();
    for n in 0..100 {
        assert!(seen.insert(sku_candidate(&base, n)));
    }
}
