//! URL/SKU-safe slugs.
//!
//! SKUs are derived from product names typed by merchandisers, so the
//! slugifier has to cope with arbitrary unicode. Diacritics are stripped via
//! NFD decomposition; anything left that is not ASCII alphanumeric becomes a
//! hyphen, and runs of hyphens collapse.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::types::{Color, Size};

/// Lowercase ASCII slug of `input`. Empty when nothing survives.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.nfd().filter(|c| !is_combining_mark(*c)) {
        // NFD does not decompose the Vietnamese d-with-stroke.
        let ch = match ch {
            'đ' | 'Đ' => 'd',
            other => other,
        };
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    out
}

/// Base SKU for a variant: `{name-slug}-{color}-{size}`.
///
/// A name that slugs to nothing falls back to `item` so the SKU stays
/// non-empty; collision suffixes are appended by the caller.
#[must_use]
pub fn sku_base(name: &str, color: Color, size: Size) -> String {
    let name_slug = slugify(name);
    let name_slug = if name_slug.is_empty() {
        "item"
    } else {
        name_slug.as_str()
    };
    format!("{name_slug}-{color}-{size}")
}

/// `base` with a numeric collision suffix. Suffix 0 is the base itself.
#[must_use]
pub fn sku_candidate(base: &str, suffix: u32) -> String {
    if suffix == 0 {
        base.to_owned()
    } else {
        format!("{base}-{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        assert_eq!(slugify("Wool Overcoat"), "wool-overcoat");
        assert_eq!(slugify("  Linen   Shirt  "), "linen-shirt");
    }

    #[test]
    fn test_punctuation_collapses() {
        assert_eq!(slugify("A/B -- Test!?"), "a-b-test");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_diacritics_stripped() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("Áo Đẹp"), "ao-dep");
        // Sharp s has no NFD decomposition, so it separates like punctuation.
        assert_eq!(slugify("Übergröße"), "ubergro-e");
    }

    #[test]
    fn test_numbers_kept() {
        assert_eq!(slugify("Tee 2024 v2"), "tee-2024-v2");
    }

    #[test]
    fn test_sku_base() {
        assert_eq!(
            sku_base("Wool Overcoat", Color::Navy, Size::M),
            "wool-overcoat-navy-m"
        );
        assert_eq!(sku_base("???", Color::Black, Size::Xl), "item-black-xl");
    }

    #[test]
    fn test_sku_candidate_suffixes() {
        assert_eq!(sku_candidate("tee-black-m", 0), "tee-black-m");
        assert_eq!(sku_candidate("tee-black-m", 1), "tee-black-m-1");
        assert_eq!(sku_candidate("tee-black-m", 12), "tee-black-m-12");
    }
}
