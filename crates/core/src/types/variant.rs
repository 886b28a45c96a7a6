//! Garment variant axes.
//!
//! A variant is one (size, color) cell of a product's grid. Both axes are
//! closed sets; rows store them as lowercase text and parse back through
//! [`FromStr`](std::str::FromStr), so an unknown value in the database
//! surfaces as a parse error instead of a silent default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a size or color string is not in the catalog.
#[derive(Debug, Clone, Error)]
#[error("invalid variant {axis}: {value}")]
pub struct VariantParseError {
    pub axis: &'static str,
    pub value: String,
}

/// Garment size, smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Size {
    Xs,
    S,
    M,
    L,
    Xl,
    Xxl,
}

impl Size {
    pub const ALL: [Self; 6] = [Self::Xs, Self::S, Self::M, Self::L, Self::Xl, Self::Xxl];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Xs => "xs",
            Self::S => "s",
            Self::M => "m",
            Self::L => "l",
            Self::Xl => "xl",
            Self::Xxl => "xxl",
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Size {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xs" => Ok(Self::Xs),
            "s" => Ok(Self::S),
            "m" => Ok(Self::M),
            "l" => Ok(Self::L),
            "xl" => Ok(Self::Xl),
            "xxl" => Ok(Self::Xxl),
            _ => Err(VariantParseError {
                axis: "size",
                value: s.to_owned(),
            }),
        }
    }
}

/// Garment color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
    Gray,
    Beige,
    Pink,
    Blue,
    Navy,
    Brown,
    Red,
    Yellow,
    Green,
    Purple,
}

impl Color {
    pub const ALL: [Self; 12] = [
        Self::White,
        Self::Black,
        Self::Gray,
        Self::Beige,
        Self::Pink,
        Self::Blue,
        Self::Navy,
        Self::Brown,
        Self::Red,
        Self::Yellow,
        Self::Green,
        Self::Purple,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
            Self::Gray => "gray",
            Self::Beige => "beige",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Navy => "navy",
            Self::Brown => "brown",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Purple => "purple",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Color {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            "gray" => Ok(Self::Gray),
            "beige" => Ok(Self::Beige),
            "pink" => Ok(Self::Pink),
            "blue" => Ok(Self::Blue),
            "navy" => Ok(Self::Navy),
            "brown" => Ok(Self::Brown),
            "red" => Ok(Self::Red),
            "yellow" => Ok(Self::Yellow),
            "green" => Ok(Self::Green),
            "purple" => Ok(Self::Purple),
            _ => Err(VariantParseError {
                axis: "color",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_roundtrip() {
        for size in Size::ALL {
            let parsed: Size = size.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, size);
        }
    }

    #[test]
    fn test_color_roundtrip() {
        for color in Color::ALL {
            let parsed: Color = color.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, color);
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        let err = "xxxl".parse::<Size>().expect_err("not a size");
        assert_eq!(err.axis, "size");
        let err = "chartreuse".parse::<Color>().expect_err("not a color");
        assert_eq!(err.axis, "color");
    }

    #[test]
    fn test_sizes_ordered_small_to_large() {
        assert!(Size::Xs < Size::S);
        assert!(Size::Xl < Size::Xxl);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&Size::Xxl).expect("serialize"),
            "\"xxl\""
        );
        assert_eq!(
            serde_json::to_string(&Color::Navy).expect("serialize"),
            "\"navy\""
        );
    }
}
