//! Closed reason-code sets recorded on cancellations and return requests.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("invalid {kind} reason: {value}")]
pub struct ReasonParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Why a buyer cancelled an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    ChangedMind,
    FoundBetterPrice,
    OrderedWrong,
    DeliveryTooLong,
    Other,
}

impl CancelReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChangedMind => "changed_mind",
            Self::FoundBetterPrice => "found_better_price",
            Self::OrderedWrong => "ordered_wrong",
            Self::DeliveryTooLong => "delivery_too_long",
            Self::Other => "other",
        }
    }

    /// Human-readable label for admin views.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChangedMind => "changed my mind",
            Self::FoundBetterPrice => "found a better price",
            Self::OrderedWrong => "ordered the wrong item",
            Self::DeliveryTooLong => "delivery takes too long",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CancelReason {
    type Err = ReasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "changed_mind" => Ok(Self::ChangedMind),
            "found_better_price" => Ok(Self::FoundBetterPrice),
            "ordered_wrong" => Ok(Self::OrderedWrong),
            "delivery_too_long" => Ok(Self::DeliveryTooLong),
            "other" => Ok(Self::Other),
            _ => Err(ReasonParseError {
                kind: "cancel",
                value: s.to_owned(),
            }),
        }
    }
}

/// Why a buyer requested a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReason {
    Defective,
    WrongItem,
    NotAsDescribed,
    SizeIssue,
    QualityIssue,
    ChangedMind,
    Other,
}

impl ReturnReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Defective => "defective",
            Self::WrongItem => "wrong_item",
            Self::NotAsDescribed => "not_as_described",
            Self::SizeIssue => "size_issue",
            Self::QualityIssue => "quality_issue",
            Self::ChangedMind => "changed_mind",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Defective => "item is defective",
            Self::WrongItem => "received the wrong item",
            Self::NotAsDescribed => "not as described",
            Self::SizeIssue => "size does not fit",
            Self::QualityIssue => "quality issue",
            Self::ChangedMind => "changed my mind",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ReturnReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReturnReason {
    type Err = ReasonParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "defective" => Ok(Self::Defective),
            "wrong_item" => Ok(Self::WrongItem),
            "not_as_described" => Ok(Self::NotAsDescribed),
            "size_issue" => Ok(Self::SizeIssue),
            "quality_issue" => Ok(Self::QualityIssue),
            "changed_mind" => Ok(Self::ChangedMind),
            "other" => Ok(Self::Other),
            _ => Err(ReasonParseError {
                kind: "return",
                value: s.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reason_roundtrip() {
        for reason in [
            CancelReason::ChangedMind,
            CancelReason::FoundBetterPrice,
            CancelReason::OrderedWrong,
            CancelReason::DeliveryTooLong,
            CancelReason::Other,
        ] {
            let parsed: CancelReason = reason.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, reason);
        }
    }

    #[test]
    fn test_return_reason_roundtrip() {
        for reason in [
            ReturnReason::Defective,
            ReturnReason::WrongItem,
            ReturnReason::NotAsDescribed,
            ReturnReason::SizeIssue,
            ReturnReason::QualityIssue,
            ReturnReason::ChangedMind,
            ReturnReason::Other,
        ] {
            let parsed: ReturnReason = reason.as_str().parse().expect("roundtrip");
            assert_eq!(parsed, reason);
        }
    }

    #[test]
    fn test_unknown_reason_rejected() {
        assert!("lost_interest".parse::<CancelReason>().is_err());
        assert!("".parse::<ReturnReason>().is_err());
    }
}
