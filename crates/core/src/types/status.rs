//! Order lifecycle status and its transition rules.
//!
//! This is the single authority for which status moves are legal. Repository
//! and route code never compares status strings directly; everything goes
//! through [`OrderStatus::can_transition_to`] so the timestamp side effects
//! and eligibility checks cannot drift apart between call sites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of days after order creation during which a return may be requested.
pub const RETURN_WINDOW_DAYS: i64 = 7;

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, Error)]
#[error("invalid order status: {0}")]
pub struct StatusParseError(pub String);

/// Status of a placed order.
///
/// The main progression is `pending -> confirmed -> processing -> shipping ->
/// delivered`. Cancellation branches off from `pending` and `confirmed`; the
/// return/refund sub-flow starts at `delivered`. `cancelled` and `refunded`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipping,
    Delivered,
    Cancelled,
    ReturnRequested,
    ReturnApproved,
    Returned,
    Refunded,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipping,
        Self::Delivered,
        Self::Cancelled,
        Self::ReturnRequested,
        Self::ReturnApproved,
        Self::Returned,
        Self::Refunded,
    ];

    /// Whether no transition leads out of this status.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }

    /// Whether an order in this status may still be cancelled by the buyer.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Whether moving from `self` to `next` is a legal lifecycle transition.
    ///
    /// `confirmed -> shipping` is allowed in addition to the step through
    /// `processing`; warehouse bulk updates ship confirmed orders directly.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (
                    Self::Confirmed,
                    Self::Processing | Self::Shipping | Self::Cancelled
                )
                | (Self::Processing, Self::Shipping)
                | (Self::Shipping, Self::Delivered)
                | (Self::Delivered, Self::ReturnRequested)
                | (Self::ReturnRequested, Self::ReturnApproved)
                | (Self::ReturnApproved, Self::Returned | Self::Refunded)
                | (Self::Returned, Self::Refunded)
        )
    }

    /// Human-readable label for messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::ReturnRequested => "return requested",
            Self::ReturnApproved => "return approved",
            Self::Returned => "returned",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::ReturnRequested => "return_requested",
            Self::ReturnApproved => "return_approved",
            Self::Returned => "returned",
            Self::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipping" => Ok(Self::Shipping),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "return_requested" => Ok(Self::ReturnRequested),
            "return_approved" => Ok(Self::ReturnApproved),
            "returned" => Ok(Self::Returned),
            "refunded" => Ok(Self::Refunded),
            _ => Err(StatusParseError(s.to_owned())),
        }
    }
}

/// Whether a return request at `now` is still inside the window that opened
/// when the order was created.
#[must_use]
pub fn within_return_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (now - created_at).num_days() <= RETURN_WINDOW_DAYS
}

/// Admin bulk status operations.
///
/// Each applies the single-order transition rule independently; ineligible
/// orders are skipped and excluded from the success count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOrderAction {
    MarkShipped,
    MarkDelivered,
    ApproveReturns,
    MarkRefunded,
}

impl BulkOrderAction {
    /// The status an eligible order is moved to.
    #[must_use]
    pub const fn target(self) -> OrderStatus {
        match self {
            Self::MarkShipped => OrderStatus::Shipping,
            Self::MarkDelivered => OrderStatus::Delivered,
            Self::ApproveReturns => OrderStatus::ReturnApproved,
            Self::MarkRefunded => OrderStatus::Refunded,
        }
    }

    /// Whether an order in `status` is eligible for this action.
    #[must_use]
    pub const fn eligible(self, status: OrderStatus) -> bool {
        status.can_transition_to(self.target())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_main_progression_is_legal() {
        let chain = [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipping,
            OrderStatus::Delivered,
        ];
        for pair in chain.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be legal",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_return_flow_is_legal() {
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::ReturnRequested));
        assert!(OrderStatus::ReturnRequested.can_transition_to(OrderStatus::ReturnApproved));
        assert!(OrderStatus::ReturnApproved.can_transition_to(OrderStatus::Returned));
        assert!(OrderStatus::ReturnApproved.can_transition_to(OrderStatus::Refunded));
        assert!(OrderStatus::Returned.can_transition_to(OrderStatus::Refunded));
    }

    #[test]
    fn test_cancel_only_from_pending_or_confirmed() {
        for status in OrderStatus::ALL {
            let legal = status.can_transition_to(OrderStatus::Cancelled);
            assert_eq!(
                legal,
                matches!(status, OrderStatus::Pending | OrderStatus::Confirmed),
                "cancel from {status}"
            );
            assert_eq!(status.is_cancellable(), legal);
        }
    }

    #[test]
    fn test_confirmed_can_ship_directly() {
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Shipping));
    }

    #[test]
    fn test_no_exit_from_terminal_states() {
        for terminal in [OrderStatus::Cancelled, OrderStatus::Refunded] {
            assert!(terminal.is_terminal());
            for next in OrderStatus::ALL {
                assert!(
                    !terminal.can_transition_to(next),
                    "{terminal} -> {next} must be illegal"
                );
            }
        }
    }

    #[test]
    fn test_no_backwards_transitions() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipping));
        assert!(!OrderStatus::Shipping.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::ReturnApproved.can_transition_to(OrderStatus::ReturnRequested));
    }

    #[test]
    fn test_display_from_str_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("archived".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&OrderStatus::ReturnRequested).expect("serialize");
        assert_eq!(json, "\"return_requested\"");
    }

    #[test]
    fn test_return_window() {
        let created = Utc::now();
        assert!(within_return_window(created, created + Duration::days(7)));
        assert!(!within_return_window(
            created,
            created + Duration::days(8)
        ));
    }

    #[test]
    fn test_bulk_action_eligibility() {
        assert!(BulkOrderAction::MarkShipped.eligible(OrderStatus::Confirmed));
        assert!(BulkOrderAction::MarkShipped.eligible(OrderStatus::Processing));
        assert!(!BulkOrderAction::MarkShipped.eligible(OrderStatus::Pending));

        assert!(BulkOrderAction::MarkDelivered.eligible(OrderStatus::Shipping));
        assert!(!BulkOrderAction::MarkDelivered.eligible(OrderStatus::Delivered));

        assert!(BulkOrderAction::ApproveReturns.eligible(OrderStatus::ReturnRequested));
        assert!(!BulkOrderAction::ApproveReturns.eligible(OrderStatus::Delivered));

        assert!(BulkOrderAction::MarkRefunded.eligible(OrderStatus::ReturnApproved));
        assert!(BulkOrderAction::MarkRefunded.eligible(OrderStatus::Returned));
        assert!(!BulkOrderAction::MarkRefunded.eligible(OrderStatus::Refunded));
    }
}
