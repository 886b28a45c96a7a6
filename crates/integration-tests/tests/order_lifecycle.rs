//! Integration tests for the order lifecycle state machine.
//!
//! The legality grid here is exhaustive on purpose: every (from, to) pair is
//! checked against an explicit edge list so a new status or edge cannot slip
//! in unnoticed.

use std::collections::HashSet;

use chrono::{Duration, Utc};

use atelier_core::{
    BulkOrderAction, OrderStatus, RETURN_WINDOW_DAYS, within_return_window,
};

use OrderStatus::{
    Cancelled, Confirmed, Delivered, Pending, Processing, Refunded, ReturnApproved,
    ReturnRequested, Returned, Shipping,
};

/// Every legal edge in the lifecycle, written out by hand.
fn legal_edges() -> HashSet<(OrderStatus, OrderStatus)> {
    [
        (Pending, Confirmed),
        (Pending, Cancelled),
        (Confirmed, Processing),
        (Confirmed, Shipping),
        (Confirmed, Cancelled),
        (Processing, Shipping),
        (Shipping, Delivered),
        (Delivered, ReturnRequested),
        (ReturnRequested, ReturnApproved),
        (ReturnApproved, Returned),
        (ReturnApproved, Refunded),
        (Returned, Refunded),
    ]
    .into_iter()
    .collect()
}

// =============================================================================
// Transition Legality
// =============================================================================

#[test]
fn test_transition_grid_is_exactly_the_edge_list() {
    let edges = legal_edges();
    for from in OrderStatus::ALL {
        for to in OrderStatus::ALL {
            assert_eq!(
                from.can_transition_to(to),
                edges.contains(&(from, to)),
                "{from} -> {to} disagrees with the edge list"
            );
        }
    }
}

#[test]
fn test_terminal_statuses_have_no_outgoing_edges() {
    for from in OrderStatus::ALL {
        let has_exit = OrderStatus::ALL.iter().any(|&to| from.can_transition_to(to));
        assert_eq!(
            from.is_terminal(),
            !has_exit,
            "{from}: is_terminal must match the absence of outgoing edges"
        );
    }
}

#[test]
fn test_no_self_transitions() {
    for status in OrderStatus::ALL {
        assert!(
            !status.can_transition_to(status),
            "{status} -> {status} must be illegal"
        );
    }
}

#[test]
fn test_cancellable_means_cancel_edge_exists() {
    for status in OrderStatus::ALL {
        assert_eq!(
            status.is_cancellable(),
            status.can_transition_to(Cancelled),
            "{status}: is_cancellable must match the cancel edge"
        );
    }
}

#[test]
fn test_status_round_trips_through_strings() {
    for status in OrderStatus::ALL {
        let parsed: OrderStatus = status.to_string().parse().expect("round trip");
        assert_eq!(parsed, status);
    }
    assert!("shipped".parse::<OrderStatus>().is_err());
}

#[test]
fn test_serde_and_display_agree() {
    for status in OrderStatus::ALL {
        let json = serde_json::to_string(&status).expect("serialize");
        assert_eq!(json, format!("\"{status}\""));
    }
}

// =============================================================================
// Bulk Action Eligibility
// =============================================================================

fn eligible_sources(action: BulkOrderAction) -> Vec<OrderStatus> {
    OrderStatus::ALL
        .into_iter()
        .filter(|&s| action.eligible(s))
        .collect()
}

#[test]
fn test_bulk_eligibility_matrix() {
    assert_eq!(
        eligible_sources(BulkOrderAction::MarkShipped),
        vec![Confirmed, Processing]
    );
    assert_eq!(
        eligible_sources(BulkOrderAction::MarkDelivered),
        vec![Shipping]
    );
    assert_eq!(
        eligible_sources(BulkOrderAction::ApproveReturns),
        vec![ReturnRequested]
    );
    assert_eq!(
        eligible_sources(BulkOrderAction::MarkRefunded),
        vec![ReturnApproved, Returned]
    );
}

#[test]
fn test_bulk_targets_match_single_order_rules() {
    for action in [
        BulkOrderAction::MarkShipped,
        BulkOrderAction::MarkDelivered,
        BulkOrderAction::ApproveReturns,
        BulkOrderAction::MarkRefunded,
    ] {
        for status in OrderStatus::ALL {
            assert_eq!(
                action.eligible(status),
                status.can_transition_to(action.target()),
                "{status}: bulk eligibility must delegate to the state machine"
            );
        }
    }
}

// =============================================================================
// Return Window
// =============================================================================

#[test]
fn test_return_window_boundary() {
    let created = Utc::now() - Duration::days(RETURN_WINDOW_DAYS);
    let now = Utc::now();

    // Exactly at the window edge is still allowed.
    assert!(within_return_window(created, now));

    // One full day past the edge is not.
    let created = created - Duration::days(1);
    assert!(!within_return_window(created, now));
}

#[test]
fn test_return_window_fresh_order() {
    let now = Utc::now();
    assert!(within_return_window(now, now));
    assert!(within_return_window(now - Duration::hours(3), now));
}
