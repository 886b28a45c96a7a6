//! Domain services orchestrating multi-table flows.

pub mod checkout;
pub mod lifecycle;

pub use checkout::{CheckoutError, CheckoutService};
pub use lifecycle::{
    BulkTransitionReport, LifecycleError, OrderLifecycleService, ReorderReport,
};
