//! Shared domain types.

pub mod email;
pub mod id;
pub mod reason;
pub mod status;
pub mod variant;

pub use email::{Email, EmailError};
pub use id::{CartId, CartLineId, InventoryRecordId, OrderId, OrderLineId, ProductId, UserId};
pub use reason::{CancelReason, ReasonParseError, ReturnReason};
pub use status::{
    BulkOrderAction, OrderStatus, RETURN_WINDOW_DAYS, StatusParseError, within_return_window,
};
pub use variant::{Color, Size, VariantParseError};
