//! Domain models returned by the repositories.

pub mod cart;
pub mod inventory;
pub mod order;
pub mod product;

pub use cart::{Cart, CartLine, CartSummary, CartSummaryLine};
pub use inventory::InventoryRecord;
pub use order::{BuyerInfo, BuyerInfoError, Order, OrderLine};
pub use product::Product;
