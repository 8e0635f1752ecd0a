//! Inventory stock ledger.
//!
//! Product stock is mutated here and nowhere else: one signed write per
//! accepted movement, never recomputed from transaction history.

pub mod event;
pub mod ledger;
pub mod product;
pub mod store;

pub use event::{InventoryEvent, LowStockReached, StockAdjusted};
pub use ledger::{SkipReason, StockLedger, StockMovement, StockOutcome};
pub use product::{Product, ProductRef, normalize_name};
pub use store::ProductStore;
