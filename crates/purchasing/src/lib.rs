//! Purchase orders and cumulative goods receiving.
//!
//! Receiving is cumulative per line: each call adds a clamped increment to
//! `received_quantity`, and only that increment reaches the stock ledger.

pub mod event;
pub mod order;
pub mod receiving;
pub mod store;

pub use event::{GoodsReceived, PurchaseOrderEvent, PurchaseOrderStatusChanged};
pub use order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};
pub use receiving::{ReceiveOutcome, ReceivingTracker, clamp_receipt};
pub use store::PurchaseOrderStore;
