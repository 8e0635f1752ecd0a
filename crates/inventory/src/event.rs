use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recon_core::{ProductId, TransactionKind};
use recon_events::Event;

use crate::ledger::StockMovement;

/// Event: StockAdjusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAdjusted {
    pub product_id: ProductId,
    pub kind: TransactionKind,
    pub delta: i64,
    pub new_stock: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LowStockReached (an outbound movement left stock at or below the minimum).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowStockReached {
    pub product_id: ProductId,
    pub stock: i64,
    pub min_stock_level: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    StockAdjusted(StockAdjusted),
    LowStockReached(LowStockReached),
}

impl InventoryEvent {
    /// Events describing one accepted movement.
    pub fn from_movement(movement: &StockMovement, occurred_at: DateTime<Utc>) -> Vec<Self> {
        let mut events = vec![InventoryEvent::StockAdjusted(StockAdjusted {
            product_id: movement.product_id,
            kind: movement.kind,
            delta: movement.delta,
            new_stock: movement.new_stock,
            occurred_at,
        })];

        if movement.low_stock && movement.delta < 0 {
            events.push(InventoryEvent::LowStockReached(LowStockReached {
                product_id: movement.product_id,
                stock: movement.new_stock,
                min_stock_level: movement.min_stock_level,
                occurred_at,
            }));
        }

        events
    }
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::StockAdjusted(_) => "inventory.stock.adjusted",
            InventoryEvent::LowStockReached(_) => "inventory.stock.low",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::StockAdjusted(e) => e.occurred_at,
            InventoryEvent::LowStockReached(e) => e.occurred_at,
        }
    }
}
