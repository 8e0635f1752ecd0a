use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recon_core::{ProductId, PurchaseOrderId, PurchaseOrderLineId};
use recon_events::Event;
use recon_tax::TaxBreakdown;

use crate::order::PurchaseOrderStatus;
use crate::receiving::ReceiveOutcome;

/// Event: GoodsReceived (one accepted increment on one line).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceived {
    pub order_id: PurchaseOrderId,
    pub line_id: PurchaseOrderLineId,
    pub product_id: Option<ProductId>,
    pub quantity: i64,
    pub new_received_total: i64,
    pub tax: TaxBreakdown,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PurchaseOrderStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderStatusChanged {
    pub order_id: PurchaseOrderId,
    pub from: PurchaseOrderStatus,
    pub to: PurchaseOrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseOrderEvent {
    GoodsReceived(GoodsReceived),
    StatusChanged(PurchaseOrderStatusChanged),
}

impl GoodsReceived {
    /// `None` when the outcome accepted nothing.
    pub fn from_outcome(outcome: &ReceiveOutcome, occurred_at: DateTime<Utc>) -> Option<Self> {
        if outcome.accepted_quantity == 0 {
            return None;
        }
        Some(Self {
            order_id: outcome.order_id,
            line_id: outcome.line_id,
            product_id: outcome
                .stock
                .as_ref()
                .and_then(|s| s.movement())
                .map(|m| m.product_id),
            quantity: outcome.accepted_quantity,
            new_received_total: outcome.new_received_total,
            tax: outcome.tax,
            occurred_at,
        })
    }
}

impl Event for PurchaseOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PurchaseOrderEvent::GoodsReceived(_) => "purchasing.order.goods_received",
            PurchaseOrderEvent::StatusChanged(_) => "purchasing.order.status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PurchaseOrderEvent::GoodsReceived(e) => e.occurred_at,
            PurchaseOrderEvent::StatusChanged(e) => e.occurred_at,
        }
    }
}
