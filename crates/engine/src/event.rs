use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use recon_events::Event;
use recon_inventory::InventoryEvent;
use recon_invoicing::InvoiceEvent;
use recon_purchasing::PurchaseOrderEvent;
use recon_tax::TaxEvent;

/// Every event the orchestrator publishes, one variant per domain crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    Inventory(InventoryEvent),
    PurchaseOrder(PurchaseOrderEvent),
    Invoice(InvoiceEvent),
    Tax(TaxEvent),
}

impl Event for EngineEvent {
    fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::Inventory(e) => e.event_type(),
            EngineEvent::PurchaseOrder(e) => e.event_type(),
            EngineEvent::Invoice(e) => e.event_type(),
            EngineEvent::Tax(e) => e.event_type(),
        }
    }

    fn version(&self) -> u32 {
        match self {
            EngineEvent::Inventory(e) => e.version(),
            EngineEvent::PurchaseOrder(e) => e.version(),
            EngineEvent::Invoice(e) => e.version(),
            EngineEvent::Tax(e) => e.version(),
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            EngineEvent::Inventory(e) => e.occurred_at(),
            EngineEvent::PurchaseOrder(e) => e.occurred_at(),
            EngineEvent::Invoice(e) => e.occurred_at(),
            EngineEvent::Tax(e) => e.occurred_at(),
        }
    }
}

impl From<InventoryEvent> for EngineEvent {
    fn from(e: InventoryEvent) -> Self {
        EngineEvent::Inventory(e)
    }
}

impl From<PurchaseOrderEvent> for EngineEvent {
    fn from(e: PurchaseOrderEvent) -> Self {
        EngineEvent::PurchaseOrder(e)
    }
}

impl From<InvoiceEvent> for EngineEvent {
    fn from(e: InvoiceEvent) -> Self {
        EngineEvent::Invoice(e)
    }
}

impl From<TaxEvent> for EngineEvent {
    fn from(e: TaxEvent) -> Self {
        EngineEvent::Tax(e)
    }
}
