use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{
    EntityRole, InvoiceId, PartyId, PurchaseOrderId, PurchaseOrderLineId, TransactionKind,
};
use recon_invoicing::PaymentStatus;
use recon_tax::{LineItem, SupplyRoute};

/// Record a sale, purchase, or return invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordInvoice {
    /// Generated when absent.
    #[serde(default)]
    pub invoice_id: Option<InvoiceId>,
    pub kind: TransactionKind,
    pub role: EntityRole,
    #[serde(default)]
    pub party_id: Option<PartyId>,
    #[serde(default)]
    pub route: SupplyRoute,
    pub lines: Vec<LineItem>,
    /// Defaults to now; also decides the tax period.
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}

impl RecordInvoice {
    pub fn new(kind: TransactionKind, role: EntityRole, lines: Vec<LineItem>) -> Self {
        Self {
            invoice_id: None,
            kind,
            role,
            party_id: None,
            route: SupplyRoute::default(),
            lines,
            issued_at: None,
        }
    }

    pub fn with_party(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    pub fn with_route(mut self, route: SupplyRoute) -> Self {
        self.route = route;
        self
    }
}

/// Quantity arriving now on one purchase order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineReceipt {
    pub line_id: PurchaseOrderLineId,
    pub quantity: i64,
}

/// Receive goods against a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivePurchaseOrder {
    pub order_id: PurchaseOrderId,
    pub receipts: Vec<LineReceipt>,
    #[serde(default)]
    pub route: SupplyRoute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub date: NaiveDate,
}

/// Explicitly set an invoice's payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPaymentStatus {
    pub invoice_id: InvoiceId,
    pub status: PaymentStatus,
}
