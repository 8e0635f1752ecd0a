use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{EntityRole, InvoiceId, TransactionKind};
use recon_events::Event;
use recon_tax::TaxBreakdown;

use crate::payment::PaymentStatus;

/// Event: InvoiceRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecorded {
    pub invoice_id: InvoiceId,
    pub kind: TransactionKind,
    pub role: EntityRole,
    pub breakdown: TaxBreakdown,
    pub payment_status: PaymentStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub invoice_id: InvoiceId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub total_paid: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusChanged {
    pub invoice_id: InvoiceId,
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceEvent {
    InvoiceRecorded(InvoiceRecorded),
    PaymentRecorded(PaymentRecorded),
    PaymentStatusChanged(PaymentStatusChanged),
}

impl Event for InvoiceEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InvoiceEvent::InvoiceRecorded(_) => "invoicing.invoice.recorded",
            InvoiceEvent::PaymentRecorded(_) => "invoicing.invoice.payment_recorded",
            InvoiceEvent::PaymentStatusChanged(_) => "invoicing.invoice.payment_status_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InvoiceEvent::InvoiceRecorded(e) => e.occurred_at,
            InvoiceEvent::PaymentRecorded(e) => e.occurred_at,
            InvoiceEvent::PaymentStatusChanged(e) => e.occurred_at,
        }
    }
}
