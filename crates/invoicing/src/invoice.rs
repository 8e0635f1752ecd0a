use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{Entity, EntityRole, InvoiceId, PartyId, TransactionKind};
use recon_tax::{LineItem, SupplyRoute, TaxBreakdown};

use crate::payment::PaymentStatus;

/// A committed invoice of any transaction kind.
///
/// Lines and the breakdown are fixed at creation; only `payment_status`
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub kind: TransactionKind,
    pub role: EntityRole,
    /// `None` for open-item invoices of non-customer roles.
    pub party_id: Option<PartyId>,
    pub route: SupplyRoute,
    pub lines: Vec<LineItem>,
    /// Element-wise sum of the line breakdowns (forward sign, also for returns).
    pub breakdown: TaxBreakdown,
    pub payment_status: PaymentStatus,
    pub issued_at: DateTime<Utc>,
}

impl Invoice {
    /// Tax-inclusive amount payments are measured against.
    pub fn total_amount(&self) -> Decimal {
        self.breakdown.total_amount
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}
