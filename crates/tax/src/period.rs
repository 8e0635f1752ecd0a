use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{DomainError, DomainResult, EntryId, InvoiceId, TransactionKind};
use recon_events::Event;

use crate::breakdown::TaxBreakdown;

/// Calendar month a tax entry is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaxPeriod {
    pub year: i32,
    pub month: u32,
}

impl TaxPeriod {
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "tax period month must be 1..=12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    pub fn of(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }
}

impl core::fmt::Display for TaxPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Output tax is collected on sales, input tax is paid on purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxSide {
    Output,
    Input,
}

impl From<TransactionKind> for TaxSide {
    fn from(kind: TransactionKind) -> Self {
        match kind.forward() {
            TransactionKind::Sale => TaxSide::Output,
            _ => TaxSide::Input,
        }
    }
}

/// One invoice's contribution to a tax period, already signed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPeriodEntry {
    pub entry_id: EntryId,
    pub period: TaxPeriod,
    pub invoice_id: InvoiceId,
    pub kind: TransactionKind,
    pub side: TaxSide,
    pub breakdown: TaxBreakdown,
    pub occurred_at: DateTime<Utc>,
}

impl TaxPeriodEntry {
    /// Build the entry from the forward breakdown of an invoice; returns are
    /// negated here and nowhere else.
    pub fn for_invoice(
        invoice_id: InvoiceId,
        kind: TransactionKind,
        breakdown: TaxBreakdown,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entry_id: EntryId::new(),
            period: TaxPeriod::of(occurred_at),
            invoice_id,
            kind,
            side: TaxSide::from(kind),
            breakdown: breakdown.signed_for(kind),
            occurred_at,
        }
    }
}

/// Running totals for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPeriodSummary {
    pub period: TaxPeriod,
    pub output: TaxBreakdown,
    pub input: TaxBreakdown,
    pub entries: usize,
}

impl TaxPeriodSummary {
    pub fn new(period: TaxPeriod) -> Self {
        Self {
            period,
            output: TaxBreakdown::zero(),
            input: TaxBreakdown::zero(),
            entries: 0,
        }
    }

    pub fn apply(&mut self, entry: &TaxPeriodEntry) -> DomainResult<()> {
        if entry.period != self.period {
            return Err(DomainError::invariant(format!(
                "entry for {} applied to summary of {}",
                entry.period, self.period
            )));
        }
        let side = match entry.side {
            TaxSide::Output => &mut self.output,
            TaxSide::Input => &mut self.input,
        };
        *side = side.checked_add(&entry.breakdown)?;
        self.entries += 1;
        Ok(())
    }

    /// Output tax minus input tax credit. Negative means carry-forward credit.
    pub fn net_payable(&self) -> DomainResult<Decimal> {
        self.output
            .total_tax
            .checked_sub(self.input.total_tax)
            .ok_or_else(|| DomainError::invariant("net payable overflow"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxEvent {
    PeriodEntryRecorded(TaxPeriodEntry),
}

impl Event for TaxEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TaxEvent::PeriodEntryRecorded(_) => "tax.period.entry_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TaxEvent::PeriodEntryRecorded(e) => e.occurred_at,
        }
    }
}
