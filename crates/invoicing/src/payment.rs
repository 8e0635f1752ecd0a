use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{DomainError, DomainResult};

/// Payment status, ordered `Due < Partial < Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Due,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Due => "due",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }
}

impl core::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded payment. Append-only; never edited or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Decimal,
    pub date: NaiveDate,
}

impl Payment {
    pub fn new(amount: Decimal, date: NaiveDate) -> DomainResult<Self> {
        let payment = Self { amount, date };
        payment.validate()?;
        Ok(payment)
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        Ok(())
    }
}

/// Derives payment status from the full payment list.
///
/// Deriving is always allowed and can only move forward while payments stay
/// append-only and positive. Hand-setting a status is checked separately by
/// [`PaymentStatusResolver::check_transition`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentStatusResolver;

impl PaymentStatusResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn total_paid(&self, payments: &[Payment]) -> DomainResult<Decimal> {
        payments.iter().try_fold(Decimal::ZERO, |acc, p| {
            acc.checked_add(p.amount)
                .ok_or_else(|| DomainError::invariant("payment total overflow"))
        })
    }

    /// Paid if the payments cover the total, partial if some money arrived,
    /// due otherwise. A zero-total invoice is paid from the start.
    pub fn resolve(
        &self,
        invoice_total: Decimal,
        payments: &[Payment],
    ) -> DomainResult<PaymentStatus> {
        let paid = self.total_paid(payments)?;
        Ok(if paid >= invoice_total {
            PaymentStatus::Paid
        } else if paid > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Due
        })
    }

    /// Amount still owed, never negative.
    pub fn outstanding(
        &self,
        invoice_total: Decimal,
        payments: &[Payment],
    ) -> DomainResult<Decimal> {
        let paid = self.total_paid(payments)?;
        let owed = invoice_total
            .checked_sub(paid)
            .ok_or_else(|| DomainError::invariant("outstanding amount overflow"))?;
        Ok(owed.max(Decimal::ZERO))
    }

    /// A persisted `Paid` can never be hand-set back to `Partial` or `Due`.
    pub fn check_transition(
        &self,
        current: PaymentStatus,
        requested: PaymentStatus,
    ) -> DomainResult<()> {
        if current == PaymentStatus::Paid && requested < PaymentStatus::Paid {
            return Err(DomainError::InvalidStatusTransition {
                from: current.as_str(),
                to: requested.as_str(),
            });
        }
        Ok(())
    }
}
