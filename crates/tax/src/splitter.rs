use rust_decimal::Decimal;

use recon_core::{DomainError, DomainResult};

use crate::breakdown::TaxBreakdown;
use crate::jurisdiction::SupplyRoute;
use crate::line::LineItem;

/// Computes CGST/SGST/IGST for a line or a whole transaction.
///
/// Returns share the breakdown of their forward counterpart; the sign is only
/// flipped when entries are accumulated into a tax period.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxSplitter;

impl TaxSplitter {
    pub fn new() -> Self {
        Self
    }

    /// `total_tax = taxable_amount × tax_rate_percent / 100`, split per route.
    pub fn compute_breakdown(
        &self,
        taxable_amount: Decimal,
        tax_rate_percent: Decimal,
        route: &SupplyRoute,
    ) -> DomainResult<TaxBreakdown> {
        if taxable_amount.is_sign_negative() && !taxable_amount.is_zero() {
            return Err(DomainError::validation("taxable amount cannot be negative"));
        }
        if tax_rate_percent.is_sign_negative() && !tax_rate_percent.is_zero() {
            return Err(DomainError::validation("tax rate cannot be negative"));
        }

        let total_tax = taxable_amount
            .checked_mul(tax_rate_percent)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(|| DomainError::invariant("tax amount overflow"))?;

        TaxBreakdown::split(taxable_amount, total_tax, route.is_inter_jurisdiction())
    }

    pub fn line_breakdown(
        &self,
        line: &LineItem,
        route: &SupplyRoute,
    ) -> DomainResult<TaxBreakdown> {
        line.validate()?;
        self.compute_breakdown(line.line_total()?, line.tax_rate_percent, route)
    }

    /// Sum of per-line breakdowns, each line taxed at its own rate.
    pub fn transaction_breakdown(
        &self,
        lines: &[LineItem],
        route: &SupplyRoute,
    ) -> DomainResult<TaxBreakdown> {
        lines
            .iter()
            .map(|line| self.line_breakdown(line, route))
            .collect::<DomainResult<Vec<_>>>()
            .and_then(|breakdowns| TaxBreakdown::try_sum(&breakdowns))
    }
}
