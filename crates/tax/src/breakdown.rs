use core::ops::Neg;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use recon_core::{DomainError, DomainResult, TransactionKind};

/// Tax components of one line or one transaction.
///
/// A forward line breakdown is either all-IGST or an even CGST/SGST split.
/// Transaction totals are element-wise sums of line breakdowns, and tax-period
/// sums may carry negated (return) breakdowns. Every addition is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub taxable_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,
    pub total_amount: Decimal,
}

impl TaxBreakdown {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Split `total_tax` into IGST (inter) or halves of CGST/SGST (intra).
    pub fn split(
        taxable_amount: Decimal,
        total_tax: Decimal,
        inter_jurisdiction: bool,
    ) -> DomainResult<Self> {
        let (cgst, sgst, igst) = if inter_jurisdiction {
            (Decimal::ZERO, Decimal::ZERO, total_tax)
        } else {
            let half = total_tax / Decimal::TWO;
            (half, half, Decimal::ZERO)
        };

        Ok(Self {
            taxable_amount,
            cgst,
            sgst,
            igst,
            total_tax,
            total_amount: checked(taxable_amount, total_tax)?,
        })
    }

    /// Element-wise sum.
    pub fn checked_add(&self, rhs: &Self) -> DomainResult<Self> {
        Ok(Self {
            taxable_amount: checked(self.taxable_amount, rhs.taxable_amount)?,
            cgst: checked(self.cgst, rhs.cgst)?,
            sgst: checked(self.sgst, rhs.sgst)?,
            igst: checked(self.igst, rhs.igst)?,
            total_tax: checked(self.total_tax, rhs.total_tax)?,
            total_amount: checked(self.total_amount, rhs.total_amount)?,
        })
    }

    /// Sum of many breakdowns; zero for an empty iterator.
    pub fn try_sum<'a, I>(breakdowns: I) -> DomainResult<Self>
    where
        I: IntoIterator<Item = &'a TaxBreakdown>,
    {
        breakdowns
            .into_iter()
            .try_fold(Self::zero(), |acc, b| acc.checked_add(b))
    }

    /// Checks the invariants of a forward (non-negated) line breakdown.
    pub fn is_consistent(&self) -> bool {
        let non_negative = [
            self.taxable_amount,
            self.cgst,
            self.sgst,
            self.igst,
            self.total_tax,
        ]
        .iter()
        .all(|v| !v.is_sign_negative() || v.is_zero());

        let split_ok = if self.total_tax.is_zero() {
            self.cgst.is_zero() && self.sgst.is_zero() && self.igst.is_zero()
        } else if self.igst > Decimal::ZERO {
            self.cgst.is_zero() && self.sgst.is_zero()
        } else {
            self.igst.is_zero() && self.cgst == self.sgst
        };

        let components = self
            .cgst
            .checked_add(self.sgst)
            .and_then(|v| v.checked_add(self.igst));

        non_negative
            && split_ok
            && components == Some(self.total_tax)
            && self.taxable_amount.checked_add(self.total_tax) == Some(self.total_amount)
    }

    /// Negated for return kinds, unchanged otherwise.
    pub fn signed_for(self, kind: TransactionKind) -> Self {
        if kind.is_return() { -self } else { self }
    }

    /// Display rounding (midpoint away from zero). Never used internally.
    pub fn rounded(&self, dp: u32) -> Self {
        let r = |v: Decimal| v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
        Self {
            taxable_amount: r(self.taxable_amount),
            cgst: r(self.cgst),
            sgst: r(self.sgst),
            igst: r(self.igst),
            total_tax: r(self.total_tax),
            total_amount: r(self.total_amount),
        }
    }
}

impl Neg for TaxBreakdown {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            taxable_amount: -self.taxable_amount,
            cgst: -self.cgst,
            sgst: -self.sgst,
            igst: -self.igst,
            total_tax: -self.total_tax,
            total_amount: -self.total_amount,
        }
    }
}

fn checked(a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| DomainError::invariant("tax amount overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn intra_split_halves_the_tax() {
        let b = TaxBreakdown::split(dec!(1000), dec!(180), false).unwrap();
        assert_eq!(b.cgst, dec!(90));
        assert_eq!(b.sgst, dec!(90));
        assert_eq!(b.igst, Decimal::ZERO);
        assert_eq!(b.total_amount, dec!(1180));
        assert!(b.is_consistent());
    }

    #[test]
    fn negation_flips_every_component() {
        let b = TaxBreakdown::split(dec!(100), dec!(12), true).unwrap();
        let n = b.signed_for(TransactionKind::SaleReturn);
        assert_eq!(n.igst, dec!(-12));
        assert_eq!(n.total_amount, dec!(-112));
        assert_eq!(b.checked_add(&n).unwrap(), TaxBreakdown::zero());
        assert_eq!(b.signed_for(TransactionKind::Purchase), b);
    }

    #[test]
    fn mixed_split_is_not_consistent() {
        let mut b = TaxBreakdown::split(dec!(100), dec!(18), false).unwrap();
        b.igst = dec!(1);
        assert!(!b.is_consistent());
    }

    #[test]
    fn rounding_is_display_only() {
        let b = TaxBreakdown::split(dec!(33.33), dec!(1.6665), false).unwrap();
        let r = b.rounded(2);
        assert_eq!(r.cgst, dec!(0.83));
        assert_eq!(b.cgst, dec!(0.83325));
    }

    #[test]
    fn overflowing_sums_are_errors_not_panics() {
        let big = TaxBreakdown::split(Decimal::MAX, Decimal::ZERO, false).unwrap();
        let err = TaxBreakdown::try_sum([&big, &big]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));

        assert!(TaxBreakdown::split(Decimal::MAX, dec!(1), true).is_err());
    }

    #[test]
    fn empty_sum_is_zero() {
        assert_eq!(TaxBreakdown::try_sum([]).unwrap(), TaxBreakdown::zero());
    }
}
