use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use recon_core::{DomainError, DomainResult, ProductId};

/// One quantity/price/rate row of an invoice.
///
/// `product_id` links the line to the catalog; without it the line is matched
/// by `description`, and lines matching nothing are free-text open items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub tax_rate_percent: Decimal,
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

impl LineItem {
    pub fn new(
        description: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        tax_rate_percent: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tax_rate_percent,
            product_id: None,
        }
    }

    pub fn with_product(mut self, product_id: ProductId) -> Self {
        self.product_id = Some(product_id);
        self
    }

    /// Rejects negative quantity, price, or rate.
    pub fn validate(&self) -> DomainResult<()> {
        if self.quantity.is_sign_negative() && !self.quantity.is_zero() {
            return Err(DomainError::validation("line quantity cannot be negative"));
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(DomainError::validation("line unit_price cannot be negative"));
        }
        if self.tax_rate_percent.is_sign_negative() && !self.tax_rate_percent.is_zero() {
            return Err(DomainError::validation("line tax rate cannot be negative"));
        }
        Ok(())
    }

    /// `quantity × unit_price`, tax-exclusive.
    pub fn line_total(&self) -> DomainResult<Decimal> {
        self.quantity
            .checked_mul(self.unit_price)
            .ok_or_else(|| DomainError::invariant("line total overflow"))
    }

    /// Quantity as whole stock units, if it has no fractional part.
    pub fn whole_quantity(&self) -> Option<i64> {
        if self.quantity.fract().is_zero() {
            self.quantity.to_i64()
        } else {
            None
        }
    }
}
