use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{
    DomainError, DomainResult, Entity, PartyId, ProductId, PurchaseOrderId, PurchaseOrderLineId,
};

/// Purchase order status.
///
/// `Partial` and `Received` are derived from line quantities; `Draft`, `Sent`
/// and `Cancelled` are set explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseOrderStatus {
    Draft,
    Sent,
    Partial,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Partial => "partial",
            Self::Received => "received",
            Self::Cancelled => "cancelled",
        }
    }

    /// Status after a line update: received if every line is complete,
    /// partial if anything was received, otherwise unchanged.
    pub fn derive(current: Self, lines: &[PurchaseOrderLine]) -> Self {
        if current == Self::Cancelled {
            return current;
        }
        if !lines.is_empty() && lines.iter().all(PurchaseOrderLine::is_complete) {
            Self::Received
        } else if lines.iter().any(|l| l.received_quantity > 0) {
            Self::Partial
        } else {
            current
        }
    }
}

impl core::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purchase order line.
///
/// Only `received_quantity` changes after creation, and only through the
/// receiving tracker: `0 <= received_quantity <= ordered_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub id: PurchaseOrderLineId,
    pub order_id: PurchaseOrderId,
    pub description: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub ordered_quantity: i64,
    #[serde(default)]
    pub received_quantity: i64,
    pub unit_price: Decimal,
    pub tax_rate_percent: Decimal,
}

impl PurchaseOrderLine {
    pub fn remaining(&self) -> i64 {
        (self.ordered_quantity - self.received_quantity).max(0)
    }

    pub fn is_complete(&self) -> bool {
        self.received_quantity >= self.ordered_quantity
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.ordered_quantity <= 0 {
            return Err(DomainError::validation("ordered quantity must be positive"));
        }
        if self.received_quantity < 0 || self.received_quantity > self.ordered_quantity {
            return Err(DomainError::validation(format!(
                "received quantity {} must be within 0..={}",
                self.received_quantity, self.ordered_quantity
            )));
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        if self.tax_rate_percent.is_sign_negative() && !self.tax_rate_percent.is_zero() {
            return Err(DomainError::validation("tax rate cannot be negative"));
        }
        Ok(())
    }
}

/// Purchase order header plus its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    #[serde(default)]
    pub supplier_id: Option<PartyId>,
    pub status: PurchaseOrderStatus,
    pub lines: Vec<PurchaseOrderLine>,
}

impl PurchaseOrder {
    pub fn new(supplier_id: Option<PartyId>) -> Self {
        Self {
            id: PurchaseOrderId::new(),
            supplier_id,
            status: PurchaseOrderStatus::Draft,
            lines: Vec::new(),
        }
    }

    /// Add a line while the order is still a draft.
    pub fn add_line(
        &mut self,
        description: impl Into<String>,
        product_id: Option<ProductId>,
        ordered_quantity: i64,
        unit_price: Decimal,
        tax_rate_percent: Decimal,
    ) -> DomainResult<PurchaseOrderLineId> {
        if self.status != PurchaseOrderStatus::Draft {
            return Err(DomainError::invariant(
                "cannot add lines once a purchase order has been sent",
            ));
        }

        let line = PurchaseOrderLine {
            id: PurchaseOrderLineId::new(),
            order_id: self.id,
            description: description.into(),
            product_id,
            ordered_quantity,
            received_quantity: 0,
            unit_price,
            tax_rate_percent,
        };
        line.validate()?;
        let id = line.id;
        self.lines.push(line);
        Ok(id)
    }

    /// Draft -> Sent.
    pub fn mark_sent(&mut self) -> DomainResult<()> {
        if self.status != PurchaseOrderStatus::Draft {
            return Err(DomainError::invariant(format!(
                "only draft purchase orders can be sent (status: {})",
                self.status
            )));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation(
                "cannot send purchase order without lines",
            ));
        }
        self.status = PurchaseOrderStatus::Sent;
        Ok(())
    }

    /// Draft/Sent -> Cancelled, as long as nothing has been received.
    pub fn cancel(&mut self) -> DomainResult<()> {
        match self.status {
            PurchaseOrderStatus::Draft | PurchaseOrderStatus::Sent => {
                self.status = PurchaseOrderStatus::Cancelled;
                Ok(())
            }
            other => Err(DomainError::invariant(format!(
                "cannot cancel purchase order in status {other}"
            ))),
        }
    }

    /// Checks every line and that each one points back at this order.
    pub fn validate(&self) -> DomainResult<()> {
        for line in &self.lines {
            if line.order_id != self.id {
                return Err(DomainError::validation(format!(
                    "purchase order line {} belongs to a different order",
                    line.id
                )));
            }
            line.validate()?;
        }
        Ok(())
    }

    pub fn line(&self, id: PurchaseOrderLineId) -> Option<&PurchaseOrderLine> {
        self.lines.iter().find(|l| l.id == id)
    }

    pub fn derived_status(&self) -> PurchaseOrderStatus {
        PurchaseOrderStatus::derive(self.status, &self.lines)
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> PurchaseOrderId {
        self.id
    }
}
