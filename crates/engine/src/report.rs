use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use recon_core::{InvoiceId, ProductId, PurchaseOrderId, PurchaseOrderLineId, TransactionKind};
use recon_inventory::{SkipReason, StockMovement, StockOutcome};
use recon_invoicing::PaymentStatus;
use recon_purchasing::{PurchaseOrderStatus, ReceiveOutcome};
use recon_tax::{TaxBreakdown, TaxPeriodEntry};

/// Recoverable per-line problems. The workflow still commits.
///
/// `line_index` is the position of the invoice line, or of the receipt in
/// the receiving command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Warning {
    InsufficientStock {
        line_index: usize,
        available: i64,
        requested: i64,
    },
    LowStock {
        line_index: usize,
        product_id: ProductId,
        stock: i64,
        min_stock_level: i64,
    },
    FractionalQuantity {
        line_index: usize,
        quantity: Decimal,
    },
    /// The line committed but its stock write did not.
    StockSyncFailed {
        line_index: usize,
        error: String,
    },
    /// A receipt line was rejected; the other receipts still ran.
    ReceiptFailed {
        line_index: usize,
        line_id: PurchaseOrderLineId,
        error: String,
    },
}

/// What happened to stock for one invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LineStock {
    Applied(StockMovement),
    Skipped { reason: SkipReason },
    InsufficientStock { available: i64, requested: i64 },
    FractionalQuantity,
    Failed { error: String },
}

impl From<StockOutcome> for LineStock {
    fn from(outcome: StockOutcome) -> Self {
        match outcome {
            StockOutcome::Applied(m) => LineStock::Applied(m),
            StockOutcome::Skipped { reason } => LineStock::Skipped { reason },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLineReport {
    pub line_index: usize,
    pub description: String,
    pub breakdown: TaxBreakdown,
    pub stock: LineStock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceReport {
    pub invoice_id: InvoiceId,
    pub kind: TransactionKind,
    /// Forward-signed transaction totals.
    pub breakdown: TaxBreakdown,
    pub payment_status: PaymentStatus,
    pub lines: Vec<InvoiceLineReport>,
    pub warnings: Vec<Warning>,
    /// Signed contribution to the tax period.
    pub tax_entry: TaxPeriodEntry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivingReport {
    pub order_id: PurchaseOrderId,
    pub lines: Vec<ReceiveOutcome>,
    pub previous_status: PurchaseOrderStatus,
    pub status: PurchaseOrderStatus,
    /// Sum of the per-line receipt tax.
    pub tax: TaxBreakdown,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReport {
    pub invoice_id: InvoiceId,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub previous_status: PaymentStatus,
    pub status: PaymentStatus,
}
