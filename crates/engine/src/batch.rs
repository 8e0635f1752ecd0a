//! Batch replay: seed an in-memory store, run every workflow in order, and
//! collect the reports plus the tax-period read model.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use recon_core::{DomainError, DomainResult};
use recon_events::{EventBus, InMemoryEventBus};
use recon_infra::{InMemoryStore, TaxPeriodProjection};
use recon_inventory::Product;
use recon_purchasing::PurchaseOrder;
use recon_tax::{TaxBreakdown, TaxPeriodSummary};

use crate::command::{ReceivePurchaseOrder, RecordInvoice, RecordPayment, RequestPaymentStatus};
use crate::config::EngineConfig;
use crate::event::EngineEvent;
use crate::orchestrator::TransactionOrchestrator;
use crate::report::{InvoiceReport, PaymentReport, ReceivingReport};

/// Input document. Sections run in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub products: Vec<Product>,
    pub purchase_orders: Vec<PurchaseOrder>,
    pub invoices: Vec<RecordInvoice>,
    pub receipts: Vec<ReceivePurchaseOrder>,
    pub payments: Vec<RecordPayment>,
    pub status_requests: Vec<RequestPaymentStatus>,
}

/// A workflow that was rejected; the rest of the batch still runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub section: String,
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPeriodReport {
    pub period: String,
    pub output: TaxBreakdown,
    pub input: TaxBreakdown,
    pub entries: usize,
    pub net_payable: Decimal,
}

impl TryFrom<TaxPeriodSummary> for TaxPeriodReport {
    type Error = DomainError;

    fn try_from(summary: TaxPeriodSummary) -> DomainResult<Self> {
        Ok(Self {
            period: summary.period.to_string(),
            net_payable: summary.net_payable()?,
            output: summary.output,
            input: summary.input,
            entries: summary.entries,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub invoices: Vec<InvoiceReport>,
    pub receipts: Vec<ReceivingReport>,
    pub payments: Vec<PaymentReport>,
    pub failures: Vec<BatchFailure>,
    pub tax_periods: Vec<TaxPeriodReport>,
    pub products: Vec<Product>,
}

/// Replay a batch against a fresh [`InMemoryStore`].
///
/// Seeding errors (duplicate ids) abort the replay; workflow errors are
/// collected as [`BatchFailure`]s.
pub fn replay(batch: Batch, config: EngineConfig) -> DomainResult<BatchReport> {
    let store = Arc::new(InMemoryStore::new());
    for product in batch.products {
        store.insert_product(product)?;
    }
    for order in batch.purchase_orders {
        store.insert_purchase_order(order)?;
    }

    let bus = Arc::new(InMemoryEventBus::<EngineEvent>::new());
    let events = bus.subscribe();
    let orchestrator = TransactionOrchestrator::new(store.clone(), bus, config);

    let mut report = BatchReport::default();
    report.invoices = run(&mut report.failures, "invoices", batch.invoices, |c| {
        orchestrator.record_invoice(c)
    });
    report.receipts = run(&mut report.failures, "receipts", batch.receipts, |c| {
        orchestrator.receive_purchase_order(c)
    });
    report.payments = run(&mut report.failures, "payments", batch.payments, |c| {
        orchestrator.record_payment(c)
    });
    let requested = run(
        &mut report.failures,
        "status_requests",
        batch.status_requests,
        |c| orchestrator.request_payment_status(c),
    );
    report.payments.extend(requested);

    let projection = TaxPeriodProjection::new();
    for event in events.drain() {
        if let EngineEvent::Tax(tax) = event {
            projection.apply(&tax)?;
        }
    }
    report.tax_periods = projection
        .summaries()?
        .into_iter()
        .map(TaxPeriodReport::try_from)
        .collect::<DomainResult<_>>()?;
    report.products = store.products()?;

    Ok(report)
}

fn run<C, R>(
    failures: &mut Vec<BatchFailure>,
    section: &'static str,
    commands: Vec<C>,
    mut f: impl FnMut(C) -> DomainResult<R>,
) -> Vec<R> {
    let mut out = Vec::new();
    for (index, command) in commands.into_iter().enumerate() {
        match f(command) {
            Ok(r) => out.push(r),
            Err(err) => {
                warn!(section, index, error = %err, "batch step rejected");
                failures.push(BatchFailure {
                    section: section.to_string(),
                    index,
                    error: err.to_string(),
                });
            }
        }
    }
    out
}
