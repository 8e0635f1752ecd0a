//! Workflow orchestration.
//!
//! Each workflow follows the same pipeline:
//!
//! ```text
//! Command
//!   ↓
//! 1. Validate (no mutation on failure)
//!   ↓
//! 2. Compute (tax split, clamping, status derivation)
//!   ↓
//! 3. Persist through the store ports
//!   ↓
//! 4. Publish EngineEvents (best effort)
//! ```
//!
//! Nothing here does IO itself; the orchestrator composes the store ports and
//! an [`EventBus`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use recon_core::{DomainError, DomainResult, EntityRole, InvoiceId};
use recon_events::{Event, EventBus};
use recon_inventory::{InventoryEvent, ProductRef, ProductStore, SkipReason, StockLedger};
use recon_invoicing::{
    Invoice, InvoiceEvent, InvoiceRecorded, InvoiceStore, Payment, PaymentRecorded, PaymentStatus,
    PaymentStatusChanged, PaymentStatusResolver,
};
use recon_purchasing::{
    GoodsReceived, PurchaseOrderEvent, PurchaseOrderStatus, PurchaseOrderStatusChanged,
    PurchaseOrderStore, ReceivingTracker,
};
use recon_tax::{LineItem, TaxBreakdown, TaxEvent, TaxPeriodEntry, TaxSplitter};

use crate::command::{ReceivePurchaseOrder, RecordInvoice, RecordPayment, RequestPaymentStatus};
use crate::config::EngineConfig;
use crate::event::EngineEvent;
use crate::report::{
    InvoiceLineReport, InvoiceReport, LineStock, PaymentReport, ReceivingReport, Warning,
};

/// Entry point for every business workflow.
///
/// ## Failure semantics
///
/// - Validation errors are returned before anything is written.
/// - Once an invoice is persisted or a receipt line is committed, per-line
///   stock problems become [`Warning`]s; the invoice and the other lines
///   still commit and the tax entry or order status is still emitted.
/// - Downgrading a persisted `Paid` is rejected outright.
/// - Writes are not rolled back if a later step fails, and a failed event
///   publication is only logged: the store is the source of truth.
///
/// ## Generic parameters
///
/// - `S`: store implementing every port (`InMemoryStore` in tests)
/// - `B`: event bus carrying [`EngineEvent`]s
#[derive(Debug)]
pub struct TransactionOrchestrator<S, B> {
    store: S,
    bus: B,
    config: EngineConfig,
    splitter: TaxSplitter,
    resolver: PaymentStatusResolver,
}

impl<S, B> TransactionOrchestrator<S, B> {
    pub fn new(store: S, bus: B, config: EngineConfig) -> Self {
        Self {
            store,
            bus,
            config,
            splitter: TaxSplitter::new(),
            resolver: PaymentStatusResolver::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_parts(self) -> (S, B) {
        (self.store, self.bus)
    }
}

impl<S, B> TransactionOrchestrator<S, B>
where
    S: ProductStore + PurchaseOrderStore + InvoiceStore,
    B: EventBus<EngineEvent>,
{
    /// Record Invoice.
    ///
    /// Validates, splits tax per line, persists the invoice with a freshly
    /// derived payment status, syncs stock for customer invoices, and emits
    /// the signed tax-period entry.
    pub fn record_invoice(&self, command: RecordInvoice) -> DomainResult<InvoiceReport> {
        validate_invoice(&command)?;

        let RecordInvoice {
            invoice_id,
            kind,
            role,
            party_id,
            route,
            lines,
            issued_at,
        } = command;
        let route = route.with_default_origin(self.config.home_jurisdiction.as_ref());
        let issued_at = issued_at.unwrap_or_else(Utc::now);

        let line_breakdowns = lines
            .iter()
            .map(|line| self.splitter.line_breakdown(line, &route))
            .collect::<DomainResult<Vec<_>>>()?;
        let breakdown = TaxBreakdown::try_sum(&line_breakdowns)?;
        let payment_status = self.resolver.resolve(breakdown.total_amount, &[])?;

        let invoice = Invoice {
            id: invoice_id.unwrap_or_default(),
            kind,
            role,
            party_id,
            route,
            lines,
            breakdown,
            payment_status,
            issued_at,
        };
        let invoice_id = invoice.id;
        self.store.insert_invoice(invoice.clone())?;
        info!(
            %invoice_id,
            %kind,
            %role,
            total_amount = %breakdown.total_amount,
            total_tax = %breakdown.total_tax,
            "invoice recorded"
        );

        let occurred_at = Utc::now();
        let mut events: Vec<EngineEvent> = vec![
            InvoiceEvent::InvoiceRecorded(InvoiceRecorded {
                invoice_id,
                kind,
                role,
                breakdown,
                payment_status,
                occurred_at,
            })
            .into(),
        ];

        let ledger = StockLedger::new(&self.store);
        let mut warnings = Vec::new();
        let mut line_reports = Vec::with_capacity(invoice.lines.len());
        for (line_index, (line, line_breakdown)) in
            invoice.lines.iter().zip(line_breakdowns).enumerate()
        {
            let stock = match line.whole_quantity() {
                Some(quantity) => {
                    let product = ProductRef::for_line(line.product_id, &line.description);
                    match ledger.apply_delta(product, quantity, kind, role) {
                        Ok(outcome) => LineStock::from(outcome),
                        Err(DomainError::InsufficientStock {
                            available,
                            requested,
                        }) => {
                            warnings.push(Warning::InsufficientStock {
                                line_index,
                                available,
                                requested,
                            });
                            LineStock::InsufficientStock {
                                available,
                                requested,
                            }
                        }
                        Err(err) => {
                            warn!(%invoice_id, line_index, error = %err, "stock sync failed");
                            let error = err.to_string();
                            warnings.push(Warning::StockSyncFailed {
                                line_index,
                                error: error.clone(),
                            });
                            LineStock::Failed { error }
                        }
                    }
                }
                None if role.is_inventory_linked() => {
                    warn!(
                        %invoice_id,
                        line_index,
                        quantity = %line.quantity,
                        "fractional quantity; stock not moved"
                    );
                    warnings.push(Warning::FractionalQuantity {
                        line_index,
                        quantity: line.quantity,
                    });
                    LineStock::FractionalQuantity
                }
                None => LineStock::Skipped {
                    reason: SkipReason::NonInventoryRole(role),
                },
            };

            if let LineStock::Applied(movement) = &stock {
                if self.config.low_stock_alerts && movement.low_stock && movement.delta < 0 {
                    warnings.push(Warning::LowStock {
                        line_index,
                        product_id: movement.product_id,
                        stock: movement.new_stock,
                        min_stock_level: movement.min_stock_level,
                    });
                }
                events.extend(
                    InventoryEvent::from_movement(movement, occurred_at)
                        .into_iter()
                        .map(EngineEvent::from),
                );
            }

            line_reports.push(InvoiceLineReport {
                line_index,
                description: line.description.clone(),
                breakdown: line_breakdown,
                stock,
            });
        }

        let tax_entry = TaxPeriodEntry::for_invoice(invoice_id, kind, breakdown, issued_at);
        events.push(TaxEvent::PeriodEntryRecorded(tax_entry.clone()).into());
        self.publish_all(events);

        Ok(InvoiceReport {
            invoice_id,
            kind,
            breakdown,
            payment_status,
            lines: line_reports,
            warnings,
            tax_entry,
        })
    }

    /// Receive Purchase Order.
    ///
    /// Every receipt is checked before the first line is touched; after that
    /// lines are independent and each commits on its own. A line that fails
    /// is reported as a warning and the order status is still recomputed.
    pub fn receive_purchase_order(
        &self,
        command: ReceivePurchaseOrder,
    ) -> DomainResult<ReceivingReport> {
        let order_id = command.order_id;
        let order = self
            .store
            .get_purchase_order(order_id)?
            .ok_or_else(|| DomainError::not_found(format!("purchase order {order_id}")))?;
        if order.status == PurchaseOrderStatus::Cancelled {
            return Err(DomainError::invariant(format!(
                "cannot receive goods on cancelled purchase order {order_id}"
            )));
        }
        for receipt in &command.receipts {
            if receipt.quantity < 0 {
                return Err(DomainError::validation(format!(
                    "receive quantity for line {} cannot be negative",
                    receipt.line_id
                )));
            }
            if order.line(receipt.line_id).is_none() {
                return Err(DomainError::not_found(format!(
                    "purchase order line {} on order {order_id}",
                    receipt.line_id
                )));
            }
        }

        let route = command
            .route
            .with_default_origin(self.config.home_jurisdiction.as_ref());
        let tracker = ReceivingTracker::new(&self.store);
        let occurred_at = Utc::now();
        let mut events: Vec<EngineEvent> = Vec::new();
        let mut outcomes = Vec::new();
        let mut warnings = Vec::new();

        for (line_index, receipt) in command.receipts.iter().enumerate() {
            if receipt.quantity == 0 {
                continue;
            }
            let outcome = match tracker.receive(receipt.line_id, receipt.quantity, &route) {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(
                        %order_id,
                        line_id = %receipt.line_id,
                        error = %err,
                        "receipt line rejected"
                    );
                    warnings.push(Warning::ReceiptFailed {
                        line_index,
                        line_id: receipt.line_id,
                        error: err.to_string(),
                    });
                    continue;
                }
            };
            if let Some(error) = &outcome.stock_error {
                warnings.push(Warning::StockSyncFailed {
                    line_index,
                    error: error.clone(),
                });
            }
            if let Some(received) = GoodsReceived::from_outcome(&outcome, occurred_at) {
                events.push(PurchaseOrderEvent::GoodsReceived(received).into());
            }
            if let Some(movement) = outcome.stock.as_ref().and_then(|s| s.movement()) {
                events.extend(
                    InventoryEvent::from_movement(movement, occurred_at)
                        .into_iter()
                        .map(EngineEvent::from),
                );
            }
            outcomes.push(outcome);
        }

        let recomputed = tracker.recompute_order_status(order_id);
        if let Ok((from, to)) = recomputed {
            if from != to {
                events.push(
                    PurchaseOrderEvent::StatusChanged(PurchaseOrderStatusChanged {
                        order_id,
                        from,
                        to,
                        occurred_at,
                    })
                    .into(),
                );
            }
        }
        self.publish_all(events);

        let (previous_status, status) = recomputed?;
        let tax = TaxBreakdown::try_sum(outcomes.iter().map(|o| &o.tax))?;
        Ok(ReceivingReport {
            order_id,
            lines: outcomes,
            previous_status,
            status,
            tax,
            warnings,
        })
    }

    /// Record Payment.
    ///
    /// The status is re-derived from the full payment list and only ever
    /// moves forward here; a hand-set status above the derived one is kept.
    /// Totals are computed before the payment is appended.
    pub fn record_payment(&self, command: RecordPayment) -> DomainResult<PaymentReport> {
        let payment = Payment::new(command.amount, command.date)?;
        let invoice_id = command.invoice_id;
        let invoice = self.load_invoice(invoice_id)?;

        let mut payments = self.store.list_payments(invoice_id)?;
        payments.push(payment.clone());
        let total_paid = self.resolver.total_paid(&payments)?;
        let outstanding = self.resolver.outstanding(invoice.total_amount(), &payments)?;
        let derived = self.resolver.resolve(invoice.total_amount(), &payments)?;

        self.store.append_payment(invoice_id, payment.clone())?;
        info!(%invoice_id, amount = %payment.amount, %total_paid, "payment recorded");

        let occurred_at = Utc::now();
        let mut events: Vec<EngineEvent> = vec![
            InvoiceEvent::PaymentRecorded(PaymentRecorded {
                invoice_id,
                amount: payment.amount,
                date: payment.date,
                total_paid,
                occurred_at,
            })
            .into(),
        ];

        let previous_status = invoice.payment_status;
        let status = derived.max(previous_status);
        if status != previous_status {
            self.store.set_invoice_payment_status(invoice_id, status)?;
            info!(%invoice_id, from = %previous_status, to = %status, "payment status changed");
            events.push(status_changed(invoice_id, previous_status, status, occurred_at));
        }
        self.publish_all(events);

        Ok(PaymentReport {
            invoice_id,
            total_paid,
            outstanding,
            previous_status,
            status,
        })
    }

    /// Request Payment Status: explicit hand-set, refused when it would
    /// downgrade a persisted `Paid`.
    pub fn request_payment_status(
        &self,
        command: RequestPaymentStatus,
    ) -> DomainResult<PaymentReport> {
        let invoice_id = command.invoice_id;
        let invoice = self.load_invoice(invoice_id)?;
        let previous_status = invoice.payment_status;

        self.resolver
            .check_transition(previous_status, command.status)?;
        let payments = self.store.list_payments(invoice_id)?;
        let total_paid = self.resolver.total_paid(&payments)?;
        let outstanding = self.resolver.outstanding(invoice.total_amount(), &payments)?;

        if command.status != previous_status {
            self.store
                .set_invoice_payment_status(invoice_id, command.status)?;
            info!(%invoice_id, from = %previous_status, to = %command.status, "payment status set");
            self.publish_all(vec![status_changed(
                invoice_id,
                previous_status,
                command.status,
                Utc::now(),
            )]);
        }

        Ok(PaymentReport {
            invoice_id,
            total_paid,
            outstanding,
            previous_status,
            status: command.status,
        })
    }

    fn load_invoice(&self, invoice_id: InvoiceId) -> DomainResult<Invoice> {
        self.store
            .get_invoice(invoice_id)?
            .ok_or_else(|| DomainError::not_found(format!("invoice {invoice_id}")))
    }

    fn publish_all(&self, events: Vec<EngineEvent>) {
        for event in events {
            let event_type = event.event_type();
            if let Err(err) = self.bus.publish(event) {
                warn!(event_type, error = %err, "event publish failed after commit");
            }
        }
    }
}

fn status_changed(
    invoice_id: InvoiceId,
    from: PaymentStatus,
    to: PaymentStatus,
    occurred_at: DateTime<Utc>,
) -> EngineEvent {
    InvoiceEvent::PaymentStatusChanged(PaymentStatusChanged {
        invoice_id,
        from,
        to,
        occurred_at,
    })
    .into()
}

fn validate_invoice(command: &RecordInvoice) -> DomainResult<()> {
    if command.role == EntityRole::Customer && command.party_id.is_none() {
        return Err(DomainError::validation(
            "customer invoices require a resolved party",
        ));
    }
    if command.lines.is_empty() {
        return Err(DomainError::validation("invoice needs at least one line"));
    }
    command
        .lines
        .iter()
        .enumerate()
        .try_for_each(|(index, line)| validate_line(index, line))
}

fn validate_line(index: usize, line: &LineItem) -> DomainResult<()> {
    line.validate()
        .map_err(|err| DomainError::validation(format!("line {index}: {err}")))?;
    if line.quantity <= Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "line {index}: quantity must be positive"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use proptest::prelude::*;
    use recon_core::{PartyId, ProductId, PurchaseOrderId, PurchaseOrderLineId, TransactionKind};
    use recon_events::InMemoryEventBus;
    use recon_infra::InMemoryStore;
    use recon_inventory::Product;
    use recon_purchasing::PurchaseOrder;
    use recon_tax::{JurisdictionCode, SupplyRoute};
    use rust_decimal_macros::dec;

    use crate::command::LineReceipt;

    type Orchestrator =
        TransactionOrchestrator<Arc<InMemoryStore>, Arc<InMemoryEventBus<EngineEvent>>>;

    fn orchestrator(config: EngineConfig) -> Orchestrator {
        TransactionOrchestrator::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryEventBus::new()),
            config,
        )
    }

    fn seed(o: &Orchestrator, name: &str, stock: i64, min: i64) -> ProductId {
        o.store().insert_product(Product::new(name, stock, min)).unwrap()
    }

    fn sale(lines: Vec<LineItem>) -> RecordInvoice {
        RecordInvoice::new(TransactionKind::Sale, EntityRole::Customer, lines)
            .with_party(PartyId::new())
    }

    #[test]
    fn customer_invoices_need_a_party() {
        let o = orchestrator(EngineConfig::default());
        let command = RecordInvoice::new(
            TransactionKind::Sale,
            EntityRole::Customer,
            vec![LineItem::new("x", dec!(1), dec!(1), dec!(0))],
        );
        assert!(matches!(
            o.record_invoice(command),
            Err(DomainError::Validation(_))
        ));
        assert!(o.store().invoices().unwrap().is_empty());
    }

    #[test]
    fn zero_quantity_lines_are_rejected_before_any_write() {
        let o = orchestrator(EngineConfig::default());
        let id = seed(&o, "Soap", 10, 0);
        let command = sale(vec![
            LineItem::new("Soap", dec!(2), dec!(10), dec!(18)).with_product(id),
            LineItem::new("Soap", dec!(0), dec!(10), dec!(18)).with_product(id),
        ]);

        assert!(o.record_invoice(command).is_err());
        assert_eq!(o.store().get_product(id).unwrap().unwrap().current_stock, 10);
        assert!(o.store().invoices().unwrap().is_empty());
    }

    #[test]
    fn fractional_quantities_skip_stock_with_a_warning() {
        let o = orchestrator(EngineConfig::default());
        let id = seed(&o, "Sugar", 10, 0);
        let report = o
            .record_invoice(sale(vec![
                LineItem::new("Sugar", dec!(1.5), dec!(40), dec!(5)).with_product(id),
            ]))
            .unwrap();

        assert_eq!(report.lines[0].stock, LineStock::FractionalQuantity);
        assert_eq!(
            report.warnings,
            vec![Warning::FractionalQuantity {
                line_index: 0,
                quantity: dec!(1.5)
            }]
        );
        assert_eq!(o.store().get_product(id).unwrap().unwrap().current_stock, 10);
    }

    #[test]
    fn low_stock_warnings_follow_config() {
        for alerts in [true, false] {
            let o = orchestrator(EngineConfig {
                low_stock_alerts: alerts,
                ..EngineConfig::default()
            });
            let id = seed(&o, "Tea", 5, 3);
            let report = o
                .record_invoice(sale(vec![
                    LineItem::new("Tea", dec!(2), dec!(10), dec!(5)).with_product(id),
                ]))
                .unwrap();

            let low = report
                .warnings
                .iter()
                .any(|w| matches!(w, Warning::LowStock { stock: 3, .. }));
            assert_eq!(low, alerts);
        }
    }

    #[test]
    fn default_origin_comes_from_config() {
        let o = orchestrator(EngineConfig {
            home_jurisdiction: Some(JurisdictionCode::new("KA").unwrap()),
            ..EngineConfig::default()
        });
        let route = SupplyRoute::new(None, Some(JurisdictionCode::new("MH").unwrap()), false);
        let report = o
            .record_invoice(
                RecordInvoice::new(
                    TransactionKind::Purchase,
                    EntityRole::Supplier,
                    vec![LineItem::new("Steel", dec!(1), dec!(1000), dec!(18))],
                )
                .with_route(route),
            )
            .unwrap();

        assert_eq!(report.breakdown.igst, dec!(180));
        assert_eq!(report.breakdown.cgst, dec!(0));
    }

    #[test]
    fn non_customer_invoices_leave_stock_alone() {
        let o = orchestrator(EngineConfig::default());
        let id = seed(&o, "Diesel", 50, 0);
        let report = o
            .record_invoice(RecordInvoice::new(
                TransactionKind::Purchase,
                EntityRole::Transport,
                vec![LineItem::new("Diesel", dec!(2.5), dec!(90), dec!(0)).with_product(id)],
            ))
            .unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(
            report.lines[0].stock,
            LineStock::Skipped {
                reason: SkipReason::NonInventoryRole(EntityRole::Transport)
            }
        );
        assert_eq!(o.store().get_product(id).unwrap().unwrap().current_stock, 50);
    }

    #[test]
    fn events_are_published_after_commit() {
        let o = orchestrator(EngineConfig::default());
        let sub = o.bus().subscribe();
        let id = seed(&o, "Pen", 10, 0);
        o.record_invoice(sale(vec![
            LineItem::new("Pen", dec!(3), dec!(10), dec!(12)).with_product(id),
        ]))
        .unwrap();

        let types: Vec<&str> = sub.drain().iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec![
                "invoicing.invoice.recorded",
                "inventory.stock.adjusted",
                "tax.period.entry_recorded"
            ]
        );
    }

    #[test]
    fn negative_receipts_are_rejected_up_front() {
        let o = orchestrator(EngineConfig::default());
        let mut order = PurchaseOrder::new(None);
        let a = order.add_line("Rice", None, 10, dec!(50), dec!(5)).unwrap();
        let b = order.add_line("Dal", None, 10, dec!(80), dec!(5)).unwrap();
        order.mark_sent().unwrap();
        let order_id = o.store().insert_purchase_order(order).unwrap();

        let err = o
            .receive_purchase_order(ReceivePurchaseOrder {
                order_id,
                receipts: vec![
                    LineReceipt { line_id: a, quantity: 4 },
                    LineReceipt { line_id: b, quantity: -1 },
                ],
                route: SupplyRoute::default(),
            })
            .unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(
            o.store().get_purchase_order_line(a).unwrap().unwrap().received_quantity,
            0
        );
    }

    fn stock(o: &Orchestrator, id: ProductId) -> i64 {
        o.store().get_product(id).unwrap().unwrap().current_stock
    }

    fn received(o: &Orchestrator, line_id: PurchaseOrderLineId) -> i64 {
        o.store()
            .get_purchase_order_line(line_id)
            .unwrap()
            .unwrap()
            .received_quantity
    }

    fn order_status(o: &Orchestrator, id: PurchaseOrderId) -> PurchaseOrderStatus {
        o.store().get_purchase_order(id).unwrap().unwrap().status
    }

    #[test]
    fn stock_failure_on_one_line_keeps_the_invoice_and_its_tax_entry() {
        let o = orchestrator(EngineConfig::default());
        let sub = o.bus().subscribe();
        let full = seed(&o, "Crate", i64::MAX, 0);
        let pen = seed(&o, "Pen", 10, 0);
        let command = RecordInvoice::new(
            TransactionKind::SaleReturn,
            EntityRole::Customer,
            vec![
                LineItem::new("Crate", dec!(1), dec!(100), dec!(18)).with_product(full),
                LineItem::new("Pen", dec!(2), dec!(10), dec!(12)).with_product(pen),
            ],
        )
        .with_party(PartyId::new());

        let report = o.record_invoice(command).unwrap();

        assert!(matches!(report.lines[0].stock, LineStock::Failed { .. }));
        assert!(matches!(
            report.warnings.as_slice(),
            [Warning::StockSyncFailed { line_index: 0, .. }]
        ));
        assert!(matches!(report.lines[1].stock, LineStock::Applied(_)));
        assert_eq!(stock(&o, full), i64::MAX);
        assert_eq!(stock(&o, pen), 12);
        assert_eq!(o.store().invoices().unwrap().len(), 1);

        let tax_entries = sub
            .drain()
            .into_iter()
            .filter(|e| matches!(e, EngineEvent::Tax(_)))
            .count();
        assert_eq!(tax_entries, 1);
    }

    #[test]
    fn receipt_lines_fail_independently_and_status_is_still_recomputed() {
        let o = orchestrator(EngineConfig::default());
        let sub = o.bus().subscribe();
        let rice = seed(&o, "Rice", 0, 0);
        let full = seed(&o, "Crate", i64::MAX, 0);

        let mut order = PurchaseOrder::new(None);
        let ok = order.add_line("Rice", Some(rice), 10, dec!(50), dec!(5)).unwrap();
        let priced_out = order.add_line("Gold", None, 10, Decimal::MAX, dec!(5)).unwrap();
        let unsynced = order.add_line("Crate", Some(full), 10, dec!(1), dec!(5)).unwrap();
        order.mark_sent().unwrap();
        let order_id = o.store().insert_purchase_order(order).unwrap();

        let report = o
            .receive_purchase_order(ReceivePurchaseOrder {
                order_id,
                receipts: vec![
                    LineReceipt { line_id: ok, quantity: 4 },
                    LineReceipt { line_id: priced_out, quantity: 2 },
                    LineReceipt { line_id: unsynced, quantity: 3 },
                ],
                route: SupplyRoute::default(),
            })
            .unwrap();

        assert_eq!(report.lines.len(), 2);
        assert!(matches!(
            report.warnings.as_slice(),
            [
                Warning::ReceiptFailed { line_index: 1, .. },
                Warning::StockSyncFailed { line_index: 2, .. },
            ]
        ));
        assert_eq!(received(&o, ok), 4);
        assert_eq!(received(&o, priced_out), 0);
        assert_eq!(received(&o, unsynced), 3);
        assert_eq!(stock(&o, rice), 4);
        assert_eq!(stock(&o, full), i64::MAX);

        assert_eq!(report.previous_status, PurchaseOrderStatus::Sent);
        assert_eq!(report.status, PurchaseOrderStatus::Partial);
        assert_eq!(order_status(&o, order_id), PurchaseOrderStatus::Partial);

        let types: Vec<&str> = sub.drain().iter().map(|e| e.event_type()).collect();
        assert_eq!(
            types,
            vec![
                "purchasing.order.goods_received",
                "inventory.stock.adjusted",
                "purchasing.order.goods_received",
                "purchasing.order.status_changed",
            ]
        );
    }

    #[test]
    fn receipts_are_accepted_onto_negative_stock() {
        let o = orchestrator(EngineConfig::default());
        let id = seed(&o, "Oil", 0, 0);
        o.store().set_product_stock(id, -5).unwrap();

        let mut order = PurchaseOrder::new(None);
        let line = order.add_line("Oil", Some(id), 10, dec!(120), dec!(12)).unwrap();
        order.mark_sent().unwrap();
        let order_id = o.store().insert_purchase_order(order).unwrap();

        let report = o
            .receive_purchase_order(ReceivePurchaseOrder {
                order_id,
                receipts: vec![LineReceipt { line_id: line, quantity: 3 }],
                route: SupplyRoute::default(),
            })
            .unwrap();

        assert!(report.warnings.is_empty());
        assert_eq!(stock(&o, id), -2);
        assert_eq!(received(&o, line), 3);
        assert_eq!(order_status(&o, order_id), PurchaseOrderStatus::Partial);
    }

    #[test]
    fn payments_on_unknown_invoices_are_not_found() {
        let o = orchestrator(EngineConfig::default());
        let err = o
            .record_payment(RecordPayment {
                invoice_id: InvoiceId::new(),
                amount: dec!(10),
                date: chrono::NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Sales either move stock by their full quantity or are rejected
        /// without a write; stock never goes negative.
        #[test]
        fn sale_sequences_keep_stock_consistent(
            initial in 0i64..50,
            quantities in prop::collection::vec(1i64..20, 0..10),
        ) {
            let o = orchestrator(EngineConfig::default());
            let id = seed(&o, "Item", initial, 0);
            let mut expected = initial;

            for quantity in quantities {
                let report = o
                    .record_invoice(sale(vec![
                        LineItem::new("Item", Decimal::from(quantity), dec!(1), dec!(0))
                            .with_product(id),
                    ]))
                    .unwrap();
                if quantity <= expected {
                    expected -= quantity;
                    prop_assert!(matches!(report.lines[0].stock, LineStock::Applied(_)));
                } else {
                    prop_assert!(
                        matches!(report.lines[0].stock, LineStock::InsufficientStock { .. }),
                        "expected rejection"
                    );
                }
            }

            prop_assert_eq!(o.store().get_product(id).unwrap().unwrap().current_stock, expected);
        }
    }
}
