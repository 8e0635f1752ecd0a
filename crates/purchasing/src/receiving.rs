use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use recon_core::{
    DomainError, DomainResult, PurchaseOrderId, PurchaseOrderLineId, TransactionKind,
};
use recon_inventory::{ProductRef, ProductStore, StockLedger, StockOutcome};
use recon_tax::{SupplyRoute, TaxBreakdown, TaxSplitter};

use crate::order::PurchaseOrderStatus;
use crate::store::PurchaseOrderStore;

/// Result of one receiving call on one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveOutcome {
    pub line_id: PurchaseOrderLineId,
    pub order_id: PurchaseOrderId,
    pub requested_quantity: i64,
    /// Increment actually recorded after clamping.
    pub accepted_quantity: i64,
    pub new_received_total: i64,
    pub line_complete: bool,
    /// `None` when nothing was accepted and the ledger was not called.
    pub stock: Option<StockOutcome>,
    /// Set when the received total was committed but the stock write failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_error: Option<String>,
    /// GST on `accepted_quantity × unit_price` for this receipt's route.
    pub tax: TaxBreakdown,
}

/// Clamp a requested receipt to `[0, remaining]`.
pub fn clamp_receipt(requested: i64, remaining: i64) -> i64 {
    requested.clamp(0, remaining.max(0))
}

/// Accumulates received quantity per purchase-order line.
///
/// Over-receipts are silently capped at the ordered quantity. The new total
/// is persisted before stock moves, so a retried call sees the increment as
/// already received and cannot apply it twice. A stock failure after that
/// commit is reported on the outcome, not returned as an error.
#[derive(Debug)]
pub struct ReceivingTracker<'a, S: ?Sized> {
    store: &'a S,
    splitter: TaxSplitter,
}

impl<'a, S> ReceivingTracker<'a, S>
where
    S: PurchaseOrderStore + ProductStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            splitter: TaxSplitter::new(),
        }
    }

    pub fn receive(
        &self,
        line_id: PurchaseOrderLineId,
        quantity_now: i64,
        route: &SupplyRoute,
    ) -> DomainResult<ReceiveOutcome> {
        let line = self
            .store
            .get_purchase_order_line(line_id)?
            .ok_or_else(|| DomainError::not_found(format!("purchase order line {line_id}")))?;

        let order = self
            .store
            .get_purchase_order(line.order_id)?
            .ok_or_else(|| DomainError::not_found(format!("purchase order {}", line.order_id)))?;
        if order.status == PurchaseOrderStatus::Cancelled {
            return Err(DomainError::invariant(format!(
                "cannot receive goods on cancelled purchase order {}",
                order.id
            )));
        }

        let accepted = clamp_receipt(quantity_now, line.remaining());
        let new_received_total = line.received_quantity + accepted;

        let taxable = Decimal::from(accepted)
            .checked_mul(line.unit_price)
            .ok_or_else(|| DomainError::invariant("receipt amount overflow"))?;
        let tax = self
            .splitter
            .compute_breakdown(taxable, line.tax_rate_percent, route)?;

        let mut stock_error = None;
        let stock = if accepted > 0 {
            self.store.set_received_quantity(line_id, new_received_total)?;
            info!(
                %line_id,
                order_id = %line.order_id,
                accepted,
                new_received_total,
                "goods received"
            );
            let product = ProductRef::for_line(line.product_id, &line.description);
            match StockLedger::new(self.store).apply_movement(
                product,
                accepted,
                TransactionKind::Purchase,
            ) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    warn!(
                        %line_id,
                        accepted,
                        error = %err,
                        "stock not synced for received goods"
                    );
                    stock_error = Some(err.to_string());
                    None
                }
            }
        } else {
            debug!(%line_id, requested = quantity_now, "nothing left to receive on line");
            None
        };

        Ok(ReceiveOutcome {
            line_id,
            order_id: line.order_id,
            requested_quantity: quantity_now,
            accepted_quantity: accepted,
            new_received_total,
            line_complete: new_received_total >= line.ordered_quantity,
            stock,
            stock_error,
            tax,
        })
    }

    /// Re-derive and persist the order status from its current lines.
    ///
    /// Returns `(previous, current)`; the store is only written on change.
    pub fn recompute_order_status(
        &self,
        order_id: PurchaseOrderId,
    ) -> DomainResult<(PurchaseOrderStatus, PurchaseOrderStatus)> {
        let order = self
            .store
            .get_purchase_order(order_id)?
            .ok_or_else(|| DomainError::not_found(format!("purchase order {order_id}")))?;

        let previous = order.status;
        let derived = order.derived_status();
        if derived != previous {
            self.store.set_purchase_order_status(order_id, derived)?;
            info!(%order_id, from = %previous, to = %derived, "purchase order status changed");
        }
        Ok((previous, derived))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use proptest::prelude::*;
    use recon_core::{PartyId, ProductId};
    use recon_inventory::Product;
    use recon_tax::JurisdictionCode;
    use rust_decimal_macros::dec;

    use crate::order::{PurchaseOrder, PurchaseOrderLine};

    #[derive(Default)]
    struct TestStore {
        orders: Mutex<HashMap<PurchaseOrderId, PurchaseOrder>>,
        products: Mutex<HashMap<ProductId, Product>>,
    }

    impl TestStore {
        fn line(&self, id: PurchaseOrderLineId) -> PurchaseOrderLine {
            self.orders
                .lock()
                .unwrap()
                .values()
                .find_map(|o| o.line(id).cloned())
                .unwrap()
        }

        fn stock(&self, id: ProductId) -> i64 {
            self.products.lock().unwrap()[&id].current_stock
        }

        fn status(&self, id: PurchaseOrderId) -> PurchaseOrderStatus {
            self.orders.lock().unwrap()[&id].status
        }
    }

    impl PurchaseOrderStore for TestStore {
        fn get_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        fn get_purchase_order_line(
            &self,
            id: PurchaseOrderLineId,
        ) -> DomainResult<Option<PurchaseOrderLine>> {
            Ok(self
                .orders
                .lock()
                .unwrap()
                .values()
                .find_map(|o| o.line(id).cloned()))
        }

        fn set_received_quantity(
            &self,
            line_id: PurchaseOrderLineId,
            new_total: i64,
        ) -> DomainResult<()> {
            let mut orders = self.orders.lock().unwrap();
            let line = orders
                .values_mut()
                .flat_map(|o| o.lines.iter_mut())
                .find(|l| l.id == line_id)
                .ok_or_else(|| DomainError::not_found("line"))?;
            line.received_quantity = new_total;
            Ok(())
        }

        fn set_purchase_order_status(
            &self,
            order_id: PurchaseOrderId,
            status: PurchaseOrderStatus,
        ) -> DomainResult<()> {
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .get_mut(&order_id)
                .ok_or_else(|| DomainError::not_found("order"))?;
            order.status = status;
            Ok(())
        }
    }

    impl ProductStore for TestStore {
        fn get_product(&self, id: ProductId) -> DomainResult<Option<Product>> {
            Ok(self.products.lock().unwrap().get(&id).cloned())
        }

        fn find_product_by_name(&self, normalized_name: &str) -> DomainResult<Option<Product>> {
            Ok(self
                .products
                .lock()
                .unwrap()
                .values()
                .find(|p| p.normalized_name() == normalized_name)
                .cloned())
        }

        fn set_product_stock(&self, id: ProductId, new_stock: i64) -> DomainResult<()> {
            if let Some(p) = self.products.lock().unwrap().get_mut(&id) {
                p.current_stock = new_stock;
            }
            Ok(())
        }
    }

    struct Fixture {
        store: TestStore,
        order_id: PurchaseOrderId,
        line_id: PurchaseOrderLineId,
        product_id: ProductId,
    }

    fn fixture(ordered: i64) -> Fixture {
        let store = TestStore::default();
        let product = Product::new("Bolt", 0, 0);
        let product_id = product.id;
        store.products.lock().unwrap().insert(product_id, product);

        let mut order = PurchaseOrder::new(Some(PartyId::new()));
        let line_id = order
            .add_line("Bolt", Some(product_id), ordered, dec!(50), dec!(18))
            .unwrap();
        order.mark_sent().unwrap();
        let order_id = order.id;
        store.orders.lock().unwrap().insert(order_id, order);

        Fixture {
            store,
            order_id,
            line_id,
            product_id,
        }
    }

    fn intra() -> SupplyRoute {
        let code = JurisdictionCode::new("27").unwrap();
        SupplyRoute::between(code.clone(), code)
    }

    #[test]
    fn partial_then_over_receipt_is_clamped_to_ordered() {
        let f = fixture(10);
        let tracker = ReceivingTracker::new(&f.store);

        let first = tracker.receive(f.line_id, 6, &intra()).unwrap();
        assert_eq!(first.new_received_total, 6);
        assert!(!first.line_complete);
        assert_eq!(f.store.stock(f.product_id), 6);

        let second = tracker.receive(f.line_id, 10, &intra()).unwrap();
        assert_eq!(second.accepted_quantity, 4);
        assert_eq!(second.new_received_total, 10);
        assert!(second.line_complete);
        assert_eq!(f.store.stock(f.product_id), 10);
        assert_eq!(f.store.line(f.line_id).received_quantity, 10);
    }

    #[test]
    fn receipt_tax_uses_only_the_accepted_increment() {
        let f = fixture(10);
        let tracker = ReceivingTracker::new(&f.store);

        let outcome = tracker.receive(f.line_id, 4, &intra()).unwrap();
        // 4 × 50 = 200, 18% = 36
        assert_eq!(outcome.tax.taxable_amount, dec!(200));
        assert_eq!(outcome.tax.cgst, dec!(18));
        assert_eq!(outcome.tax.sgst, dec!(18));
    }

    #[test]
    fn fully_received_line_ignores_further_receipts() {
        let f = fixture(3);
        let tracker = ReceivingTracker::new(&f.store);
        tracker.receive(f.line_id, 3, &intra()).unwrap();

        let again = tracker.receive(f.line_id, 3, &intra()).unwrap();
        assert_eq!(again.accepted_quantity, 0);
        assert!(again.stock.is_none());
        assert_eq!(f.store.stock(f.product_id), 3);
    }

    #[test]
    fn status_follows_line_progress() {
        let f = fixture(4);
        let tracker = ReceivingTracker::new(&f.store);

        tracker.receive(f.line_id, 1, &intra()).unwrap();
        assert_eq!(
            tracker.recompute_order_status(f.order_id).unwrap(),
            (PurchaseOrderStatus::Sent, PurchaseOrderStatus::Partial)
        );

        tracker.receive(f.line_id, 3, &intra()).unwrap();
        tracker.recompute_order_status(f.order_id).unwrap();
        assert_eq!(f.store.status(f.order_id), PurchaseOrderStatus::Received);
    }

    #[test]
    fn unknown_line_is_a_hard_error() {
        let f = fixture(1);
        let err = ReceivingTracker::new(&f.store)
            .receive(PurchaseOrderLineId::new(), 1, &intra())
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn cancelled_orders_cannot_receive() {
        let f = fixture(5);
        f.store
            .set_purchase_order_status(f.order_id, PurchaseOrderStatus::Cancelled)
            .unwrap();
        let err = ReceivingTracker::new(&f.store)
            .receive(f.line_id, 1, &intra())
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(f.store.stock(f.product_id), 0);
    }

    #[test]
    fn receipts_land_on_negative_stock() {
        let f = fixture(10);
        f.store.set_product_stock(f.product_id, -5).unwrap();
        let tracker = ReceivingTracker::new(&f.store);

        let outcome = tracker.receive(f.line_id, 3, &intra()).unwrap();

        let movement = outcome.stock.as_ref().and_then(|s| s.movement());
        assert_eq!(movement.map(|m| m.new_stock), Some(-2));
        assert_eq!(outcome.stock_error, None);
        assert_eq!(f.store.stock(f.product_id), -2);
        assert_eq!(f.store.line(f.line_id).received_quantity, 3);
        assert_eq!(
            tracker.recompute_order_status(f.order_id).unwrap().1,
            PurchaseOrderStatus::Partial
        );
    }

    #[test]
    fn stock_failure_after_commit_is_reported_on_the_outcome() {
        let f = fixture(10);
        f.store.set_product_stock(f.product_id, i64::MAX).unwrap();
        let tracker = ReceivingTracker::new(&f.store);

        let outcome = tracker.receive(f.line_id, 2, &intra()).unwrap();

        assert_eq!(outcome.accepted_quantity, 2);
        assert!(outcome.stock.is_none());
        let error = outcome.stock_error.as_deref().unwrap_or_default();
        assert!(error.contains("overflow"));
        assert_eq!(f.store.line(f.line_id).received_quantity, 2);
        assert_eq!(f.store.stock(f.product_id), i64::MAX);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Received quantity never decreases and never exceeds the order,
        /// and stock grows by exactly what was accepted.
        #[test]
        fn received_is_monotone_and_bounded(
            ordered in 1i64..50,
            requests in prop::collection::vec(-5i64..30, 1..20),
        ) {
            let f = fixture(ordered);
            let tracker = ReceivingTracker::new(&f.store);

            let mut last = 0;
            for requested in requests {
                let outcome = tracker.receive(f.line_id, requested, &intra()).unwrap();
                prop_assert!(outcome.new_received_total >= last);
                prop_assert!(outcome.new_received_total <= ordered);
                prop_assert_eq!(outcome.new_received_total - last, outcome.accepted_quantity);
                last = outcome.new_received_total;
            }
            prop_assert_eq!(f.store.line(f.line_id).received_quantity, last);
            prop_assert_eq!(f.store.stock(f.product_id), last);
        }
    }
}
