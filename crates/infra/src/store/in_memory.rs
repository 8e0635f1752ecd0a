use std::collections::HashMap;
use std::sync::RwLock;

use recon_core::{
    DomainError, DomainResult, InvoiceId, ProductId, PurchaseOrderId, PurchaseOrderLineId,
};
use recon_inventory::{Product, ProductStore};
use recon_invoicing::{Invoice, InvoiceStore, Payment, PaymentStatus, PaymentStatusResolver};
use recon_purchasing::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus, PurchaseOrderStore};

use super::table::{Table, poisoned};

/// In-memory implementation of every store port, for tests, the CLI and
/// embedding.
///
/// Each call takes its own lock; there is no cross-call transaction and no
/// compare-and-swap on stock (last committed write wins).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    products: Table<Product>,
    orders: Table<PurchaseOrder>,
    line_index: RwLock<HashMap<PurchaseOrderLineId, PurchaseOrderId>>,
    invoices: Table<Invoice>,
    payments: RwLock<HashMap<InvoiceId, Vec<Payment>>>,
    resolver: PaymentStatusResolver,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a catalog product; stock and minimum level must be non-negative.
    pub fn insert_product(&self, product: Product) -> DomainResult<ProductId> {
        product.validate()?;
        let id = product.id;
        self.products.insert(product)?;
        Ok(id)
    }

    /// Seed a purchase order and index its lines.
    pub fn insert_purchase_order(&self, order: PurchaseOrder) -> DomainResult<PurchaseOrderId> {
        order.validate()?;
        let id = order.id;
        let line_ids: Vec<_> = order.lines.iter().map(|l| l.id).collect();

        let mut index = self.line_index.write().map_err(poisoned)?;
        if let Some(taken) = line_ids.iter().find(|l| index.contains_key(*l)) {
            return Err(DomainError::conflict(format!(
                "purchase order line {taken} already exists"
            )));
        }
        self.orders.insert(order)?;
        index.extend(line_ids.into_iter().map(|l| (l, id)));
        Ok(id)
    }

    pub fn products(&self) -> DomainResult<Vec<Product>> {
        self.products.list()
    }

    pub fn purchase_orders(&self) -> DomainResult<Vec<PurchaseOrder>> {
        self.orders.list()
    }

    pub fn invoices(&self) -> DomainResult<Vec<Invoice>> {
        self.invoices.list()
    }

    fn order_of_line(&self, line_id: PurchaseOrderLineId) -> DomainResult<Option<PurchaseOrderId>> {
        let index = self.line_index.read().map_err(poisoned)?;
        Ok(index.get(&line_id).copied())
    }
}

impl ProductStore for InMemoryStore {
    fn get_product(&self, id: ProductId) -> DomainResult<Option<Product>> {
        self.products.get(id)
    }

    fn find_product_by_name(&self, normalized_name: &str) -> DomainResult<Option<Product>> {
        self.products
            .find(|p| p.normalized_name() == normalized_name)
    }

    fn set_product_stock(&self, id: ProductId, new_stock: i64) -> DomainResult<()> {
        self.products
            .update(id, |p| {
                p.current_stock = new_stock;
                Ok(())
            })?
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }
}

impl PurchaseOrderStore for InMemoryStore {
    fn get_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>> {
        self.orders.get(id)
    }

    fn get_purchase_order_line(
        &self,
        id: PurchaseOrderLineId,
    ) -> DomainResult<Option<PurchaseOrderLine>> {
        let Some(order_id) = self.order_of_line(id)? else {
            return Ok(None);
        };
        Ok(self
            .orders
            .get(order_id)?
            .and_then(|order| order.line(id).cloned()))
    }

    fn set_received_quantity(
        &self,
        line_id: PurchaseOrderLineId,
        new_total: i64,
    ) -> DomainResult<()> {
        let not_found = || DomainError::not_found(format!("purchase order line {line_id}"));
        let order_id = self.order_of_line(line_id)?.ok_or_else(not_found)?;

        self.orders
            .update(order_id, |order| {
                let line = order
                    .lines
                    .iter_mut()
                    .find(|l| l.id == line_id)
                    .ok_or_else(not_found)?;
                if new_total < line.received_quantity || new_total > line.ordered_quantity {
                    return Err(DomainError::invariant(format!(
                        "received quantity for line {line_id} must be in {}..={}, got {new_total}",
                        line.received_quantity, line.ordered_quantity
                    )));
                }
                line.received_quantity = new_total;
                Ok(())
            })?
            .ok_or_else(not_found)
    }

    fn set_purchase_order_status(
        &self,
        order_id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> DomainResult<()> {
        self.orders
            .update(order_id, |order| {
                order.status = status;
                Ok(())
            })?
            .ok_or_else(|| DomainError::not_found(format!("purchase order {order_id}")))
    }
}

impl InvoiceStore for InMemoryStore {
    fn insert_invoice(&self, invoice: Invoice) -> DomainResult<()> {
        self.invoices.insert(invoice)
    }

    fn get_invoice(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        self.invoices.get(id)
    }

    fn list_payments(&self, id: InvoiceId) -> DomainResult<Vec<Payment>> {
        let payments = self.payments.read().map_err(poisoned)?;
        Ok(payments.get(&id).cloned().unwrap_or_default())
    }

    fn append_payment(&self, id: InvoiceId, payment: Payment) -> DomainResult<()> {
        payment.validate()?;
        if self.invoices.get(id)?.is_none() {
            return Err(DomainError::not_found(format!("invoice {id}")));
        }
        let mut payments = self.payments.write().map_err(poisoned)?;
        payments.entry(id).or_default().push(payment);
        Ok(())
    }

    fn set_invoice_payment_status(&self, id: InvoiceId, status: PaymentStatus) -> DomainResult<()> {
        let resolver = self.resolver;
        self.invoices
            .update(id, |invoice| {
                resolver.check_transition(invoice.payment_status, status)?;
                invoice.payment_status = status;
                Ok(())
            })?
            .ok_or_else(|| DomainError::not_found(format!("invoice {id}")))
    }
}
