use std::sync::Arc;

use recon_core::{DomainResult, PurchaseOrderId, PurchaseOrderLineId};

use crate::order::{PurchaseOrder, PurchaseOrderLine, PurchaseOrderStatus};

/// Purchase order records as seen by the receiving tracker.
pub trait PurchaseOrderStore: Send + Sync {
    fn get_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>>;

    fn get_purchase_order_line(
        &self,
        id: PurchaseOrderLineId,
    ) -> DomainResult<Option<PurchaseOrderLine>>;

    fn set_received_quantity(&self, line_id: PurchaseOrderLineId, new_total: i64)
    -> DomainResult<()>;

    fn set_purchase_order_status(
        &self,
        order_id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> DomainResult<()>;
}

impl<S> PurchaseOrderStore for Arc<S>
where
    S: PurchaseOrderStore + ?Sized,
{
    fn get_purchase_order(&self, id: PurchaseOrderId) -> DomainResult<Option<PurchaseOrder>> {
        (**self).get_purchase_order(id)
    }

    fn get_purchase_order_line(
        &self,
        id: PurchaseOrderLineId,
    ) -> DomainResult<Option<PurchaseOrderLine>> {
        (**self).get_purchase_order_line(id)
    }

    fn set_received_quantity(
        &self,
        line_id: PurchaseOrderLineId,
        new_total: i64,
    ) -> DomainResult<()> {
        (**self).set_received_quantity(line_id, new_total)
    }

    fn set_purchase_order_status(
        &self,
        order_id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> DomainResult<()> {
        (**self).set_purchase_order_status(order_id, status)
    }
}
