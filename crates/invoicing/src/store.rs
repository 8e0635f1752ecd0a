use std::sync::Arc;

use recon_core::{DomainResult, InvoiceId};

use crate::invoice::Invoice;
use crate::payment::{Payment, PaymentStatus};

/// Invoice and payment records.
///
/// Implementations must reject a non-positive `append_payment` and a
/// `set_invoice_payment_status` that would downgrade a persisted `Paid`
/// (see [`crate::PaymentStatusResolver::check_transition`]).
pub trait InvoiceStore: Send + Sync {
    /// Fails with `Conflict` if the id is already taken.
    fn insert_invoice(&self, invoice: Invoice) -> DomainResult<()>;

    fn get_invoice(&self, id: InvoiceId) -> DomainResult<Option<Invoice>>;

    fn list_payments(&self, id: InvoiceId) -> DomainResult<Vec<Payment>>;

    fn append_payment(&self, id: InvoiceId, payment: Payment) -> DomainResult<()>;

    fn set_invoice_payment_status(&self, id: InvoiceId, status: PaymentStatus) -> DomainResult<()>;
}

impl<S> InvoiceStore for Arc<S>
where
    S: InvoiceStore + ?Sized,
{
    fn insert_invoice(&self, invoice: Invoice) -> DomainResult<()> {
        (**self).insert_invoice(invoice)
    }

    fn get_invoice(&self, id: InvoiceId) -> DomainResult<Option<Invoice>> {
        (**self).get_invoice(id)
    }

    fn list_payments(&self, id: InvoiceId) -> DomainResult<Vec<Payment>> {
        (**self).list_payments(id)
    }

    fn append_payment(&self, id: InvoiceId, payment: Payment) -> DomainResult<()> {
        (**self).append_payment(id, payment)
    }

    fn set_invoice_payment_status(&self, id: InvoiceId, status: PaymentStatus) -> DomainResult<()> {
        (**self).set_invoice_payment_status(id, status)
    }
}
