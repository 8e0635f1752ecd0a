//! Invoices, append-only payments, and derived payment status.

pub mod event;
pub mod invoice;
pub mod payment;
pub mod store;

pub use event::{InvoiceEvent, InvoiceRecorded, PaymentRecorded, PaymentStatusChanged};
pub use invoice::Invoice;
pub use payment::{Payment, PaymentStatus, PaymentStatusResolver};
pub use store::InvoiceStore;
