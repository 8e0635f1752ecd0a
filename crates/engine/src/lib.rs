//! Transaction orchestration: ties tax splitting, stock, receiving and
//! payments together behind one entry point per business workflow.

pub mod batch;
pub mod command;
pub mod config;
pub mod event;
pub mod orchestrator;
pub mod report;

pub use batch::{Batch, BatchReport, replay};
pub use command::{
    LineReceipt, ReceivePurchaseOrder, RecordInvoice, RecordPayment, RequestPaymentStatus,
};
pub use config::EngineConfig;
pub use event::EngineEvent;
pub use orchestrator::TransactionOrchestrator;
pub use report::{
    InvoiceLineReport, InvoiceReport, LineStock, PaymentReport, ReceivingReport, Warning,
};
