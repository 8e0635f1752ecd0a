//! Read-model projections.
//!
//! Projections are disposable and rebuildable from the event stream, and
//! idempotent under at-least-once delivery.

pub mod tax_period;

pub use tax_period::TaxPeriodProjection;
