//! GST tax splitting (CGST/SGST vs IGST) and tax-period aggregation.
//!
//! Everything here is a pure computation over explicit inputs: no store, no
//! session state, no rounding. Callers round only for display.

pub mod breakdown;
pub mod jurisdiction;
pub mod line;
pub mod period;
pub mod splitter;

pub use breakdown::TaxBreakdown;
pub use jurisdiction::{JurisdictionCode, SupplyRoute};
pub use line::LineItem;
pub use period::{TaxEvent, TaxPeriod, TaxPeriodEntry, TaxPeriodSummary, TaxSide};
pub use splitter::TaxSplitter;
