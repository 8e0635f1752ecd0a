//! Infrastructure layer: in-memory store adapters and read-model projections.

pub mod projections;
pub mod store;

pub use projections::TaxPeriodProjection;
pub use store::{InMemoryStore, Table};
