//! Store adapters for the domain ports.

pub mod in_memory;
pub mod table;

pub use in_memory::InMemoryStore;
pub use table::Table;
