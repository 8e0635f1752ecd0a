//! Engine events and their distribution.
//!
//! Each domain crate defines its own event enum implementing [`Event`]; the
//! engine publishes them on an [`EventBus`] after the store has accepted the
//! corresponding writes.

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
