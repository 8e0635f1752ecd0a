use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are facts about something the engine already committed to the
/// store. They are immutable, versioned and append-only.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "inventory.stock.adjusted").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
