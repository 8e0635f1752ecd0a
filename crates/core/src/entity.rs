//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Stores key records by `id()`, so two values with the same id are the same
/// record even when their fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
