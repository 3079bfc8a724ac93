//! Entities: objects compared by identity rather than by attribute values.

/// An object with a stable identity that survives state changes.
pub trait Entity {
    /// Strongly-typed identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Whether `self` carries the identifier `id`, regardless of its current state.
    fn has_id(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
