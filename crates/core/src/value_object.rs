//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity**: two instances with the same attribute
/// values are interchangeable. They are immutable; "changing" one means
/// building a new one. Addresses and delivery snapshots are the typical case
/// here: an order keeps a copy of the address it shipped to, so later edits
/// to the member's address never rewrite order history.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
