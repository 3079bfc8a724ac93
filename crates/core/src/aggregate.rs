//! Aggregate roots and optimistic concurrency expectations.

use crate::entity::Entity;

/// Aggregate root marker.
///
/// An aggregate root is the only entity of a consistency boundary that
/// repositories load and save. Everything it owns (order lines, delivery
/// snapshots) is persisted together with it.
pub trait AggregateRoot: Entity {
    /// Stable type name used in event envelopes and log fields (e.g. "orders.order").
    const AGGREGATE_TYPE: &'static str;
}

/// Optimistic concurrency expectation for a stored record.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (blind writes, seeding, migrations).
    Any,
    /// Require the record to be at an exact version (0 = does not exist yet).
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
