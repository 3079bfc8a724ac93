//! Domain events and their distribution mechanics.
//!
//! Events are facts recorded by aggregates. They are published only after
//! the transaction that produced them commits, wrapped in an [`EventEnvelope`].

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
