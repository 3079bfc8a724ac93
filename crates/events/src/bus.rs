//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes events that have **already been committed**. It is not a
//! source of truth: the stores are. Delivery is best-effort: a message
//! published while a subscriber is gone is lost for that subscriber.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to a bus: each subscription receives a copy of every
/// message published after it was created.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// service.place(member_id, item_id, 2)?;
/// for envelope in subscription.drain() {
///     handle(envelope);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Drain every message that is already queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Transport-agnostic pub/sub contract.
///
/// `publish` may fail (closed transport, poisoned lock). Callers publish only
/// after a successful commit, so a failed publish never loses state; the
/// message is dropped and the caller decides whether to log or retry.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
