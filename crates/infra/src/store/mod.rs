//! Transaction boundary.
//!
//! Every service operation runs inside one [`Transaction`]: reads and writes go
//! through the repositories it implements, and either all writes become
//! visible at [`Transaction::commit`] or none do. [`in_transaction`] is the
//! scope wrapper services use; it guarantees rollback when the work fails.

pub mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use crate::repository::{ItemRepository, MemberRepository, OrderRepository};

pub use in_memory::{InMemoryStore, InMemoryTransaction};

/// Store operation error.
///
/// These are **infrastructure errors** (concurrency, poisoned state) as opposed
/// to domain errors (validation, stock, lifecycle).
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record written by this transaction was changed by another one after
    /// it was read.
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Unit of work spanning all repositories.
///
/// Dropping a transaction without committing discards its writes.
pub trait Transaction: MemberRepository + ItemRepository + OrderRepository {
    /// Make every write visible atomically, or fail with nothing applied.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;

    /// Discard every write.
    fn rollback(self)
    where
        Self: Sized;
}

/// Source of transactions.
pub trait TransactionManager: Send + Sync {
    type Tx: Transaction;

    fn begin(&self) -> Result<Self::Tx, StoreError>;
}

impl<M> TransactionManager for Arc<M>
where
    M: TransactionManager + ?Sized,
{
    type Tx = M::Tx;

    fn begin(&self) -> Result<Self::Tx, StoreError> {
        (**self).begin()
    }
}

/// Run `work` in a fresh transaction: commit on `Ok`, roll back on `Err`.
///
/// A commit failure (e.g. a concurrency conflict) is returned as the error and
/// nothing is applied.
pub fn in_transaction<M, T, E, F>(manager: &M, work: F) -> Result<T, E>
where
    M: TransactionManager + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut M::Tx) -> Result<T, E>,
{
    let mut tx = manager.begin()?;
    match work(&mut tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(err) => {
            tx.rollback();
            Err(err)
        }
    }
}

/// Run `work` in a transaction that is always rolled back.
pub fn read_only<M, T, E, F>(manager: &M, work: F) -> Result<T, E>
where
    M: TransactionManager + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut M::Tx) -> Result<T, E>,
{
    let mut tx = manager.begin()?;
    let result = work(&mut tx);
    tx.rollback();
    result
}
