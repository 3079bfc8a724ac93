//! Item catalog domain module.
//!
//! This crate contains the item entity and its stock ledger, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod item;

pub use item::{Item, ItemId};
