//! Member directory domain module.
//!
//! Members are owned by the member directory; the ordering core only reads
//! them (for the owning reference and the shipping address).

pub mod member;

pub use member::{Address, Member, MemberId};
