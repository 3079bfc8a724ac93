//! Repository boundaries, one per aggregate.
//!
//! Repositories are implemented by a unit of work (see [`crate::store::Transaction`]):
//! every lookup and save happens inside a transaction, which is why even reads
//! take `&mut self` (the transaction remembers what it has read so it can
//! detect concurrent modification at commit).

use storefront_catalog::{Item, ItemId};
use storefront_members::{Member, MemberId};
use storefront_orders::{Order, OrderId, OrderSearch};

use crate::store::StoreError;

/// Member directory lookup.
pub trait MemberRepository {
    /// `Ok(None)` when no member has this identifier.
    fn find_member(&mut self, id: MemberId) -> Result<Option<Member>, StoreError>;

    fn save_member(&mut self, member: Member) -> Result<(), StoreError>;
}

/// Item catalog lookup (items carry the mutable stock ledger and price).
pub trait ItemRepository {
    /// `Ok(None)` when no item has this identifier.
    fn find_item(&mut self, id: ItemId) -> Result<Option<Item>, StoreError>;

    fn save_item(&mut self, item: Item) -> Result<(), StoreError>;
}

/// Order persistence.
pub trait OrderRepository {
    /// `Ok(None)` when no order has this identifier.
    fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError>;

    fn save_order(&mut self, order: Order) -> Result<(), StoreError>;

    /// Orders matching `criteria`, oldest placement first, at most `criteria.limit`.
    fn search_orders(&mut self, criteria: &OrderSearch) -> Result<Vec<Order>, StoreError>;
}
