use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use storefront_catalog::{Item, ItemId};
use storefront_core::ExpectedVersion;
use storefront_members::{Member, MemberId};
use storefront_orders::{Order, OrderId, OrderSearch};

use super::{StoreError, Transaction, TransactionManager};
use crate::repository::{ItemRepository, MemberRepository, OrderRepository};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum RecordKey {
    Member(MemberId),
    Item(ItemId),
    Order(OrderId),
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RecordKey::Member(id) => write!(f, "member {id}"),
            RecordKey::Item(id) => write!(f, "item {id}"),
            RecordKey::Order(id) => write!(f, "order {id}"),
        }
    }
}

#[derive(Debug, Clone)]
struct Versioned<T> {
    /// Bumped on every committed write; absent records are at version 0.
    version: u64,
    value: T,
}

#[derive(Debug, Default)]
struct StoreState {
    members: HashMap<MemberId, Versioned<Member>>,
    items: HashMap<ItemId, Versioned<Item>>,
    orders: HashMap<OrderId, Versioned<Order>>,
}

impl StoreState {
    fn version_of(&self, key: RecordKey) -> u64 {
        match key {
            RecordKey::Member(id) => self.members.get(&id).map(|r| r.version),
            RecordKey::Item(id) => self.items.get(&id).map(|r| r.version),
            RecordKey::Order(id) => self.orders.get(&id).map(|r| r.version),
        }
        .unwrap_or(0)
    }
}

fn upsert<K, T>(records: &mut HashMap<K, Versioned<T>>, key: K, value: T)
where
    K: Eq + core::hash::Hash,
{
    let version = records.get(&key).map(|r| r.version).unwrap_or(0) + 1;
    records.insert(key, Versioned { version, value });
}

/// In-memory transactional store for members, items and orders.
///
/// Intended for tests/dev. Cloning is cheap and clones share state.
///
/// Concurrency is optimistic: a transaction works on private copies and
/// remembers the version of every record it read. At commit, each record it
/// writes must still be at that version, otherwise the whole commit is
/// refused with [`StoreError::Concurrency`]. Two placements racing for the
/// same item therefore cannot both succeed on stale stock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    next_tx: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionManager for InMemoryStore {
    type Tx = InMemoryTransaction;

    fn begin(&self) -> Result<Self::Tx, StoreError> {
        let tx_id = self.next_tx.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(tx_id, "transaction begin");
        Ok(InMemoryTransaction {
            tx_id,
            state: Arc::clone(&self.state),
            observed: HashMap::new(),
            members: HashMap::new(),
            items: HashMap::new(),
            orders: HashMap::new(),
            finished: false,
        })
    }
}

/// Unit of work over an [`InMemoryStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    tx_id: u64,
    state: Arc<RwLock<StoreState>>,
    /// Version of each record when this transaction first read it.
    observed: HashMap<RecordKey, u64>,
    members: HashMap<MemberId, Member>,
    items: HashMap<ItemId, Item>,
    orders: HashMap<OrderId, Order>,
    finished: bool,
}

impl InMemoryTransaction {
    fn read<T, F>(&mut self, key: RecordKey, lookup: F) -> Result<Option<T>, StoreError>
    where
        F: FnOnce(&StoreState) -> Option<(u64, T)>,
    {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        let found = lookup(&state);
        let version = found.as_ref().map(|(v, _)| *v).unwrap_or(0);
        self.observed.entry(key).or_insert(version);
        Ok(found.map(|(_, value)| value))
    }

    fn pending_keys(&self) -> Vec<RecordKey> {
        self.members
            .keys()
            .map(|id| RecordKey::Member(*id))
            .chain(self.items.keys().map(|id| RecordKey::Item(*id)))
            .chain(self.orders.keys().map(|id| RecordKey::Order(*id)))
            .collect()
    }

    fn has_writes(&self) -> bool {
        !(self.members.is_empty() && self.items.is_empty() && self.orders.is_empty())
    }

    fn expected_version(&self, key: RecordKey) -> ExpectedVersion {
        self.observed
            .get(&key)
            .map(|v| ExpectedVersion::Exact(*v))
            .unwrap_or(ExpectedVersion::Any)
    }
}

impl MemberRepository for InMemoryTransaction {
    fn find_member(&mut self, id: MemberId) -> Result<Option<Member>, StoreError> {
        if let Some(member) = self.members.get(&id) {
            return Ok(Some(member.clone()));
        }
        self.read(RecordKey::Member(id), |s| {
            s.members.get(&id).map(|r| (r.version, r.value.clone()))
        })
    }

    fn save_member(&mut self, member: Member) -> Result<(), StoreError> {
        self.members.insert(member.id_typed(), member);
        Ok(())
    }
}

impl ItemRepository for InMemoryTransaction {
    fn find_item(&mut self, id: ItemId) -> Result<Option<Item>, StoreError> {
        if let Some(item) = self.items.get(&id) {
            return Ok(Some(item.clone()));
        }
        self.read(RecordKey::Item(id), |s| {
            s.items.get(&id).map(|r| (r.version, r.value.clone()))
        })
    }

    fn save_item(&mut self, item: Item) -> Result<(), StoreError> {
        self.items.insert(item.id_typed(), item);
        Ok(())
    }
}

impl OrderRepository for InMemoryTransaction {
    fn find_order(&mut self, id: OrderId) -> Result<Option<Order>, StoreError> {
        if let Some(order) = self.orders.get(&id) {
            return Ok(Some(order.clone()));
        }
        self.read(RecordKey::Order(id), |s| {
            s.orders.get(&id).map(|r| (r.version, r.value.clone()))
        })
    }

    fn save_order(&mut self, order: Order) -> Result<(), StoreError> {
        self.orders.insert(order.id_typed(), order);
        Ok(())
    }

    fn search_orders(&mut self, criteria: &OrderSearch) -> Result<Vec<Order>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;

        // This transaction's own writes shadow committed records.
        let mut candidates: HashMap<OrderId, &Order> = state
            .orders
            .iter()
            .map(|(id, r)| (*id, &r.value))
            .collect();
        candidates.extend(self.orders.iter().map(|(id, o)| (*id, o)));

        let mut matched: Vec<Order> = candidates
            .into_values()
            .filter(|order| {
                let member_id = order.member_id();
                let member = self
                    .members
                    .get(&member_id)
                    .or_else(|| state.members.get(&member_id).map(|r| &r.value));
                member.is_some_and(|m| criteria.matches(order, m))
            })
            .cloned()
            .collect();

        matched.sort_by_key(|o| (o.placed_at(), o.id_typed()));
        matched.truncate(criteria.limit);
        Ok(matched)
    }
}

impl Transaction for InMemoryTransaction {
    fn commit(mut self) -> Result<(), StoreError> {
        self.finished = true;
        if !self.has_writes() {
            debug!(tx_id = self.tx_id, "transaction commit (read-only)");
            return Ok(());
        }

        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;

        // Validate everything before applying anything.
        for key in self.pending_keys() {
            let expected = self.expected_version(key);
            let actual = state.version_of(key);
            if !expected.matches(actual) {
                warn!(tx_id = self.tx_id, %key, ?expected, actual, "commit conflict");
                return Err(StoreError::Concurrency(format!(
                    "{key} changed concurrently (expected {expected:?}, found {actual})"
                )));
            }
        }

        let writes = self.members.len() + self.items.len() + self.orders.len();
        for (id, member) in self.members.drain() {
            upsert(&mut state.members, id, member);
        }
        for (id, item) in self.items.drain() {
            upsert(&mut state.items, id, item);
        }
        for (id, order) in self.orders.drain() {
            upsert(&mut state.orders, id, order);
        }

        debug!(tx_id = self.tx_id, writes, "transaction commit");
        Ok(())
    }

    fn rollback(mut self) {
        self.finished = true;
        debug!(tx_id = self.tx_id, "transaction rollback");
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished && self.has_writes() {
            debug!(tx_id = self.tx_id, "transaction dropped without commit; writes discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{in_transaction, read_only};
    use storefront_members::Address;

    fn member() -> Member {
        Member::register(MemberId::generate(), "member1", Address::new("seoul", "street", "1"))
            .unwrap()
    }

    fn item(stock: u64) -> Item {
        Item::new(ItemId::generate(), "jpa", 10_000, stock).unwrap()
    }

    #[test]
    fn committed_writes_are_visible_to_later_transactions() {
        let store = InMemoryStore::new();
        let m = member();
        let id = m.id_typed();

        let mut tx = store.begin().unwrap();
        tx.save_member(m.clone()).unwrap();
        tx.commit().unwrap();

        let mut tx = store.begin().unwrap();
        assert_eq!(tx.find_member(id).unwrap(), Some(m));
    }

    #[test]
    fn uncommitted_writes_are_private_and_discarded() {
        let store = InMemoryStore::new();
        let i = item(3);
        let id = i.id_typed();

        let mut writer = store.begin().unwrap();
        writer.save_item(i).unwrap();
        assert!(writer.find_item(id).unwrap().is_some());

        let mut reader = store.begin().unwrap();
        assert!(reader.find_item(id).unwrap().is_none());

        writer.rollback();
        let mut after = store.begin().unwrap();
        assert!(after.find_item(id).unwrap().is_none());
    }

    #[test]
    fn dropped_transaction_discards_writes() {
        let store = InMemoryStore::new();
        let i = item(3);
        let id = i.id_typed();
        {
            let mut tx = store.begin().unwrap();
            tx.save_item(i).unwrap();
        }
        let mut tx = store.begin().unwrap();
        assert!(tx.find_item(id).unwrap().is_none());
    }

    #[test]
    fn stale_write_is_refused_and_nothing_applied() {
        let store = InMemoryStore::new();
        let seeded = item(10);
        let id = seeded.id_typed();
        let mut tx = store.begin().unwrap();
        tx.save_item(seeded).unwrap();
        tx.commit().unwrap();

        let mut first = store.begin().unwrap();
        let mut second = store.begin().unwrap();
        let mut a = first.find_item(id).unwrap().unwrap();
        let mut b = second.find_item(id).unwrap().unwrap();
        a.decrease(4).unwrap();
        b.decrease(7).unwrap();
        first.save_item(a).unwrap();
        let extra = member();
        second.save_member(extra.clone()).unwrap();
        second.save_item(b).unwrap();

        first.commit().unwrap();
        let err = second.commit().unwrap_err();
        assert!(matches!(err, StoreError::Concurrency(_)));

        let mut check = store.begin().unwrap();
        assert_eq!(check.find_item(id).unwrap().unwrap().stock(), 6);
        assert!(check.find_member(extra.id_typed()).unwrap().is_none());
    }

    #[test]
    fn in_transaction_rolls_back_on_error() {
        let store = InMemoryStore::new();
        let i = item(1);
        let id = i.id_typed();

        let result: Result<(), StoreError> = in_transaction(&store, |tx| {
            tx.save_item(i)?;
            Err(StoreError::Poisoned)
        });
        assert!(result.is_err());

        let found: Option<Item> = read_only(&store, |tx| tx.find_item(id)).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn read_only_never_commits() {
        let store = InMemoryStore::new();
        let i = item(1);
        let id = i.id_typed();

        read_only::<_, _, StoreError, _>(&store, |tx| tx.save_item(i)).unwrap();

        let found = read_only::<_, _, StoreError, _>(&store, |tx| tx.find_item(id)).unwrap();
        assert!(found.is_none());
    }
}
