mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value as JsonValue;

use storefront_catalog::{Item, ItemId};
use storefront_events::{EventBus, EventEnvelope, InMemoryEventBus};
use storefront_infra::{
    InMemoryStore, ItemRepository, MemberRepository, OrderService, OrderServiceError, in_transaction,
    read_only,
};
use storefront_members::{Address, Member, MemberId};
use storefront_orders::OrderSearch;

use crate::config::AppConfig;

fn main() -> Result<()> {
    storefront_observability::init();

    let config = AppConfig::from_env().context("loading demo configuration")?;
    tracing::info!(?config, "starting storefront demo");

    let store = InMemoryStore::new();
    let bus: Arc<InMemoryEventBus<EventEnvelope<JsonValue>>> = Arc::new(InMemoryEventBus::new());
    let events = bus.subscribe();
    let service = OrderService::new(store.clone(), bus);

    let (member_id, item_id) = seed(&store, &config).context("seeding store")?;

    let order_id = service
        .place(member_id, item_id, config.count)
        .context("placing demo order")?;
    let order = service.find_order(order_id)?;
    tracing::info!(
        %order_id,
        status = ?order.status(),
        total_price = order.total_price(),
        stock = stock_of(&store, item_id)?,
        "order placed"
    );

    service.cancel(order_id).context("cancelling demo order")?;
    tracing::info!(
        %order_id,
        stock = stock_of(&store, item_id)?,
        "order cancelled"
    );

    let orders = service.search(&OrderSearch::new())?;
    for envelope in events.drain() {
        tracing::info!(
            event_id = %envelope.event_id(),
            event_type = envelope.event_type(),
            aggregate_id = %envelope.aggregate_id(),
            occurred_at = %envelope.occurred_at(),
            "published"
        );
    }
    tracing::info!(orders = orders.len(), "demo finished");
    Ok(())
}

fn seed(store: &InMemoryStore, config: &AppConfig) -> Result<(MemberId, ItemId)> {
    let member = Member::register(
        MemberId::generate(),
        "member1",
        Address::new("seoul", "street", "123-123"),
    )?;
    let item = Item::new(ItemId::generate(), "jpa", config.price, config.stock)?;
    let ids = (member.id_typed(), item.id_typed());

    in_transaction::<_, _, OrderServiceError, _>(store, |tx| {
        tx.save_member(member)?;
        tx.save_item(item)?;
        Ok(())
    })?;
    Ok(ids)
}

fn stock_of(store: &InMemoryStore, item_id: ItemId) -> Result<u64> {
    let item = read_only::<_, _, OrderServiceError, _>(store, |tx| Ok(tx.find_item(item_id)?))?
        .with_context(|| format!("item {item_id} disappeared"))?;
    Ok(item.stock())
}
