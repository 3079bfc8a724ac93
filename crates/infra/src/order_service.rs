//! Order placement and cancellation (application-level orchestration).
//!
//! ```text
//! place(member, item, count)
//!   ↓ begin transaction
//! 1. resolve member and item           (NotFound)
//! 2. snapshot delivery address
//! 3. build order line, decrease stock  (InsufficientStock)
//! 4. build order in status Placed
//! 5. save item + order
//!   ↓ commit (Conflict if the item moved underneath us)
//! 6. publish orders.order.placed      (failures logged, not returned)
//! ```
//!
//! Cancellation follows the same shape: resolve the order and its items,
//! reverse the stock, flip the status, save, commit, publish. Any error before
//! the commit rolls the whole transaction back. Once the commit succeeds the
//! operation has succeeded: a bus failure is logged and the events are lost
//! for that subscriber set.

use chrono::Utc;
use serde_json::Value as JsonValue;
use tracing::{info, instrument, warn};

use storefront_catalog::ItemId;
use storefront_core::AggregateRoot;
use storefront_events::{Event, EventBus, EventEnvelope};
use storefront_members::MemberId;
use storefront_orders::{Delivery, Order, OrderEvent, OrderId, OrderLine, OrderSearch};

use crate::error::OrderServiceError;
use crate::repository::{ItemRepository, MemberRepository, OrderRepository};
use crate::store::{TransactionManager, in_transaction, read_only};

/// Stateless façade over the repositories and the transaction boundary.
///
/// - `M`: transaction source (e.g. [`crate::InMemoryStore`])
/// - `B`: bus that receives committed order events as JSON envelopes
#[derive(Debug)]
pub struct OrderService<M, B> {
    transactions: M,
    bus: B,
}

impl<M, B> OrderService<M, B> {
    pub fn new(transactions: M, bus: B) -> Self {
        Self { transactions, bus }
    }
}

impl<M, B> OrderService<M, B>
where
    M: TransactionManager,
    B: EventBus<EventEnvelope<JsonValue>>,
{
    /// Place an order for `count` units of one item, shipped to the member's
    /// current address. Returns the new order's identifier.
    #[instrument(skip(self), err)]
    pub fn place(
        &self,
        member_id: MemberId,
        item_id: ItemId,
        count: u32,
    ) -> Result<OrderId, OrderServiceError> {
        let (order_id, events) = in_transaction(&self.transactions, |tx| -> Result<_, OrderServiceError> {
            let member = tx
                .find_member(member_id)?
                .ok_or_else(|| OrderServiceError::not_found("member", member_id))?;
            let mut item = tx
                .find_item(item_id)?
                .ok_or_else(|| OrderServiceError::not_found("item", item_id))?;

            let delivery = Delivery::for_member(&member);
            let unit_price = item.price();
            let line = OrderLine::create(&mut item, unit_price, count)?;
            let mut order =
                Order::place(OrderId::generate(), &member, delivery, vec![line], Utc::now())?;

            let order_id = order.id_typed();
            let events = order.take_events();
            tx.save_item(item)?;
            tx.save_order(order)?;
            Ok((order_id, events))
        })
        .inspect_err(warn_on_conflict)?;

        info!(%order_id, "order placed");
        self.publish(order_id, &events);
        Ok(order_id)
    }

    /// Cancel a placed order, returning every line's quantity to stock.
    #[instrument(skip(self), err)]
    pub fn cancel(&self, order_id: OrderId) -> Result<(), OrderServiceError> {
        let events = in_transaction(&self.transactions, |tx| -> Result<_, OrderServiceError> {
            let mut order = tx
                .find_order(order_id)?
                .ok_or_else(|| OrderServiceError::not_found("order", order_id))?;
            if order.is_cancelled() {
                return Err(OrderServiceError::AlreadyCancelled);
            }

            let mut items = Vec::new();
            for item_id in order.item_ids() {
                let item = tx
                    .find_item(item_id)?
                    .ok_or_else(|| OrderServiceError::not_found("item", item_id))?;
                items.push(item);
            }

            order.cancel(&mut items, Utc::now())?;

            let events = order.take_events();
            for item in items {
                tx.save_item(item)?;
            }
            tx.save_order(order)?;
            Ok(events)
        })
        .inspect_err(warn_on_conflict)?;

        info!(%order_id, "order cancelled");
        self.publish(order_id, &events);
        Ok(())
    }

    /// Orders matching `criteria` (read-only).
    pub fn search(&self, criteria: &OrderSearch) -> Result<Vec<Order>, OrderServiceError> {
        read_only(&self.transactions, |tx| {
            tx.search_orders(criteria).map_err(OrderServiceError::from)
        })
    }

    /// Look up one order (read-only).
    pub fn find_order(&self, order_id: OrderId) -> Result<Order, OrderServiceError> {
        read_only(&self.transactions, |tx| {
            tx.find_order(order_id)?
                .ok_or_else(|| OrderServiceError::not_found("order", order_id))
        })
    }

    /// Best-effort fan-out of committed events.
    fn publish(&self, order_id: OrderId, events: &[OrderEvent]) {
        for event in events {
            let envelope = match EventEnvelope::from_typed(order_id.0, Order::AGGREGATE_TYPE, event)
            {
                Ok(envelope) => envelope,
                Err(err) => {
                    warn!(%order_id, event_type = event.event_type(), %err, "event encoding failed");
                    continue;
                }
            };
            if let Err(err) = self.bus.publish(envelope) {
                warn!(%order_id, event_type = event.event_type(), ?err, "event publication failed");
            }
        }
    }
}

fn warn_on_conflict(err: &OrderServiceError) {
    if let OrderServiceError::Conflict(msg) = err {
        warn!(%msg, "transaction conflict; nothing was applied");
    }
}
