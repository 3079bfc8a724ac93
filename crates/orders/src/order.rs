use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::{Item, ItemId};
use storefront_core::{AggregateRoot, DomainError, DomainResult, Entity};
use storefront_events::Event;
use storefront_members::{Member, MemberId};

use crate::delivery::Delivery;
use crate::line::OrderLine;

storefront_core::define_id!(
    /// Order identifier.
    OrderId
);

/// Order status lifecycle: `Placed` → `Cancelled`, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Cancelled,
}

/// Stock moved by an order for one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Event: OrderPlaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub member_id: MemberId,
    pub reserved: Vec<StockMovement>,
    pub total_price: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub restocked: Vec<StockMovement>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    OrderCancelled(OrderCancelled),
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "orders.order.placed",
            OrderEvent::OrderCancelled(_) => "orders.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

/// Aggregate root: Order.
///
/// Owns its delivery snapshot and its lines; refers to its member by id only.
/// State changes record [`OrderEvent`]s which the caller drains with
/// [`Order::take_events`] once the change has been committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    member_id: MemberId,
    delivery: Delivery,
    lines: Vec<OrderLine>,
    status: OrderStatus,
    placed_at: DateTime<Utc>,
    #[serde(skip)]
    pending_events: Vec<OrderEvent>,
}

impl Order {
    /// Assemble a freshly placed order.
    ///
    /// The lines have already moved stock (see [`OrderLine::create`]); if this
    /// fails the caller must discard those item changes, which the service does
    /// by rolling back its transaction.
    pub fn place(
        id: OrderId,
        member: &Member,
        delivery: Delivery,
        lines: Vec<OrderLine>,
        placed_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("order requires at least one line"));
        }

        let total_price = lines
            .iter()
            .try_fold(0u64, |acc, line| acc.checked_add(line.subtotal()))
            .ok_or_else(|| DomainError::validation("order total overflows"))?;

        let mut lines = lines;
        for (idx, line) in lines.iter_mut().enumerate() {
            line.set_line_no(line_number(idx)?);
        }

        let placed = OrderPlaced {
            order_id: id,
            member_id: member.id_typed(),
            reserved: movements(&lines),
            total_price,
            occurred_at: placed_at,
        };

        Ok(Self {
            id,
            member_id: member.id_typed(),
            delivery,
            lines,
            status: OrderStatus::Placed,
            placed_at,
            pending_events: vec![OrderEvent::OrderPlaced(placed)],
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn placed_at(&self) -> DateTime<Utc> {
        self.placed_at
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }

    /// Distinct items referenced by the lines, in line order.
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.item_id()) {
                ids.push(line.item_id());
            }
        }
        ids
    }

    /// Sum of line subtotals.
    pub fn total_price(&self) -> u64 {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    /// Cancel the order, returning every line's quantity to its item.
    ///
    /// `items` must contain every item referenced by the lines. That is checked
    /// before anything is touched, so on error neither the order nor any item
    /// has changed.
    pub fn cancel(&mut self, items: &mut [Item], cancelled_at: DateTime<Utc>) -> DomainResult<()> {
        if self.is_cancelled() {
            return Err(DomainError::AlreadyCancelled);
        }

        if let Some(missing) = self
            .lines
            .iter()
            .find(|line| !items.iter().any(|item| item.has_id(&line.item_id())))
        {
            return Err(DomainError::invariant(format!(
                "item {} for line {} was not supplied",
                missing.item_id(),
                missing.line_no()
            )));
        }

        for line in &self.lines {
            let item = items
                .iter_mut()
                .find(|item| item.has_id(&line.item_id()))
                .ok_or_else(DomainError::not_found)?;
            line.cancel(item)?;
        }

        self.status = OrderStatus::Cancelled;
        self.pending_events
            .push(OrderEvent::OrderCancelled(OrderCancelled {
                order_id: self.id,
                restocked: movements(&self.lines),
                occurred_at: cancelled_at,
            }));

        Ok(())
    }

    /// Events recorded since the last drain.
    pub fn pending_events(&self) -> &[OrderEvent] {
        &self.pending_events
    }

    /// Drain recorded events (publish them only after the change is committed).
    pub fn take_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

fn movements(lines: &[OrderLine]) -> Vec<StockMovement> {
    lines
        .iter()
        .map(|line| StockMovement {
            item_id: line.item_id(),
            quantity: line.quantity(),
        })
        .collect()
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Order {
    const AGGREGATE_TYPE: &'static str = "orders.order";
}

/// One-based line number for the line at `idx`.
fn line_number(idx: usize) -> DomainResult<u32> {
    idx.checked_add(1)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| DomainError::validation("order has too many lines"))
}
