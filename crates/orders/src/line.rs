use serde::{Deserialize, Serialize};

use storefront_catalog::{Item, ItemId};
use storefront_core::{DomainError, DomainResult, Entity};

/// Order line: one item, its price at order time, and a quantity.
///
/// Building a line takes its quantity out of the item's stock; cancelling it
/// puts the quantity back. The line itself is never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 1-based position within the order (assigned when the order is placed).
    line_no: u32,
    item_id: ItemId,
    item_name: String,
    /// Price in smallest currency unit, captured at order time.
    unit_price: u64,
    quantity: u32,
}

impl OrderLine {
    /// Build a line for `quantity` units of `item` at `unit_price`, decreasing
    /// the item's stock.
    ///
    /// On any error the item is left untouched.
    pub fn create(item: &mut Item, unit_price: u64, quantity: u32) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price.checked_mul(u64::from(quantity)).is_none() {
            return Err(DomainError::validation("line subtotal overflows"));
        }

        item.decrease(quantity)?;

        Ok(Self {
            line_no: 0,
            item_id: item.id_typed(),
            item_name: item.name().to_string(),
            unit_price,
            quantity,
        })
    }

    pub fn line_no(&self) -> u32 {
        self.line_no
    }

    pub(crate) fn set_line_no(&mut self, line_no: u32) {
        self.line_no = line_no;
    }

    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price × quantity`. Lines built by [`OrderLine::create`] never
    /// saturate here.
    pub fn subtotal(&self) -> u64 {
        self.unit_price.saturating_mul(u64::from(self.quantity))
    }

    /// Return this line's quantity to `item`'s stock.
    pub fn cancel(&self, item: &mut Item) -> DomainResult<()> {
        if !item.has_id(&self.item_id) {
            return Err(DomainError::invariant(format!(
                "line {} belongs to item {}, got item {}",
                self.line_no,
                self.item_id,
                item.id_typed()
            )));
        }
        item.increase(self.quantity);
        Ok(())
    }
}

impl Entity for OrderLine {
    type Id = u32;

    fn id(&self) -> &Self::Id {
        &self.line_no
    }
}
