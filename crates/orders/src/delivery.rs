use serde::{Deserialize, Serialize};

use storefront_core::ValueObject;
use storefront_members::{Address, Member};

/// Shipping-address snapshot taken when the order is placed.
///
/// Owned exclusively by its order and never updated: a member moving house
/// later does not change where past orders were shipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    address: Address,
}

impl Delivery {
    pub fn to(address: Address) -> Self {
        Self { address }
    }

    /// Snapshot the member's current address.
    pub fn for_member(member: &Member) -> Self {
        Self::to(member.address().clone())
    }

    pub fn address(&self) -> &Address {
        &self.address
    }
}

impl ValueObject for Delivery {}
