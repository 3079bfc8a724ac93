use serde::{Deserialize, Serialize};

use storefront_members::Member;

use crate::order::{Order, OrderStatus};

/// Upper bound on search results when the caller does not set one.
pub const DEFAULT_SEARCH_LIMIT: usize = 1000;

/// Order search criteria.
///
/// Every criterion is optional; an empty search matches all orders (up to
/// `limit`). Results are expected in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSearch {
    /// Substring of the owning member's name (case-sensitive).
    pub member_name: Option<String>,
    pub status: Option<OrderStatus>,
    pub limit: usize,
}

impl Default for OrderSearch {
    fn default() -> Self {
        Self {
            member_name: None,
            status: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl OrderSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member_name(mut self, name: impl Into<String>) -> Self {
        self.member_name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Whether `order`, owned by `member`, satisfies every criterion.
    ///
    /// A blank member name filter matches everyone.
    pub fn matches(&self, order: &Order, member: &Member) -> bool {
        if let Some(status) = self.status {
            if order.status() != status {
                return false;
            }
        }

        match self.member_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => member.name().contains(name),
            _ => true,
        }
    }
}
