use serde::{Deserialize, Serialize};

use storefront_core::{AggregateRoot, DomainError, DomainResult, Entity};

storefront_core::define_id!(
    /// Catalog item identifier.
    ItemId
);

/// Aggregate root: Item.
///
/// Stock is only ever changed through [`Item::decrease`] and [`Item::increase`];
/// that pair is the single place where the non-negative stock invariant is
/// enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    /// Unit price in the smallest currency unit.
    price: u64,
    stock: u64,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, price: u64, stock: u64) -> DomainResult<Self> {
        let name = validate_name(name.into())?;
        Ok(Self {
            id,
            name,
            price,
            stock,
        })
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }

    pub fn has_stock_for(&self, amount: u32) -> bool {
        u64::from(amount) <= self.stock
    }

    /// Take `amount` units out of stock.
    ///
    /// Fails with [`DomainError::InsufficientStock`] (leaving stock untouched)
    /// when fewer than `amount` units are on hand.
    pub fn decrease(&mut self, amount: u32) -> DomainResult<()> {
        let requested = u64::from(amount);
        let remaining = self
            .stock
            .checked_sub(requested)
            .ok_or_else(|| DomainError::insufficient_stock(requested, self.stock))?;
        self.stock = remaining;
        Ok(())
    }

    /// Put `amount` units back into stock. There is no inventory cap beyond
    /// `u64::MAX`, where stock saturates.
    pub fn increase(&mut self, amount: u32) {
        self.stock = self.stock.saturating_add(u64::from(amount));
    }

    /// Rename and/or reprice the item. Orders already placed keep the price
    /// captured on their lines.
    pub fn update_details(&mut self, name: impl Into<String>, price: u64) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        self.price = price;
        Ok(())
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("item name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Item {
    const AGGREGATE_TYPE: &'static str = "catalog.item";
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn book(stock: u64) -> Item {
        Item::new(ItemId::generate(), "jpa", 10_000, stock).unwrap()
    }

    #[test]
    fn decrease_takes_units_out_of_stock() {
        let mut item = book(10);
        item.decrease(2).unwrap();
        assert_eq!(item.stock(), 8);
    }

    #[test]
    fn decrease_to_exactly_zero_is_allowed() {
        let mut item = book(3);
        item.decrease(3).unwrap();
        assert_eq!(item.stock(), 0);
        assert!(!item.has_stock_for(1));
    }

    #[test]
    fn decrease_beyond_stock_fails_without_change() {
        let mut item = book(10);
        let err = item.decrease(11).unwrap_err();
        assert_eq!(err, DomainError::insufficient_stock(11, 10));
        assert_eq!(item.stock(), 10);
    }

    #[test]
    fn increase_has_no_cap() {
        let mut item = book(u64::from(u32::MAX));
        item.increase(u32::MAX);
        assert_eq!(item.stock(), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn increase_saturates_at_the_stock_ceiling() {
        let mut item = book(u64::MAX - 1);
        item.increase(5);
        assert_eq!(item.stock(), u64::MAX);
    }

    #[test]
    fn update_details_rejects_blank_name() {
        let mut item = book(1);
        let err = item.update_details("  ", 5).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(item.name(), "jpa");
        assert_eq!(item.price(), 10_000);

        item.update_details("jpa 2nd edition", 12_000).unwrap();
        assert_eq!(item.name(), "jpa 2nd edition");
        assert_eq!(item.price(), 12_000);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: a decrease succeeds exactly when it fits, and stock never
        /// goes negative or changes on failure.
        #[test]
        fn decrease_respects_stock(stock in 0u64..10_000, amount in 0u32..20_000) {
            let mut item = book(stock);
            let result = item.decrease(amount);

            if u64::from(amount) <= stock {
                prop_assert!(result.is_ok());
                prop_assert_eq!(item.stock(), stock - u64::from(amount));
            } else {
                prop_assert_eq!(
                    result,
                    Err(DomainError::insufficient_stock(u64::from(amount), stock))
                );
                prop_assert_eq!(item.stock(), stock);
            }
        }

        /// Property: increase undoes a successful decrease.
        #[test]
        fn increase_reverses_decrease(stock in 0u64..10_000, amount in 0u32..10_000) {
            prop_assume!(u64::from(amount) <= stock);
            let mut item = book(stock);
            item.decrease(amount).unwrap();
            item.increase(amount);
            prop_assert_eq!(item.stock(), stock);
        }
    }
}
