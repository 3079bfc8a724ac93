//! Demo settings read from the environment.

use anyhow::{Context, Result, ensure};

pub const PRICE_ENV: &str = "STOREFRONT_DEMO_PRICE";
pub const STOCK_ENV: &str = "STOREFRONT_DEMO_STOCK";
pub const COUNT_ENV: &str = "STOREFRONT_DEMO_COUNT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Unit price of the seeded item, in minor currency units.
    pub price: u64,
    /// Initial stock of the seeded item.
    pub stock: u64,
    /// Quantity ordered by the demo order.
    pub count: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            price: 10_000,
            stock: 10,
            count: 2,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            price: parse_or(&lookup, PRICE_ENV, defaults.price)?,
            stock: parse_or(&lookup, STOCK_ENV, defaults.stock)?,
            count: parse_or(&lookup, COUNT_ENV, defaults.count)?,
        };
        ensure!(config.count > 0, "{COUNT_ENV} must be positive");
        Ok(config)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: '{raw}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn missing_values_use_defaults() {
        assert_eq!(AppConfig::from_lookup(vars(&[])).unwrap(), AppConfig::default());
    }

    #[test]
    fn values_are_parsed() {
        let config =
            AppConfig::from_lookup(vars(&[(PRICE_ENV, "500"), (STOCK_ENV, " 3 "), (COUNT_ENV, "1")]))
                .unwrap();
        assert_eq!(
            config,
            AppConfig {
                price: 500,
                stock: 3,
                count: 1
            }
        );
    }

    #[test]
    fn invalid_value_names_the_variable() {
        let err = AppConfig::from_lookup(vars(&[(STOCK_ENV, "lots")])).unwrap_err();
        assert_eq!(err.to_string(), "invalid STOREFRONT_DEMO_STOCK: 'lots'");
    }

    #[test]
    fn zero_count_is_rejected() {
        let err = AppConfig::from_lookup(vars(&[(COUNT_ENV, "0")])).unwrap_err();
        assert_eq!(err.to_string(), "STOREFRONT_DEMO_COUNT must be positive");
    }
}
