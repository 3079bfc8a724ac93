use thiserror::Error;

use storefront_core::DomainError;

use crate::store::StoreError;

/// Error returned by [`crate::OrderService`] operations.
///
/// Nothing is retried internally. Every variant means the operation's
/// transaction was rolled back and no effect is visible.
#[derive(Debug, Error)]
pub enum OrderServiceError {
    /// An identifier did not resolve (`entity` is "member", "item" or "order").
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("insufficient stock (requested: {requested}, available: {available})")]
    InsufficientStock { requested: u64, available: u64 },

    #[error("order already cancelled")]
    AlreadyCancelled,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Optimistic concurrency failure; the caller may retry the whole operation.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store failure: {0}")]
    Store(StoreError),
}

impl OrderServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<DomainError> for OrderServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::InvariantViolation(msg) => Self::InvariantViolation(msg),
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                requested,
                available,
            },
            DomainError::AlreadyCancelled => Self::AlreadyCancelled,
        }
    }
}

impl From<StoreError> for OrderServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => Self::Conflict(msg),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_keep_their_kind() {
        assert!(matches!(
            OrderServiceError::from(DomainError::insufficient_stock(11, 10)),
            OrderServiceError::InsufficientStock {
                requested: 11,
                available: 10
            }
        ));
        assert!(matches!(
            OrderServiceError::from(DomainError::AlreadyCancelled),
            OrderServiceError::AlreadyCancelled
        ));
    }

    #[test]
    fn malformed_ids_are_validation_errors() {
        let err = OrderServiceError::from(DomainError::invalid_id("ItemId: not a uuid: x"));
        assert_eq!(err.to_string(), "validation failed: ItemId: not a uuid: x");
    }

    #[test]
    fn store_conflicts_become_conflicts() {
        let err = OrderServiceError::from(StoreError::Concurrency("item x".into()));
        assert_eq!(err.to_string(), "conflict: item x");
        assert!(matches!(
            OrderServiceError::from(StoreError::Poisoned),
            OrderServiceError::Store(StoreError::Poisoned)
        ));
    }
}
