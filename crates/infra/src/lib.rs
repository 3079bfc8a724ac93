//! Infrastructure layer: repositories, transaction boundary, stores, and the
//! order service that orchestrates them.

pub mod error;
pub mod order_service;
pub mod repository;
pub mod store;


pub use error::OrderServiceError;
pub use order_service::OrderService;
pub use repository::{ItemRepository, MemberRepository, OrderRepository};
pub use store::{
    InMemoryStore, InMemoryTransaction, StoreError, Transaction, TransactionManager,
    in_transaction, read_only,
};
