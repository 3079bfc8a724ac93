//! Orders domain module.
//!
//! Order placement and cancellation as deterministic domain logic: building
//! lines against catalog items (which moves their stock), assembling the order
//! aggregate, and reversing it. No IO, no storage.

pub mod delivery;
pub mod line;
pub mod order;
pub mod search;

pub use delivery::Delivery;
pub use line::OrderLine;
pub use order::{
    Order, OrderCancelled, OrderEvent, OrderId, OrderPlaced, OrderStatus, StockMovement,
};
pub use search::{DEFAULT_SEARCH_LIMIT, OrderSearch};
