//! Order book module for the tick exchange.
//!
//! ## Architecture
//!
//! Each token pair owns one [`OrderBook`] with eight price-ordered lists:
//!
//! | Queue   | Buy             | Sell            |
//! |---------|-----------------|-----------------|
//! | Main    | limit, market   | limit, market   |
//! | Pending | limit, market   | limit, market   |
//!
//! Pending lists hold orders submitted while a tick is running. They are
//! merged into the main lists when the tick finishes matching.
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus a forward link, stored in a slab
//! - [`ListId`] / [`OrderList`]: list identity and head/length
//! - [`OrderBook`]: the arena, the id index and the eight lists
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Hinted insert | O(1) |
//! | Unhinted insert | O(n) |
//! | Remove with correct hint | O(1) |
//! | Remove with wrong hint | O(n) |
//! | Lookup by id | O(1) |

pub mod node;
pub mod list;
pub mod book;

pub use node::OrderNode;
pub use list::{ListId, OrderList, Queue};
pub use book::OrderBook;

use crate::types::OrderId;

/// Caller-supplied insertion position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    /// The new order becomes the head of the list
    Head,
    /// The new order goes right after this order
    After(OrderId),
}

impl Hint {
    /// Hint form of an optional predecessor id
    pub fn from_previous(previous: Option<OrderId>) -> Self {
        previous.map_or(Hint::Head, Hint::After)
    }
}
