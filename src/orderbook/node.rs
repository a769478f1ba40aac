//! Order node for slab-based storage.
//!
//! ## Design
//!
//! `OrderNode` wraps an `Order` with a single forward link. Lists are
//! singly linked: removal needs the predecessor, which callers supply as a
//! hint or the book finds by scanning from the head.
//!
//! ## Slab Integration
//!
//! Per official slab docs (https://docs.rs/slab/0.4.11):
//! - Keys are `usize` values returned by `slab.insert()`
//! - Keys may be reused after `slab.remove()`
//! - O(1) insert, remove, and lookup

use crate::orderbook::ListId;
use crate::types::{Order, OrderId};

/// Order node stored in the slab.
///
/// `next` is a slab key, not a reference. `list` records which of the
/// pair's lists the node is linked into.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The order data
    pub order: Order,

    /// Next order in the list (slab key), `None` at the tail
    pub next: Option<usize>,

    /// List this node belongs to
    pub list: ListId,
}

impl OrderNode {
    #[inline]
    pub fn new(order: Order, list: ListId) -> Self {
        Self {
            order,
            next: None,
            list,
        }
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order.id
    }

    /// Priority key of the wrapped order
    #[inline]
    pub fn key(&self) -> u128 {
        self.order.price_key
    }
}
