//! List identifiers and list heads.
//!
//! A pair owns eight lists: main and pending, for each side and kind.
//! Each list is sorted by priority key (descending for buys, ascending for
//! sells) with FIFO order among equal keys.

use crate::types::{OrderKind, Side};

/// Main book or pending queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Queue {
    Main,
    Pending,
}

/// Identifies one of a pair's eight lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListId {
    pub side: Side,
    pub kind: OrderKind,
    pub queue: Queue,
}

impl ListId {
    /// Number of distinct lists per pair
    pub const COUNT: usize = 8;

    pub const fn main(side: Side, kind: OrderKind) -> Self {
        Self {
            side,
            kind,
            queue: Queue::Main,
        }
    }

    pub const fn pending(side: Side, kind: OrderKind) -> Self {
        Self {
            side,
            kind,
            queue: Queue::Pending,
        }
    }

    /// Same side and kind in the main book
    pub const fn to_main(self) -> Self {
        Self::main(self.side, self.kind)
    }

    /// Dense index into a `[_; ListId::COUNT]` array
    #[inline]
    pub fn index(self) -> usize {
        let queue = match self.queue {
            Queue::Main => 0,
            Queue::Pending => 4,
        };
        queue + (self.side.to_u8() as usize) * 2 + self.kind.to_u8() as usize
    }
}

/// Head and length of a singly linked list stored in the book's slab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderList {
    /// Slab key of the most competitive order
    pub head: Option<usize>,

    /// Number of linked orders
    pub len: usize,
}

impl OrderList {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_list_indices_are_distinct() {
        let mut seen = HashSet::new();
        for side in [Side::Buy, Side::Sell] {
            for kind in [OrderKind::Limit, OrderKind::Market] {
                assert!(seen.insert(ListId::main(side, kind).index()));
                assert!(seen.insert(ListId::pending(side, kind).index()));
            }
        }
        assert_eq!(seen.len(), ListId::COUNT);
        assert!(seen.iter().all(|&i| i < ListId::COUNT));
    }

    #[test]
    fn test_to_main() {
        let pending = ListId::pending(Side::Sell, OrderKind::Market);
        assert_eq!(pending.to_main(), ListId::main(Side::Sell, OrderKind::Market));
    }
}
