//! Per-pair order book: eight sorted singly linked lists over one slab.
//!
//! ## Architecture
//!
//! - **Slab**: arena of [`OrderNode`]s, O(1) insert/remove/lookup by key
//! - **HashMap**: order id to slab key, O(1) lookup by id
//! - **Lists**: head and length per [`ListId`]; links live in the nodes
//!
//! ## Ordering
//!
//! - **Buy** lists: descending priority key
//! - **Sell** lists: ascending priority key
//! - Equal keys keep insertion order (FIFO)
//!
//! ## Hints
//!
//! Hinted insertion is O(1): the caller names the predecessor and the book
//! only checks the two neighbours. A wrong hint is rejected, never
//! repaired. Removal accepts a predecessor hint too, but falls back to a
//! scan from the head when the hint is wrong.
//!
//! ## Journal
//!
//! Between [`OrderBook::begin_journal`] and a commit or rollback, every
//! link, unlink and in-place update is recorded with what it replaced.
//! Rolling back replays the records in reverse, so undoing a call costs
//! as much as the call itself and not a copy of the book.
//!
//! ## Example
//!
//! ```
//! use tick_dex::orderbook::{Hint, ListId, OrderBook};
//! use tick_dex::types::{Order, OrderKind, Side};
//!
//! let buys = ListId::main(Side::Buy, OrderKind::Limit);
//! let mut book = OrderBook::with_capacity(16);
//!
//! book.insert(buys, Order::new_limit(1, 7, Side::Buy, 10, 1, 100, 5), Hint::Head).unwrap();
//! book.insert(buys, Order::new_limit(2, 7, Side::Buy, 10, 1, 90, 5), Hint::After(1)).unwrap();
//!
//! // 95 belongs between the two orders, not after the tail
//! let wrong = Order::new_limit(3, 7, Side::Buy, 10, 1, 95, 5);
//! assert!(book.insert(buys, wrong, Hint::After(2)).is_err());
//!
//! assert_eq!(book.head_id(buys), Some(1));
//! assert_eq!(book.len(buys), 2);
//! ```

use std::collections::HashMap;

use slab::Slab;
use ssz_rs::prelude::*;

use crate::error::{DexError, DexResult};
use crate::orderbook::{Hint, ListId, OrderList, OrderNode, Queue};
use crate::types::{Amount, Order, OrderId, OrderKind, Side, TickReceipt};

/// Orders of one token pair.
#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    /// Order storage, keyed by slab key
    orders: Slab<OrderNode>,

    /// Order id to slab key
    index: HashMap<OrderId, usize>,

    /// List heads, indexed by [`ListId::index`]
    lists: [OrderList; ListId::COUNT],

    /// Undo records, oldest first, while a journal is open
    journal: Option<Vec<Undo>>,
}

/// How to reverse one change to the book
#[derive(Debug, Clone)]
enum Undo {
    /// Unlink the order again
    Linked { id: OrderId, list: ListId, prev: Option<OrderId> },
    /// Link the order back after `prev`
    Unlinked { list: ListId, prev: Option<OrderId>, order: Order },
    /// Put back the order as it was before an update
    Updated(Order),
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a book with pre-allocated slots
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            index: HashMap::with_capacity(order_capacity),
            lists: Default::default(),
            journal: None,
        }
    }

    // ========================================================================
    // Size and Lookup
    // ========================================================================

    /// Number of orders in one list
    #[inline]
    pub fn len(&self, list: ListId) -> usize {
        self.lists[list.index()].len
    }

    /// Number of orders in the main lists of one side (limit + market)
    pub fn side_len(&self, side: Side) -> usize {
        self.len(ListId::main(side, OrderKind::Limit)) + self.len(ListId::main(side, OrderKind::Market))
    }

    /// Number of orders in all main lists
    pub fn main_len(&self) -> usize {
        self.side_len(Side::Buy) + self.side_len(Side::Sell)
    }

    /// Number of orders waiting in the pending lists
    pub fn pending_len(&self) -> usize {
        self.orders.len() - self.main_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.index.get(&id).map(|&key| &self.orders[key].order)
    }

    /// List the order is currently linked into
    pub fn list_of(&self, id: OrderId) -> Option<ListId> {
        self.index.get(&id).map(|&key| self.orders[key].list)
    }

    /// Most competitive order of a list
    pub fn head(&self, list: ListId) -> Option<&Order> {
        self.lists[list.index()].head.map(|key| &self.orders[key].order)
    }

    pub fn head_id(&self, list: ListId) -> Option<OrderId> {
        self.head(list).map(|order| order.id)
    }

    /// Id of the order linked after `id`
    pub fn next_id(&self, id: OrderId) -> Option<OrderId> {
        let key = *self.index.get(&id)?;
        let next = self.orders[key].next?;
        Some(self.orders[next].order_id())
    }

    /// First order after `prev`, or the head when `prev` is `None`
    pub fn first_after(&self, list: ListId, prev: Option<OrderId>) -> Option<OrderId> {
        match prev {
            None => self.head_id(list),
            Some(id) => self.next_id(id),
        }
    }

    /// Iterate a list from head to tail
    pub fn iter(&self, list: ListId) -> impl Iterator<Item = &Order> + '_ {
        let mut cursor = self.lists[list.index()].head;
        std::iter::from_fn(move || {
            let key = cursor?;
            let node = &self.orders[key];
            cursor = node.next;
            Some(&node.order)
        })
    }

    /// Hint that places an order with `key` after every equal key
    ///
    /// This is the hint a client would compute off-line before submitting.
    pub fn hint_for(&self, list: ListId, key: u128) -> Hint {
        let mut hint = Hint::Head;
        for order in self.iter(list) {
            if list.side.outranks(key, order.price_key) {
                break;
            }
            hint = Hint::After(order.id);
        }
        hint
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert at the position named by `hint`
    ///
    /// # Errors
    ///
    /// * `HintPredecessorMissing` - the hinted order is not in `list`
    /// * `HintKindMismatch` - the hinted order is in the other kind's list
    /// * `ShouldGoBefore` - the new order outranks the hinted predecessor
    /// * `ShouldGoAfter` - the hinted successor does not rank below the new order
    /// * `NotBelongingToHead` - `Hint::Head` while the head ranks equal or better
    pub fn insert(&mut self, list: ListId, order: Order, hint: Hint) -> DexResult<()> {
        if self.index.contains_key(&order.id) {
            return Err(DexError::DuplicateOrder(order.id));
        }
        let prev = self.validate_hint(list, order.price_key, hint)?;
        self.link(list, order, prev);
        Ok(())
    }

    /// Insert by scanning from the head
    pub fn insert_sorted(&mut self, list: ListId, order: Order) -> DexResult<()> {
        self.insert_sorted_from(list, order, None)
    }

    /// Insert by scanning forward from `anchor`
    ///
    /// The anchor is used only if it sits in `list` and the new order does
    /// not outrank it. Otherwise the scan starts at the head.
    pub fn insert_sorted_from(
        &mut self,
        list: ListId,
        order: Order,
        anchor: Option<OrderId>,
    ) -> DexResult<()> {
        if self.index.contains_key(&order.id) {
            return Err(DexError::DuplicateOrder(order.id));
        }
        let side = list.side;
        let key = order.price_key;

        let mut prev = anchor
            .and_then(|id| self.index.get(&id).copied())
            .filter(|&k| self.orders[k].list == list && !side.outranks(key, self.orders[k].key()));
        let mut cursor = match prev {
            Some(p) => self.orders[p].next,
            None => self.lists[list.index()].head,
        };
        while let Some(current) = cursor {
            if side.outranks(key, self.orders[current].key()) {
                break;
            }
            prev = Some(current);
            cursor = self.orders[current].next;
        }

        self.link(list, order, prev);
        Ok(())
    }

    /// Check that `hint` is a valid position for `key` without inserting
    pub fn check_hint(&self, list: ListId, key: u128, hint: Hint) -> DexResult<()> {
        self.validate_hint(list, key, hint).map(|_| ())
    }

    fn validate_hint(&self, list: ListId, key: u128, hint: Hint) -> DexResult<Option<usize>> {
        let side = list.side;
        match hint {
            Hint::Head => {
                if let Some(head) = self.lists[list.index()].head {
                    if !side.outranks(key, self.orders[head].key()) {
                        return Err(DexError::NotBelongingToHead);
                    }
                }
                Ok(None)
            }
            Hint::After(prev_id) => {
                let prev = *self
                    .index
                    .get(&prev_id)
                    .ok_or(DexError::HintPredecessorMissing(prev_id))?;
                let node = &self.orders[prev];
                if node.list != list {
                    if node.list.side == list.side && node.list.queue == list.queue {
                        return Err(DexError::HintKindMismatch {
                            order_id: prev_id,
                            expected: list.kind,
                        });
                    }
                    return Err(DexError::HintPredecessorMissing(prev_id));
                }
                if side.outranks(key, node.key()) {
                    return Err(DexError::ShouldGoBefore(prev_id));
                }
                if let Some(next) = node.next {
                    let successor = &self.orders[next];
                    if !side.outranks(key, successor.key()) {
                        return Err(DexError::ShouldGoAfter(successor.order_id()));
                    }
                }
                Ok(Some(prev))
            }
        }
    }

    fn link(&mut self, list: ListId, order: Order, prev: Option<usize>) {
        let id = order.id;
        let idx = list.index();
        let key = self.orders.insert(OrderNode::new(order, list));
        match prev {
            None => {
                self.orders[key].next = self.lists[idx].head;
                self.lists[idx].head = Some(key);
            }
            Some(p) => {
                self.orders[key].next = self.orders[p].next;
                self.orders[p].next = Some(key);
            }
        }
        self.lists[idx].len += 1;
        self.index.insert(id, key);
        if let Some(journal) = self.journal.as_mut() {
            let prev = prev.map(|p| self.orders[p].order_id());
            journal.push(Undo::Linked { id, list, prev });
        }
    }

    // ========================================================================
    // Removal and Updates
    // ========================================================================

    /// Remove an order, using `prev_hint` if it is the true predecessor
    ///
    /// A wrong or missing hint costs a scan from the head of the order's list.
    pub fn remove(&mut self, id: OrderId, prev_hint: Option<OrderId>) -> DexResult<Order> {
        let key = *self.index.get(&id).ok_or(DexError::OrderNotFound(id))?;
        let list = self.orders[key].list;

        let hinted = prev_hint
            .and_then(|h| self.index.get(&h).copied())
            .filter(|&p| self.orders[p].next == Some(key));
        let prev = match hinted {
            Some(p) => Some(p),
            None => self
                .scan_predecessor(list, key)
                .ok_or(DexError::OrderNotFound(id))?,
        };
        Ok(self.unlink(list, prev, key))
    }

    /// Unlink the order right after `prev` (or the head) in O(1)
    pub fn remove_after(&mut self, list: ListId, prev: Option<OrderId>) -> Option<Order> {
        let prev_key = match prev {
            None => None,
            Some(id) => {
                let key = *self.index.get(&id)?;
                if self.orders[key].list != list {
                    return None;
                }
                Some(key)
            }
        };
        let key = match prev_key {
            None => self.lists[list.index()].head?,
            Some(p) => self.orders[p].next?,
        };
        Some(self.unlink(list, prev_key, key))
    }

    /// Remove and return the head of a list
    pub fn pop_front(&mut self, list: ListId) -> Option<Order> {
        self.remove_after(list, None)
    }

    /// Id of the order linked before `id`, `None` when `id` is the head
    pub fn find_previous(&self, id: OrderId) -> DexResult<Option<OrderId>> {
        let key = *self.index.get(&id).ok_or(DexError::OrderNotFound(id))?;
        let list = self.orders[key].list;
        let prev = self
            .scan_predecessor(list, key)
            .ok_or(DexError::OrderNotFound(id))?;
        Ok(prev.map(|p| self.orders[p].order_id()))
    }

    /// Decrement a partially matched order in place
    pub fn consume(&mut self, id: OrderId, amount: Amount, commission: Amount) -> DexResult<&Order> {
        let key = *self.index.get(&id).ok_or(DexError::OrderNotFound(id))?;
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::Updated(self.orders[key].order.clone()));
        }
        let node = &mut self.orders[key];
        node.order.consume(amount, commission);
        Ok(&node.order)
    }

    /// `Some(prev)` when `key` is linked in `list`, where `prev` is its predecessor
    fn scan_predecessor(&self, list: ListId, key: usize) -> Option<Option<usize>> {
        let mut prev = None;
        let mut cursor = self.lists[list.index()].head;
        while let Some(current) = cursor {
            if current == key {
                return Some(prev);
            }
            prev = Some(current);
            cursor = self.orders[current].next;
        }
        None
    }

    fn unlink(&mut self, list: ListId, prev: Option<usize>, key: usize) -> Order {
        let idx = list.index();
        let next = self.orders[key].next;
        match prev {
            None => self.lists[idx].head = next,
            Some(p) => self.orders[p].next = next,
        }
        self.lists[idx].len -= 1;
        let node = self.orders.remove(key);
        self.index.remove(&node.order.id);
        if let Some(journal) = self.journal.as_mut() {
            journal.push(Undo::Unlinked {
                list,
                prev: prev.map(|p| self.orders[p].order_id()),
                order: node.order.clone(),
            });
        }
        node.order
    }

    // ========================================================================
    // Journal
    // ========================================================================

    /// Start recording changes, discarding any open journal
    pub fn begin_journal(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Keep every change since [`begin_journal`](Self::begin_journal)
    pub fn commit_journal(&mut self) {
        self.journal = None;
    }

    /// Undo every change since [`begin_journal`](Self::begin_journal)
    ///
    /// Without an open journal this does nothing.
    pub fn rollback_journal(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for undo in journal.into_iter().rev() {
            match undo {
                Undo::Linked { id, list, prev } => {
                    let prev = prev.and_then(|id| self.index.get(&id).copied());
                    if let Some(&key) = self.index.get(&id) {
                        self.unlink(list, prev, key);
                    }
                }
                Undo::Unlinked { list, prev, order } => {
                    let prev = prev.and_then(|id| self.index.get(&id).copied());
                    self.link(list, order, prev);
                }
                Undo::Updated(order) => {
                    if let Some(&key) = self.index.get(&order.id) {
                        self.orders[key].order = order;
                    }
                }
            }
        }
    }

    // ========================================================================
    // State Root
    // ========================================================================

    /// SHA-256 over the SSZ encoding of every main-list order, in list order
    pub fn state_root(&self) -> DexResult<[u8; 32]> {
        let mut bytes = Vec::with_capacity(self.main_len() * 74);
        for side in [Side::Buy, Side::Sell] {
            for kind in [OrderKind::Limit, OrderKind::Market] {
                for order in self.iter(ListId::main(side, kind)) {
                    order
                        .serialize(&mut bytes)
                        .map_err(|e| DexError::Encoding(format!("{:?}", e)))?;
                }
            }
        }
        Ok(TickReceipt::compute_hash(&bytes))
    }

    /// True when every list is sorted by its side's ordering
    pub fn is_sorted(&self) -> bool {
        [Queue::Main, Queue::Pending].into_iter().all(|queue| {
            [Side::Buy, Side::Sell].into_iter().all(|side| {
                [OrderKind::Limit, OrderKind::Market].into_iter().all(|kind| {
                    let list = ListId { side, kind, queue };
                    let keys: Vec<u128> = self.iter(list).map(|o| o.price_key).collect();
                    keys.windows(2).all(|w| !side.outranks(w[1], w[0]))
                })
            })
        })
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
