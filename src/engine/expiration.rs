//! Expiration processing.
//!
//! Walks one main list from a starting order and unlinks every expired
//! order it visits. Live orders are stepped over. Each visited order costs
//! one step, so a long run of live orders can exhaust the budget before an
//! expired one is reached; the caller resumes from a later start.
//!
//! Refunds are computed by the caller: this module only decides which
//! orders leave the book.

use tracing::debug;

use crate::error::{DexError, DexResult};
use crate::orderbook::{ListId, OrderBook};
use crate::types::{Order, OrderId};

/// Resolve the predecessor of `start` inside `list`
fn locate(
    book: &OrderBook,
    list: ListId,
    start: OrderId,
    prev_hint: Option<OrderId>,
) -> DexResult<Option<OrderId>> {
    match book.list_of(start) {
        Some(found) if found == list => {}
        Some(found) if found.side == list.side && found.queue == list.queue => {
            return Err(DexError::OrderKindMismatch { expected: list.kind });
        }
        _ => return Err(DexError::OrderNotFound(start)),
    }

    match prev_hint {
        // a hint that names a live order must be the real predecessor
        Some(hint) if book.contains(hint) => {
            if book.next_id(hint) != Some(start) {
                return Err(DexError::PreviousOrderNotFound(hint));
            }
            Ok(Some(hint))
        }
        _ => book.find_previous(start),
    }
}

/// Remove expired orders from `list`, visiting at most `steps` orders
///
/// The walk starts at `start` (the head when `None`). Returns the removed
/// orders in list order.
///
/// # Errors
///
/// * `OrderNotFound` - `start` is not linked in this side's main lists
/// * `OrderKindMismatch` - `start` is an order of the other kind
/// * `PreviousOrderNotFound` - `prev_hint` names an order that does not precede `start`
/// * `NoExpiredOrderFound` - no visited order was expired
pub fn process(
    book: &mut OrderBook,
    list: ListId,
    start: Option<OrderId>,
    prev_hint: Option<OrderId>,
    steps: u64,
    tick_number: u64,
) -> DexResult<Vec<Order>> {
    if steps == 0 {
        return Err(DexError::ZeroSteps);
    }

    let mut prev = match start {
        Some(id) => locate(book, list, id, prev_hint)?,
        None => None,
    };
    let mut cursor = match start {
        Some(id) => Some(id),
        None => book.head_id(list),
    };

    let mut removed = Vec::new();
    let mut budget = steps;
    while let Some(id) = cursor {
        if budget == 0 {
            break;
        }
        budget -= 1;

        let expired = book
            .get(id)
            .map(|order| order.is_expired(tick_number))
            .ok_or(DexError::OrderNotFound(id))?;
        if expired {
            let order = book
                .remove_after(list, prev)
                .filter(|order| order.id == id)
                .ok_or(DexError::OrderNotFound(id))?;
            debug!("order {} expired at tick {}", id, order.expires_in_tick);
            removed.push(order);
            cursor = book.first_after(list, prev);
        } else {
            prev = Some(id);
            cursor = book.next_id(id);
        }
    }

    if removed.is_empty() {
        return Err(DexError::NoExpiredOrderFound);
    }
    Ok(removed)
}

/// True when `list` holds at least one expired order
pub fn has_expired(book: &OrderBook, list: ListId, tick_number: u64) -> bool {
    book.iter(list).any(|order| order.is_expired(tick_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OrderKind, Side};

    const LIST: ListId = ListId::main(Side::Sell, OrderKind::Limit);

    /// Sell limits priced by id, expiring at the given tick
    fn book_with(expiries: &[(u64, u64)]) -> OrderBook {
        let mut book = OrderBook::new();
        for &(id, expires) in expiries {
            let order = Order::new_limit(id, 1, Side::Sell, 10, 1, u128::from(id), expires);
            book.insert_sorted(LIST, order).unwrap();
        }
        book
    }

    fn ids(book: &OrderBook) -> Vec<OrderId> {
        book.iter(LIST).map(|o| o.id).collect()
    }

    #[test]
    fn test_removes_expired_and_keeps_live() {
        let mut book = book_with(&[(1, 2), (2, 9), (3, 1), (4, 3)]);
        let removed = process(&mut book, LIST, None, None, 10, 2).unwrap();
        assert_eq!(removed.iter().map(|o| o.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(ids(&book), vec![2, 4]);
    }

    #[test]
    fn test_second_call_finds_nothing() {
        let mut book = book_with(&[(1, 1), (2, 9)]);
        process(&mut book, LIST, None, None, 10, 1).unwrap();
        assert_eq!(
            process(&mut book, LIST, None, None, 10, 1),
            Err(DexError::NoExpiredOrderFound)
        );
    }

    #[test]
    fn test_budget_counts_visited_orders() {
        let mut book = book_with(&[(1, 9), (2, 9), (3, 1)]);
        assert_eq!(
            process(&mut book, LIST, None, None, 2, 1),
            Err(DexError::NoExpiredOrderFound)
        );
        assert_eq!(book.len(LIST), 3);
        let removed = process(&mut book, LIST, Some(3), Some(2), 1, 1).unwrap();
        assert_eq!(removed[0].id, 3);
    }

    #[test]
    fn test_start_with_hints() {
        let mut book = book_with(&[(1, 1), (2, 1), (3, 1)]);

        // wrong live hint is rejected
        assert_eq!(
            process(&mut book, LIST, Some(3), Some(1), 5, 1),
            Err(DexError::PreviousOrderNotFound(1))
        );
        // unknown hint falls back to a scan
        let removed = process(&mut book, LIST, Some(3), Some(77), 5, 1).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(ids(&book), vec![1, 2]);

        let removed = process(&mut book, LIST, Some(2), Some(1), 5, 1).unwrap();
        assert_eq!(removed[0].id, 2);
        assert_eq!(ids(&book), vec![1]);
    }

    #[test]
    fn test_start_in_wrong_list() {
        let mut book = book_with(&[(1, 1)]);
        let market = Order::new_market(9, 1, Side::Sell, 10, 0, 5, 1);
        book.insert_sorted(ListId::main(Side::Sell, OrderKind::Market), market)
            .unwrap();
        let buy = Order::new_limit(8, 1, Side::Buy, 10, 0, 5, 1);
        book.insert_sorted(ListId::main(Side::Buy, OrderKind::Limit), buy)
            .unwrap();

        assert_eq!(
            process(&mut book, LIST, Some(9), None, 5, 1),
            Err(DexError::OrderKindMismatch { expected: OrderKind::Limit })
        );
        assert_eq!(
            process(&mut book, LIST, Some(8), None, 5, 1),
            Err(DexError::OrderNotFound(8))
        );
        assert_eq!(
            process(&mut book, LIST, Some(42), None, 5, 1),
            Err(DexError::OrderNotFound(42))
        );
    }

    #[test]
    fn test_has_expired() {
        let book = book_with(&[(1, 5), (2, 3)]);
        assert!(!has_expired(&book, LIST, 2));
        assert!(has_expired(&book, LIST, 3));
    }
}
