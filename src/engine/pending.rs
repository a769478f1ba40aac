//! Pending queue merge.
//!
//! Orders that arrived during a tick are moved into the main book one per
//! step, in a fixed order of lists: buy limit, buy market, sell limit, sell
//! market. Each list is drained head first, so orders keep their relative
//! priority.
//!
//! A caller-supplied hint is consumed for every moved order while hints
//! last; a wrong hint fails the call like a wrong hint on direct insertion.
//! Without hints the order is placed by scanning forward from the previously
//! moved order.

use tracing::debug;

use crate::engine::page::PageMemory;
use crate::engine::Progress;
use crate::error::DexResult;
use crate::orderbook::{Hint, ListId, OrderBook};
use crate::types::{OrderKind, Side};

const MERGE_ORDER: [ListId; 4] = [
    ListId::pending(Side::Buy, OrderKind::Limit),
    ListId::pending(Side::Buy, OrderKind::Market),
    ListId::pending(Side::Sell, OrderKind::Limit),
    ListId::pending(Side::Sell, OrderKind::Market),
];

/// Move at most one pending order into the main book
pub fn step(
    book: &mut OrderBook,
    page: &mut PageMemory,
    hints: &mut impl Iterator<Item = Hint>,
    budget: &mut u64,
) -> DexResult<Progress> {
    let Some(source) = MERGE_ORDER.into_iter().find(|&list| book.len(list) > 0) else {
        return Ok(Progress::Finished);
    };
    if *budget == 0 {
        return Ok(Progress::OutOfSteps);
    }
    let Some(order) = book.pop_front(source) else {
        return Ok(Progress::Finished);
    };
    *budget -= 1;

    let target = source.to_main();
    let id = order.id;
    match hints.next() {
        Some(hint) => book.insert(target, order, hint)?,
        None => book.insert_sorted_from(target, order, page.pending_anchor)?,
    }
    page.pending_anchor = Some(id);

    debug!("moved pending order {} into {:?} {:?} list", id, target.side, target.kind);
    Ok(Progress::Advanced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DexError;
    use crate::types::Order;

    fn limit(id: u64, side: Side, price: u128) -> Order {
        Order::new_limit(id, 1, side, 10, 0, price, 9)
    }

    fn drain(book: &mut OrderBook, hints: Vec<Hint>) -> DexResult<u64> {
        let mut page = PageMemory::default();
        let mut hints = hints.into_iter();
        let mut budget = u64::MAX;
        while step(book, &mut page, &mut hints, &mut budget)? == Progress::Advanced {}
        Ok(u64::MAX - budget)
    }

    #[test]
    fn test_merge_keeps_price_order() {
        let main = ListId::main(Side::Sell, OrderKind::Limit);
        let pending = ListId::pending(Side::Sell, OrderKind::Limit);
        let mut book = OrderBook::new();
        book.insert_sorted(main, limit(1, Side::Sell, 10)).unwrap();
        book.insert_sorted(main, limit(2, Side::Sell, 30)).unwrap();
        book.insert_sorted(pending, limit(3, Side::Sell, 20)).unwrap();
        book.insert_sorted(pending, limit(4, Side::Sell, 5)).unwrap();
        book.insert_sorted(pending, limit(5, Side::Sell, 30)).unwrap();
        book.insert_sorted(ListId::pending(Side::Buy, OrderKind::Limit), limit(6, Side::Buy, 1))
            .unwrap();

        assert_eq!(drain(&mut book, vec![]).unwrap(), 4);
        let ids: Vec<u64> = book.iter(main).map(|o| o.id).collect();
        assert_eq!(ids, vec![4, 1, 3, 2, 5]);
        assert_eq!(book.pending_len(), 0);
        assert_eq!(book.len(ListId::main(Side::Buy, OrderKind::Limit)), 1);
    }

    #[test]
    fn test_merge_with_hints() {
        let main = ListId::main(Side::Buy, OrderKind::Limit);
        let pending = ListId::pending(Side::Buy, OrderKind::Limit);
        let mut book = OrderBook::new();
        book.insert_sorted(main, limit(1, Side::Buy, 10)).unwrap();
        book.insert_sorted(pending, limit(2, Side::Buy, 20)).unwrap();
        book.insert_sorted(pending, limit(3, Side::Buy, 5)).unwrap();

        drain(&mut book, vec![Hint::Head, Hint::After(1)]).unwrap();
        let ids: Vec<u64> = book.iter(main).map(|o| o.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_merge_rejects_wrong_hint() {
        let main = ListId::main(Side::Buy, OrderKind::Limit);
        let pending = ListId::pending(Side::Buy, OrderKind::Limit);
        let mut book = OrderBook::new();
        book.insert_sorted(main, limit(1, Side::Buy, 10)).unwrap();
        book.insert_sorted(pending, limit(2, Side::Buy, 20)).unwrap();

        assert_eq!(drain(&mut book, vec![Hint::After(1)]), Err(DexError::ShouldGoBefore(1)));
    }

    #[test]
    fn test_merge_respects_budget() {
        let pending = ListId::pending(Side::Buy, OrderKind::Market);
        let mut book = OrderBook::new();
        for id in 1..=3 {
            book.insert_sorted(pending, Order::new_market(id, 1, Side::Buy, 10, 0, 100, 9))
                .unwrap();
        }
        let mut page = PageMemory::default();
        let mut budget = 2;
        let mut hints = std::iter::empty::<Hint>();
        while step(&mut book, &mut page, &mut hints, &mut budget).unwrap() == Progress::Advanced {}
        assert_eq!(book.pending_len(), 1);
        assert_eq!(page.pending_anchor, Some(2));
    }
}
