//! Merged traversal of a side's limit and market lists.
//!
//! Simulation and matching both see one side of the book as a single
//! sequence: the next limit order and the next market order are compared by
//! effective price and the better one comes first. On equal effective
//! prices the limit order wins.
//!
//! A [`Walk`] remembers, per list, the last order the traversal stepped
//! past while leaving it linked. The next candidate of a list is always the
//! order right after that cursor, so orders removed by matching never
//! invalidate the cursor.

use crate::error::{DexError, DexResult, OrOverflow};
use crate::orderbook::{ListId, OrderBook};
use crate::types::{Amount, OrderId, OrderKind, Price, Side};

/// Cursor over one side of the main book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Walk {
    /// Last limit order passed over (still linked)
    pub limit_prev: Option<OrderId>,

    /// Last market order passed over (still linked)
    pub market_prev: Option<OrderId>,

    /// Order currently being consumed by the simulation
    pub current: Option<OrderId>,

    /// Simulated remaining amount of `current`
    pub remaining: Amount,
}

impl Walk {
    /// Cursor of the list holding `kind` orders
    pub fn prev(&self, kind: OrderKind) -> Option<OrderId> {
        match kind {
            OrderKind::Limit => self.limit_prev,
            OrderKind::Market => self.market_prev,
        }
    }

    /// Step past `id`, leaving it in the list
    pub fn pass(&mut self, id: OrderId, kind: OrderKind) {
        match kind {
            OrderKind::Limit => self.limit_prev = Some(id),
            OrderKind::Market => self.market_prev = Some(id),
        }
        if self.current == Some(id) {
            self.current = None;
            self.remaining = 0;
        }
    }
}

/// Next candidate of a side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    /// Live order with its effective price
    Ready(OrderId, Price),
    /// Expired order that must be stepped over
    Expired(OrderId, OrderKind),
    /// Both lists are exhausted
    Exhausted,
}

/// Choose the next order of `side` after the walk's cursors
///
/// An expired candidate is reported before any price comparison so that it
/// is skipped without shadowing live orders behind it.
pub fn pick(
    book: &OrderBook,
    side: Side,
    walk: &Walk,
    tick_number: u64,
    market_price: Price,
) -> DexResult<Pick> {
    let limit = book.first_after(ListId::main(side, OrderKind::Limit), walk.limit_prev);
    let market = book.first_after(ListId::main(side, OrderKind::Market), walk.market_prev);

    let mut best: Option<(OrderId, Price)> = None;
    for id in [limit, market].into_iter().flatten() {
        let order = book.get(id).ok_or(DexError::OrderNotFound(id))?;
        if order.is_expired(tick_number) {
            return Ok(Pick::Expired(id, order.kind()));
        }
        let price = order.effective_price(market_price).or_overflow()?;
        // limit is visited first, so a market order must strictly outrank it
        match best {
            Some((_, best_price)) if !side.outranks(price, best_price) => {}
            _ => best = Some((id, price)),
        }
    }

    Ok(match best {
        Some((id, price)) => Pick::Ready(id, price),
        None => Pick::Exhausted,
    })
}
