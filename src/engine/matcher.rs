//! Matching executor.
//!
//! Re-walks the book from the heads and settles every compatible pair at
//! the frozen emergent price. Filled orders are unlinked, partially filled
//! ones are decremented in place and stay at the front. Expired orders are
//! stepped over and left for the expiration processor.
//!
//! Nothing is paid out here: payouts, commission charges and events are
//! queued in [`Effects`] and applied by the caller once the call succeeds.

use tracing::debug;

use crate::config::SurplusPolicy;
use crate::engine::effects::Effects;
use crate::engine::page::PageMemory;
use crate::engine::settlement::settle;
use crate::engine::walk::{pick, Pick};
use crate::engine::Progress;
use crate::error::{DexError, DexResult};
use crate::events::DexEvent;
use crate::orderbook::{ListId, OrderBook};
use crate::types::{OrderId, PairKey, Side};

/// Pair-level inputs of the executor
#[derive(Debug, Clone, Copy)]
pub struct MatchContext {
    pub pair: PairKey,
    pub tick_number: u64,
    pub precision: u128,
    pub surplus_policy: SurplusPolicy,
}

enum Next {
    Order(OrderId, u128),
    Skipped,
    Done,
    OutOfSteps,
}

fn next_order(
    book: &OrderBook,
    page: &mut PageMemory,
    side: Side,
    tick_number: u64,
    budget: &mut u64,
) -> DexResult<Next> {
    let walk = match side {
        Side::Buy => &mut page.buy,
        Side::Sell => &mut page.sell,
    };
    match pick(book, side, walk, tick_number, page.market_price)? {
        Pick::Exhausted => Ok(Next::Done),
        Pick::Expired(id, kind) => {
            if *budget == 0 {
                return Ok(Next::OutOfSteps);
            }
            *budget -= 1;
            walk.pass(id, kind);
            Ok(Next::Skipped)
        }
        Pick::Ready(id, price) => Ok(Next::Order(id, price)),
    }
}

/// Settle at most one match
pub fn step(
    book: &mut OrderBook,
    page: &mut PageMemory,
    ctx: &MatchContext,
    budget: &mut u64,
    effects: &mut Effects,
) -> DexResult<Progress> {
    let (buy_id, buy_price) = match next_order(book, page, Side::Buy, ctx.tick_number, budget)? {
        Next::Order(id, price) => (id, price),
        Next::Skipped => return Ok(Progress::Advanced),
        Next::Done => return Ok(Progress::Finished),
        Next::OutOfSteps => return Ok(Progress::OutOfSteps),
    };
    let (sell_id, sell_price) = match next_order(book, page, Side::Sell, ctx.tick_number, budget)? {
        Next::Order(id, price) => (id, price),
        Next::Skipped => return Ok(Progress::Advanced),
        Next::Done => return Ok(Progress::Finished),
        Next::OutOfSteps => return Ok(Progress::OutOfSteps),
    };

    let match_price = page.emergent_price;
    if match_price == 0 || buy_price < match_price || sell_price > match_price {
        return Ok(Progress::Finished);
    }
    if *budget == 0 {
        return Ok(Progress::OutOfSteps);
    }
    *budget -= 1;

    let buy = book.get(buy_id).cloned().ok_or(DexError::OrderNotFound(buy_id))?;
    let sell = book.get(sell_id).cloned().ok_or(DexError::OrderNotFound(sell_id))?;
    let s = settle(
        &buy,
        buy_price,
        &sell,
        sell_price,
        match_price,
        ctx.precision,
        ctx.surplus_policy,
    )?;

    if s.buyer.filled {
        let list = ListId::main(Side::Buy, buy.kind());
        book.remove_after(list, page.buy.prev(buy.kind()))
            .filter(|removed| removed.id == buy_id)
            .ok_or(DexError::OrderNotFound(buy_id))?;
    } else {
        book.consume(buy_id, s.buyer_consumed, s.buyer_released)?;
    }
    if s.seller.filled {
        let list = ListId::main(Side::Sell, sell.kind());
        book.remove_after(list, page.sell.prev(sell.kind()))
            .filter(|removed| removed.id == sell_id)
            .ok_or(DexError::OrderNotFound(sell_id))?;
    } else {
        book.consume(sell_id, s.seller_consumed, s.seller_released)?;
    }
    page.matches_executed += 1;

    debug!(
        "pair {} match #{}: buy {} / sell {} @ {}, amount {}",
        ctx.pair, page.matches_executed, buy_id, sell_id, match_price, s.seller.amount_sent
    );

    let base = ctx.pair.base;
    let secondary = ctx.pair.secondary;
    effects.pay(secondary, buy.owner, s.buyer.received);
    effects.pay(base, buy.owner, s.buyer.change);
    effects.pay(base, sell.owner, s.seller.received);
    effects.charge(base, s.buyer.commission);
    effects.charge(secondary, s.seller.commission);
    effects.charge(base, s.retained_surplus);
    effects.emit(DexEvent::BuyerMatch {
        pair: ctx.pair,
        fill: s.buyer,
    });
    effects.emit(DexEvent::SellerMatch {
        pair: ctx.pair,
        fill: s.seller,
    });

    Ok(Progress::Advanced)
}
