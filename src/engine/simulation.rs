//! Emergent price simulation.
//!
//! Walks the best buys against the best sells without touching the book,
//! consuming simulated amounts, until one side runs out or the best buy no
//! longer reaches the best sell. The emergent price is the average of the
//! last compatible pair of effective prices.
//!
//! Every simulated match and every skipped expired order costs one step.

use tracing::debug;

use crate::engine::page::PageMemory;
use crate::engine::settlement::Quote;
use crate::engine::walk::{pick, Pick, Walk};
use crate::engine::Progress;
use crate::error::{DexError, DexResult};
use crate::orderbook::OrderBook;
use crate::types::price::average_price;
use crate::types::{OrderId, Price, Side};

enum Engaged {
    Order(OrderId, Price),
    Skipped,
    Exhausted,
    OutOfSteps,
}

/// Pick up the side's current order, or the next one
fn engage(
    book: &OrderBook,
    side: Side,
    walk: &mut Walk,
    tick_number: u64,
    market_price: Price,
    budget: &mut u64,
) -> DexResult<Engaged> {
    if let Some(id) = walk.current {
        let order = book.get(id).ok_or(DexError::OrderNotFound(id))?;
        let price = order
            .effective_price(market_price)
            .ok_or(DexError::ArithmeticOverflow)?;
        return Ok(Engaged::Order(id, price));
    }

    match pick(book, side, walk, tick_number, market_price)? {
        Pick::Exhausted => Ok(Engaged::Exhausted),
        Pick::Expired(id, kind) => {
            if *budget == 0 {
                return Ok(Engaged::OutOfSteps);
            }
            *budget -= 1;
            walk.pass(id, kind);
            Ok(Engaged::Skipped)
        }
        Pick::Ready(id, price) => {
            let order = book.get(id).ok_or(DexError::OrderNotFound(id))?;
            walk.current = Some(id);
            walk.remaining = order.exchangeable_amount;
            Ok(Engaged::Order(id, price))
        }
    }
}

/// Advance the simulation by at most one step
pub fn step(
    book: &OrderBook,
    page: &mut PageMemory,
    tick_number: u64,
    precision: u128,
    budget: &mut u64,
) -> DexResult<Progress> {
    let market_price = page.market_price;

    let (buy_id, buy_price) =
        match engage(book, Side::Buy, &mut page.buy, tick_number, market_price, budget)? {
            Engaged::Order(id, price) => (id, price),
            Engaged::Skipped => return Ok(Progress::Advanced),
            Engaged::Exhausted => return Ok(Progress::Finished),
            Engaged::OutOfSteps => return Ok(Progress::OutOfSteps),
        };
    let (sell_id, sell_price) =
        match engage(book, Side::Sell, &mut page.sell, tick_number, market_price, budget)? {
            Engaged::Order(id, price) => (id, price),
            Engaged::Skipped => return Ok(Progress::Advanced),
            Engaged::Exhausted => return Ok(Progress::Finished),
            Engaged::OutOfSteps => return Ok(Progress::OutOfSteps),
        };

    if buy_price < sell_price || buy_price == 0 {
        return Ok(Progress::Finished);
    }
    if *budget == 0 {
        return Ok(Progress::OutOfSteps);
    }
    *budget -= 1;

    let quote = Quote::new(page.buy.remaining, buy_price, page.sell.remaining, precision)?;
    page.buy.remaining = page.buy.remaining.saturating_sub(quote.buyer_expected);
    page.sell.remaining -= quote.limiting;
    page.emergent_price = average_price(buy_price, sell_price);
    page.matches_amount += 1;

    page.last_buy_match_id = Some(buy_id);
    page.last_buy_match_amount = if quote.buyer_filled { 0 } else { page.buy.remaining };
    page.last_sell_match_id = Some(sell_id);
    page.last_sell_match_amount = page.sell.remaining;

    debug!(
        "simulated match #{}: buy {} @ {} / sell {} @ {}, amount {}",
        page.matches_amount, buy_id, buy_price, sell_id, sell_price, quote.limiting
    );

    if quote.buyer_filled {
        let kind = book.get(buy_id).map(|o| o.kind()).unwrap_or_default();
        page.buy.pass(buy_id, kind);
    }
    if quote.seller_filled {
        let kind = book.get(sell_id).map(|o| o.kind()).unwrap_or_default();
        page.sell.pass(sell_id, kind);
    }
    Ok(Progress::Advanced)
}

/// Run a whole simulation on a fresh page without mutating anything
///
/// Used to answer emergent price queries between ticks.
pub fn simulate(
    book: &OrderBook,
    tick_number: u64,
    market_price: Price,
    precision: u128,
) -> DexResult<PageMemory> {
    let mut page = PageMemory::starting(market_price, book.main_len() as u64);
    let mut budget = u64::MAX;
    while step(book, &mut page, tick_number, precision, &mut budget)? == Progress::Advanced {}
    Ok(page)
}
