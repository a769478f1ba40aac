//! Tick engine for the exchange.
//!
//! ## Design Principles
//!
//! The engine is designed for:
//!
//! 1. **Determinism**: Same book and same calls always produce the same matches
//! 2. **Fixed-Point Math**: No floating-point operations
//! 3. **Bounded Calls**: Every call does at most a caller-chosen number of steps
//! 4. **Resumability**: Progress between calls lives in [`PageMemory`]
//!
//! ## Tick Stages
//!
//! - **Simulation** walks both sides and finds the emergent price
//! - **Matching** settles every compatible pair at that price
//! - **Pending merge** moves orders received during the tick into the book
//!
//! A stage hands over to the next one without spending steps. The tick
//! ends when the pending queue is empty.
//!
//! ## Example
//!
//! ```
//! use tick_dex::config::{SurplusPolicy, TickConfig};
//! use tick_dex::engine::{advance, begin_tick, Effects, TickParams, TokenPair};
//! use tick_dex::orderbook::ListId;
//! use tick_dex::types::price::WAD;
//! use tick_dex::types::{Order, OrderKind, PairKey, Side};
//!
//! let config = TickConfig::default();
//! let mut pair = TokenPair::new(PairKey::new(1, 2), WAD, WAD, WAD / 10, 0, &config);
//! let buy = Order::new_limit(1, 10, Side::Buy, 10 * WAD, 0, WAD, 5);
//! let sell = Order::new_limit(2, 20, Side::Sell, 10 * WAD, 0, WAD, 5);
//! pair.book.insert_sorted(ListId::main(Side::Buy, OrderKind::Limit), buy).unwrap();
//! pair.book.insert_sorted(ListId::main(Side::Sell, OrderKind::Limit), sell).unwrap();
//!
//! let mut effects = Effects::default();
//! let params = TickParams { block: 12, tick_config: &config, surplus_policy: SurplusPolicy::ToSeller };
//! begin_tick(&mut pair, 12, WAD, &mut effects).unwrap();
//! let outcome = advance(&mut pair, 10, &[], &params, &mut effects).unwrap();
//!
//! let receipt = outcome.receipt.unwrap();
//! assert_eq!(receipt.matches_executed, 1);
//! assert_eq!(receipt.closing_price, WAD);
//! assert!(pair.book.is_empty());
//! ```

pub mod walk;
pub mod page;
pub mod tick;
pub mod settlement;
pub mod simulation;
pub mod matcher;
pub mod pending;
pub mod expiration;
pub mod effects;
pub mod pair;

pub use effects::{Charge, Effects, Payout};
pub use matcher::MatchContext;
pub use page::PageMemory;
pub use pair::TokenPair;
pub use tick::{TickStage, TickState};

use tracing::info;

use crate::config::{SurplusPolicy, TickConfig};
use crate::error::DexResult;
use crate::events::DexEvent;
use crate::orderbook::Hint;
use crate::types::{Price, TickReceipt};

/// Outcome of a single stage step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// One unit of work was done
    Advanced,
    /// The budget ran out before the next unit of work
    OutOfSteps,
    /// The stage has nothing left to do
    Finished,
}

/// Exchange-wide inputs of a stepped call
#[derive(Debug, Clone, Copy)]
pub struct TickParams<'a> {
    /// Block of the call
    pub block: u64,
    pub tick_config: &'a TickConfig,
    pub surplus_policy: SurplusPolicy,
}

/// Result of [`advance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    pub steps_used: u64,

    /// Stage the pair is left in
    pub stage: TickStage,

    /// Set when the call finished the tick
    pub receipt: Option<TickReceipt>,
}

/// Start a tick and freeze the market price for it
pub fn begin_tick(
    pair: &mut TokenPair,
    block: u64,
    market_price: Price,
    effects: &mut Effects,
) -> DexResult<()> {
    pair.tick.begin(block)?;
    pair.page = PageMemory::starting(market_price, pair.book.main_len() as u64);

    info!(
        "pair {} tick {} started at block {} with {} orders",
        pair.key,
        pair.tick.number,
        block,
        pair.book.main_len()
    );
    effects.emit(DexEvent::TickStart {
        pair: pair.key,
        number: pair.tick.number,
    });
    Ok(())
}

/// Run the current tick for at most `steps` steps
///
/// `hints` are consumed one per order moved out of the pending queue.
pub fn advance(
    pair: &mut TokenPair,
    steps: u64,
    hints: &[Hint],
    params: &TickParams<'_>,
    effects: &mut Effects,
) -> DexResult<Advance> {
    let ctx = MatchContext {
        pair: pair.key,
        tick_number: pair.tick.number,
        precision: pair.price_precision,
        surplus_policy: params.surplus_policy,
    };
    let mut hints = hints.iter().copied();
    let mut budget = steps;

    let receipt = loop {
        let stage = pair.tick.stage;
        let progress = match stage {
            TickStage::ReceivingOrders => break None,
            TickStage::RunningSimulation => simulation::step(
                &pair.book,
                &mut pair.page,
                ctx.tick_number,
                ctx.precision,
                &mut budget,
            )?,
            TickStage::RunningMatching => {
                matcher::step(&mut pair.book, &mut pair.page, &ctx, &mut budget, effects)?
            }
            TickStage::MovingPendingOrders => {
                pending::step(&mut pair.book, &mut pair.page, &mut hints, &mut budget)?
            }
        };

        match (progress, stage) {
            (Progress::Advanced, _) => {}
            (Progress::OutOfSteps, _) => break None,
            (Progress::Finished, TickStage::RunningSimulation) => {
                pair.page.reset_walks();
                pair.tick.stage = TickStage::RunningMatching;
            }
            (Progress::Finished, TickStage::RunningMatching) => {
                pair.page.pending_anchor = None;
                pair.tick.stage = TickStage::MovingPendingOrders;
            }
            (Progress::Finished, _) => break Some(end_tick(pair, params, effects)?),
        }
    };

    Ok(Advance {
        steps_used: steps - budget,
        stage: pair.tick.stage,
        receipt,
    })
}

/// Close the tick: record the price, reschedule and wipe the page
fn end_tick(
    pair: &mut TokenPair,
    params: &TickParams<'_>,
    effects: &mut Effects,
) -> DexResult<TickReceipt> {
    let number = pair.tick.number;
    let matched = pair.page.matches_executed > 0;
    let closing_price = if matched { pair.page.emergent_price } else { 0 };
    if matched {
        pair.last_closing_price = closing_price;
        pair.update_ema(closing_price)?;
    }

    let elapsed = params.block.saturating_sub(pair.tick.last_tick_block);
    let blocks = params
        .tick_config
        .blocks_for_tick(elapsed, pair.page.orders_at_start);
    pair.tick.finish(params.block, blocks);

    let receipt = TickReceipt {
        base_token: pair.key.base,
        secondary_token: pair.key.secondary,
        tick_number: number,
        matches_executed: pair.page.matches_executed,
        closing_price,
        next_tick_block: pair.tick.next_tick_block,
        state_root: pair.book.state_root()?,
    };

    info!(
        "pair {} tick {} ended: {} matches at {}, next tick at block {}",
        pair.key, number, receipt.matches_executed, closing_price, receipt.next_tick_block
    );
    effects.emit(DexEvent::TickEnd {
        pair: pair.key,
        number,
        next_tick_block: pair.tick.next_tick_block,
        closing_price,
        blocks_for_tick: blocks,
    });
    pair.page.clear();
    Ok(receipt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DexError;
    use crate::orderbook::ListId;
    use crate::types::price::WAD;
    use crate::types::{Order, OrderKind, PairKey, Side};

    fn setup() -> (TokenPair, TickConfig) {
        let config = TickConfig::default();
        let pair = TokenPair::new(PairKey::new(1, 2), 5 * WAD, WAD, WAD / 2, 0, &config);
        (pair, config)
    }

    fn add(pair: &mut TokenPair, order: Order) {
        let list = ListId::main(order.side(), order.kind());
        pair.book.insert_sorted(list, order).unwrap();
    }

    fn params(config: &TickConfig, block: u64) -> TickParams<'_> {
        TickParams {
            block,
            tick_config: config,
            surplus_policy: SurplusPolicy::ToSeller,
        }
    }

    #[test]
    fn test_empty_tick_keeps_price_and_waits_max() {
        let (mut pair, config) = setup();
        let mut effects = Effects::default();
        let market_price = pair.last_closing_price;
        begin_tick(&mut pair, 12, market_price, &mut effects).unwrap();
        let outcome = advance(&mut pair, 1, &[], &params(&config, 12), &mut effects).unwrap();

        let receipt = outcome.receipt.unwrap();
        assert_eq!(outcome.steps_used, 0);
        assert_eq!(receipt.matches_executed, 0);
        assert_eq!(receipt.closing_price, 0);
        assert_eq!(pair.last_closing_price, 5 * WAD);
        assert_eq!(pair.tick.number, 2);
        assert_eq!(pair.tick.next_tick_block, 24);
        assert_eq!(pair.page, PageMemory::default());
        assert_eq!(effects.events.len(), 2);
    }

    #[test]
    fn test_tick_resumes_across_calls() {
        let (mut pair, config) = setup();
        add(&mut pair, Order::new_limit(1, 10, Side::Buy, 10 * WAD, 0, 2 * WAD, 5));
        add(&mut pair, Order::new_limit(2, 10, Side::Buy, 10 * WAD, 0, 2 * WAD, 5));
        add(&mut pair, Order::new_limit(3, 20, Side::Sell, 5 * WAD, 0, 2 * WAD, 5));
        add(&mut pair, Order::new_limit(4, 20, Side::Sell, 5 * WAD, 0, 2 * WAD, 5));
        let mut single = pair.clone();

        let mut effects = Effects::default();
        begin_tick(&mut pair, 12, WAD, &mut effects).unwrap();
        let first = advance(&mut pair, 2, &[], &params(&config, 12), &mut effects).unwrap();
        assert_eq!(first.stage, TickStage::RunningMatching);
        assert!(first.receipt.is_none());
        let second = advance(&mut pair, 2, &[], &params(&config, 12), &mut effects).unwrap();
        assert!(second.receipt.is_some());

        let mut single_effects = Effects::default();
        begin_tick(&mut single, 12, WAD, &mut single_effects).unwrap();
        let outcome = advance(&mut single, 4, &[], &params(&config, 12), &mut single_effects)
            .unwrap();

        assert_eq!(outcome.receipt, second.receipt);
        assert_eq!(effects, single_effects);
        assert_eq!(pair.last_closing_price, 2 * WAD);
        assert_eq!(pair.ema_price, 3 * WAD + WAD / 2);
    }

    #[test]
    fn test_begin_tick_rejects_early_and_running() {
        let (mut pair, _) = setup();
        let mut effects = Effects::default();
        assert_eq!(
            begin_tick(&mut pair, 3, WAD, &mut effects),
            Err(DexError::NextTickNotReached { current: 3, next: 12 })
        );
        begin_tick(&mut pair, 12, WAD, &mut effects).unwrap();
        assert_eq!(begin_tick(&mut pair, 13, WAD, &mut effects), Err(DexError::TickIsRunning));
    }

    #[test]
    fn test_pending_orders_join_the_book() {
        let (mut pair, config) = setup();
        let mut effects = Effects::default();
        begin_tick(&mut pair, 12, WAD, &mut effects).unwrap();
        let pending = Order::new_limit(7, 10, Side::Buy, WAD, 0, WAD, 5);
        pair.book
            .insert_sorted(ListId::pending(Side::Buy, OrderKind::Limit), pending)
            .unwrap();

        let outcome = advance(&mut pair, 5, &[], &params(&config, 20), &mut effects).unwrap();
        assert_eq!(outcome.steps_used, 1);
        assert_eq!(pair.book.pending_len(), 0);
        assert_eq!(pair.book.head_id(ListId::main(Side::Buy, OrderKind::Limit)), Some(7));
        // no orders at tick start
        assert_eq!(pair.tick.next_tick_block, 32);
    }
}
