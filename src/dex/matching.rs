//! Tick progression.

use tracing::debug;

use crate::engine::{self, Advance, TickParams, TokenPair};
use crate::error::{DexError, DexResult};
use crate::external::TokenLedger;
use crate::orderbook::Hint;
use crate::types::{PairKey, Price};

use super::{CallContext, Dex};

impl<L: TokenLedger> Dex<L> {
    /// Run the pair's tick for at most `steps` steps, starting it if needed
    ///
    /// Starting a tick requires the pair's next tick block to be reached.
    /// Anyone may call this; the caller pays for the steps.
    pub fn match_orders(&mut self, ctx: CallContext, key: PairKey, steps: u64) -> DexResult<Advance> {
        self.match_orders_with_hints(ctx, key, steps, &[])
    }

    /// Like [`match_orders`](Self::match_orders), with one insertion hint per
    /// pending order moved into the book
    pub fn match_orders_with_hints(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        steps: u64,
        hints: &[Hint],
    ) -> DexResult<Advance> {
        self.ensure_not_paused()?;
        if steps == 0 {
            return Err(DexError::ZeroSteps);
        }

        let pair = self.pair(key)?;
        let market_price = (!pair.tick.is_running()).then(|| self.market_price(pair));
        let tick_config = self.config.tick;
        let surplus_policy = self.config.surplus_policy;

        let outcome = self.transact(key, |pair, _, effects| {
            if let Some(market_price) = market_price {
                engine::begin_tick(pair, ctx.block, market_price, effects)?;
            }
            let params = TickParams {
                block: ctx.block,
                tick_config: &tick_config,
                surplus_policy,
            };
            engine::advance(pair, steps, hints, &params, effects)
        })?;
        debug!(
            "pair {}: used {} of {} steps, stage {:?}",
            key, outcome.steps_used, steps, outcome.stage
        );

        Ok(outcome)
    }

    /// Reference price for a tick starting now
    ///
    /// The provider's reading when it is valid and non-zero, otherwise the
    /// pair's last closing price.
    pub(crate) fn market_price(&self, pair: &TokenPair) -> Price {
        self.providers
            .get(&pair.key)
            .filter(|provider| provider.is_valid())
            .map(|provider| provider.get_price())
            .filter(|&price| price > 0)
            .unwrap_or(pair.last_closing_price)
    }
}
