//! Read-only views of the exchange.

use crate::config::ExchangeConfig;
use crate::engine::expiration;
use crate::engine::simulation::simulate;
use crate::engine::TickStage;
use crate::error::DexResult;
use crate::events::DexEvent;
use crate::external::TokenLedger;
use crate::orderbook::{Hint, ListId};
use crate::types::price::secondary_to_base;
use crate::types::{AccountId, Amount, Order, OrderId, OrderKind, PairKey, Price, Side, TokenId};

use super::Dex;

/// Snapshot of a pair's schedule and prices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStatus {
    pub pair: PairKey,
    pub stage: TickStage,
    pub tick_number: u64,
    pub next_tick_block: u64,
    pub last_tick_block: u64,
    pub last_closing_price: Price,
    pub ema_price: Price,
    pub smoothing_factor: u128,
    pub price_precision: u128,
    pub disabled: bool,

    /// Emergent price of the running tick, zero between ticks
    pub emergent_price: Price,
}

/// Outcome of a dry-run simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmergentPrice {
    pub price: Price,
    pub matches: u64,
    pub last_buy_match_id: Option<OrderId>,
    pub last_buy_match_amount: Amount,
    pub last_sell_match_id: Option<OrderId>,
    pub last_sell_match_amount: Amount,
}

impl<L: TokenLedger> Dex<L> {
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Listed pairs in listing order
    pub fn token_pairs(&self) -> &[PairKey] {
        &self.pair_order
    }

    pub fn token_pair_status(&self, key: PairKey) -> DexResult<PairStatus> {
        let pair = self.pair(key)?;
        Ok(PairStatus {
            pair: key,
            stage: pair.tick.stage,
            tick_number: pair.tick.number,
            next_tick_block: pair.tick.next_tick_block,
            last_tick_block: pair.tick.last_tick_block,
            last_closing_price: pair.last_closing_price,
            ema_price: pair.ema_price,
            smoothing_factor: pair.smoothing_factor,
            price_precision: pair.price_precision,
            disabled: pair.disabled,
            emergent_price: pair.page.emergent_price,
        })
    }

    /// Price the next tick would clear at if it ran now
    ///
    /// During a tick the market price frozen at its start is used.
    pub fn get_emergent_price(&self, key: PairKey) -> DexResult<EmergentPrice> {
        let pair = self.pair(key)?;
        let market_price = if pair.tick.is_running() {
            pair.page.market_price
        } else {
            self.market_price(pair)
        };
        let page = simulate(&pair.book, pair.tick.number, market_price, pair.price_precision)?;
        Ok(EmergentPrice {
            price: page.emergent_price,
            matches: page.matches_amount,
            last_buy_match_id: page.last_buy_match_id,
            last_buy_match_amount: page.last_buy_match_amount,
            last_sell_match_id: page.last_sell_match_id,
            last_sell_match_amount: page.last_sell_match_amount,
        })
    }

    pub fn are_orders_to_expire(&self, key: PairKey, side: Side, kind: OrderKind) -> DexResult<bool> {
        let pair = self.pair(key)?;
        Ok(expiration::has_expired(&pair.book, ListId::main(side, kind), pair.tick.number))
    }

    /// Resting orders of one side and kind
    pub fn orders_length(&self, key: PairKey, side: Side, kind: OrderKind) -> DexResult<usize> {
        Ok(self.pair(key)?.book.len(ListId::main(side, kind)))
    }

    /// Orders waiting for the running tick to finish
    pub fn pending_length(&self, key: PairKey) -> DexResult<usize> {
        Ok(self.pair(key)?.book.pending_len())
    }

    pub fn order(&self, key: PairKey, id: OrderId) -> DexResult<Option<&Order>> {
        Ok(self.pair(key)?.book.get(id))
    }

    /// Resting orders of one side and kind, best first
    pub fn orders(&self, key: PairKey, side: Side, kind: OrderKind) -> DexResult<Vec<Order>> {
        let book = &self.pair(key)?.book;
        Ok(book.iter(ListId::main(side, kind)).cloned().collect())
    }

    /// Hint that places a new order with `price_key` where the book expects it
    ///
    /// Targets the pending queue while the pair's tick runs.
    pub fn insertion_hint(
        &self,
        key: PairKey,
        side: Side,
        kind: OrderKind,
        price_key: u128,
    ) -> DexResult<Hint> {
        let pair = self.pair(key)?;
        let list = if pair.tick.is_running() {
            ListId::pending(side, kind)
        } else {
            ListId::main(side, kind)
        };
        Ok(pair.book.hint_for(list, price_key))
    }

    /// Value of `amount` of the pair's secondary token in the common base token
    ///
    /// Uses last closing prices. `None` when the pair is not listed or no
    /// conversion path exists.
    pub fn convert_to_common_base(&self, key: PairKey, amount: Amount) -> Option<Amount> {
        let pair = self.pairs.get(&key)?;
        let in_base = secondary_to_base(amount, pair.last_closing_price, pair.price_precision)?;
        self.base_to_common(key.base, in_base)
    }

    /// Value of `amount` of a pair's base token in the common base token
    pub(crate) fn base_to_common(&self, base: TokenId, amount: Amount) -> Option<Amount> {
        let common = self.config.common_base_token;
        if base == common {
            return Some(amount);
        }
        let pair = self.pairs.get(&PairKey::new(common, base))?;
        secondary_to_base(amount, pair.last_closing_price, pair.price_precision)
    }

    pub fn commission_balance(&self, token: TokenId) -> Amount {
        self.commissions.exchange_commissions(token)
    }

    pub fn beneficiary(&self) -> AccountId {
        self.commissions.beneficiary()
    }

    pub fn events(&self) -> &[DexEvent] {
        &self.events
    }

    /// Drain the events recorded so far
    pub fn take_events(&mut self) -> Vec<DexEvent> {
        std::mem::take(&mut self.events)
    }
}
