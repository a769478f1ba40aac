//! Per-pair state.

use crate::config::TickConfig;
use crate::engine::page::PageMemory;
use crate::engine::tick::TickState;
use crate::error::{DexResult, OrOverflow};
use crate::orderbook::OrderBook;
use crate::types::price::apply_rate;
use crate::types::{PairKey, Price};

/// A listed token pair: its book, schedule and price history
///
/// Everything a tick touches lives here. A stepped call that fails is undone
/// through the book's journal and a [`Checkpoint`] of the remaining fields.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub key: PairKey,
    pub book: OrderBook,
    pub tick: TickState,
    pub page: PageMemory,

    /// Emergent price of the last tick that matched anything
    pub last_closing_price: Price,

    /// Exponential moving average of closing prices
    pub ema_price: Price,

    /// EMA weight of the newest closing price, scaled by `RATE_PRECISION`
    pub smoothing_factor: u128,

    pub price_precision: u128,
    pub disabled: bool,
}

/// Fields of a [`TokenPair`] outside its book that a tick may change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    tick: TickState,
    page: PageMemory,
    last_closing_price: Price,
    ema_price: Price,
}

impl TokenPair {
    pub fn new(
        key: PairKey,
        initial_price: Price,
        price_precision: u128,
        smoothing_factor: u128,
        block: u64,
        tick_config: &TickConfig,
    ) -> Self {
        Self {
            key,
            book: OrderBook::new(),
            tick: TickState::new(block, tick_config),
            page: PageMemory::default(),
            last_closing_price: initial_price,
            ema_price: initial_price,
            smoothing_factor,
            price_precision,
            disabled: false,
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            tick: self.tick,
            page: self.page.clone(),
            last_closing_price: self.last_closing_price,
            ema_price: self.ema_price,
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.tick = checkpoint.tick;
        self.page = checkpoint.page;
        self.last_closing_price = checkpoint.last_closing_price;
        self.ema_price = checkpoint.ema_price;
    }

    /// Fold a closing price into the EMA: `ema += smoothing * (price - ema)`
    pub fn update_ema(&mut self, price: Price) -> DexResult<()> {
        self.ema_price = if price >= self.ema_price {
            let step = apply_rate(price - self.ema_price, self.smoothing_factor).or_overflow()?;
            self.ema_price + step
        } else {
            let step = apply_rate(self.ema_price - price, self.smoothing_factor).or_overflow()?;
            self.ema_price - step
        };
        Ok(())
    }
}
