//! Page memory: state carried between the calls of one tick.
//!
//! A tick may need many calls to finish. Everything those calls share lives
//! here and is wiped when the tick ends.

use crate::engine::walk::Walk;
use crate::types::{Amount, OrderId, Price};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMemory {
    /// Clearing price found by the simulation
    pub emergent_price: Price,

    /// Reference price frozen at tick start; prices market orders
    pub market_price: Price,

    /// Last buy order the simulation matched
    pub last_buy_match_id: Option<OrderId>,

    /// Amount of that buy order left unfilled by the simulation
    pub last_buy_match_amount: Amount,

    pub last_sell_match_id: Option<OrderId>,
    pub last_sell_match_amount: Amount,

    /// Matches found by the simulation
    pub matches_amount: u64,

    /// Matches settled by the executor
    pub matches_executed: u64,

    /// Main-book order count when the tick started
    pub orders_at_start: u64,

    pub buy: Walk,
    pub sell: Walk,

    /// Last order moved out of the pending queue
    pub pending_anchor: Option<OrderId>,
}

impl PageMemory {
    /// Fresh page for a tick starting at `market_price`
    pub fn starting(market_price: Price, orders_at_start: u64) -> Self {
        Self {
            market_price,
            orders_at_start,
            ..Self::default()
        }
    }

    /// Restart both walks from the heads of the book
    pub fn reset_walks(&mut self) {
        self.buy = Walk::default();
        self.sell = Walk::default();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
