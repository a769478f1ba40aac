//! Core data types for the tick exchange
//!
//! Records that take part in state roots implement SSZ serialization.
//! All numeric values use fixed-point representation (see [`price`]).
//!
//! ## Types
//!
//! - [`Order`]: A limit or market order
//! - [`Side`]: Buy or Sell
//! - [`OrderKind`]: Limit or Market
//! - [`BuyerMatch`] / [`SellerMatch`]: Settlement of one match, per leg
//! - [`TickReceipt`]: Summary of a finished tick

mod order;
mod matches;
mod receipt;
pub mod price;

/// Wad-scaled token amount
pub type Amount = u128;

/// Price scaled by the pair's price precision
pub type Price = u128;

pub use order::{AccountId, Order, OrderId, OrderKind, Side, TokenId};
pub use matches::{BuyerMatch, SellerMatch};
pub use receipt::TickReceipt;

/// Ordered (base, secondary) token pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    pub base: TokenId,
    pub secondary: TokenId,
}

impl PairKey {
    pub const fn new(base: TokenId, secondary: TokenId) -> Self {
        Self { base, secondary }
    }

    /// The same tokens with roles swapped
    pub const fn inverse(self) -> Self {
        Self::new(self.secondary, self.base)
    }

    /// Token an order of `side` deposits
    pub fn deposit_token(self, side: Side) -> TokenId {
        match side {
            Side::Buy => self.base,
            Side::Sell => self.secondary,
        }
    }
}

impl std::fmt::Display for PairKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.secondary)
    }
}
