//! Order types for the tick exchange.
//!
//! ## SSZ Serialization
//!
//! `Order` derives `SimpleSerialize` from ssz_rs so that the resting book can
//! be hashed into a deterministic state root at the end of every tick.
//! Enums are stored as raw `u8` fields for SSZ compatibility.
//!
//! ## Priority Key
//!
//! Limit and market orders live in separate lists and are ordered by
//! different keys:
//! - **Limit**: absolute price, scaled by the pair's price precision
//! - **Market**: multiplier applied to the reference price snapshot, scaled
//!   by [`RATE_PRECISION`]
//!
//! The effective price of both kinds is only compared during a tick, once the
//! reference price has been frozen.

use ssz_rs::prelude::*;

use crate::types::price::{mul_div, RATE_PRECISION};
use crate::types::{Amount, Price};

/// Order identifier (assigned by the exchange, starting at 1)
pub type OrderId = u64;

/// Account identifier
pub type AccountId = u64;

/// Token identifier
pub type TokenId = u64;

// ============================================================================
// Side enum
// ============================================================================

/// Order side: Buy or Sell
///
/// Represented as u8 for SSZ compatibility:
/// - Buy = 0
/// - Sell = 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy order - pays base token, receives secondary token
    #[default]
    Buy,
    /// Sell order - pays secondary token, receives base token
    Sell,
}

impl Side {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Side::Buy),
            1 => Some(Side::Sell),
            _ => None,
        }
    }

    /// Returns the opposite side
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn is_buy(self) -> bool {
        self == Side::Buy
    }

    /// True when key `a` is strictly more competitive than key `b` on this side.
    ///
    /// Buys prefer higher keys, sells prefer lower keys. Equal keys are never
    /// more competitive, which keeps FIFO order among equals.
    #[inline]
    pub fn outranks(self, a: u128, b: u128) -> bool {
        match self {
            Side::Buy => a > b,
            Side::Sell => a < b,
        }
    }
}

// ============================================================================
// OrderKind enum
// ============================================================================

/// Order kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderKind {
    /// Absolute price
    #[default]
    Limit,
    /// Multiplier of the reference price
    Market,
}

impl OrderKind {
    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            OrderKind::Limit => 0,
            OrderKind::Market => 1,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(OrderKind::Limit),
            1 => Some(OrderKind::Market),
            _ => None,
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderKind::Limit => write!(f, "limit"),
            OrderKind::Market => write!(f, "market"),
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// An order resting in (or waiting to enter) a pair's book.
///
/// ## Fields
///
/// `exchangeable_amount` and `reserved_commission` are wad amounts of the
/// deposit token: base for buys, secondary for sells. Both shrink as the
/// order is partially matched. Everything else is immutable.
///
/// ## SSZ Layout
///
/// Fixed-size container: 8+8+1+1+16+16+16+8 = 74 bytes.
///
/// ## Example
///
/// ```
/// use tick_dex::types::{Order, OrderKind, Side};
/// use tick_dex::types::price::to_fixed;
///
/// let order = Order::new_limit(
///     1,                          // id
///     100,                        // owner
///     Side::Buy,
///     to_fixed("9").unwrap(),     // exchangeable
///     to_fixed("1").unwrap(),     // reserved commission
///     to_fixed("10").unwrap(),    // price
///     11,                         // expires in tick
/// );
/// assert_eq!(order.kind(), OrderKind::Limit);
/// assert!(!order.is_expired(10));
/// assert!(order.is_expired(11));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct Order {
    /// Unique order identifier
    pub id: u64,

    /// Account that deposited the funds
    pub owner: u64,

    /// Order side as u8 (0=Buy, 1=Sell)
    pub side_raw: u8,

    /// Order kind as u8 (0=Limit, 1=Market)
    pub kind_raw: u8,

    /// Remaining amount available for matching
    pub exchangeable_amount: u128,

    /// Commission still reserved for the remaining amount
    pub reserved_commission: u128,

    /// Price (limit) or multiplier (market)
    pub price_key: u128,

    /// First tick number at which the order is considered expired
    pub expires_in_tick: u64,
}

impl Order {
    /// Create a limit order
    pub fn new_limit(
        id: OrderId,
        owner: AccountId,
        side: Side,
        exchangeable_amount: Amount,
        reserved_commission: Amount,
        price: Price,
        expires_in_tick: u64,
    ) -> Self {
        Self {
            id,
            owner,
            side_raw: side.to_u8(),
            kind_raw: OrderKind::Limit.to_u8(),
            exchangeable_amount,
            reserved_commission,
            price_key: price,
            expires_in_tick,
        }
    }

    /// Create a market order priced as `multiply_factor` times the reference price
    pub fn new_market(
        id: OrderId,
        owner: AccountId,
        side: Side,
        exchangeable_amount: Amount,
        reserved_commission: Amount,
        multiply_factor: u128,
        expires_in_tick: u64,
    ) -> Self {
        Self {
            kind_raw: OrderKind::Market.to_u8(),
            ..Self::new_limit(
                id,
                owner,
                side,
                exchangeable_amount,
                reserved_commission,
                multiply_factor,
                expires_in_tick,
            )
        }
    }

    /// Get the order side
    pub fn side(&self) -> Side {
        Side::from_u8(self.side_raw).unwrap_or(Side::Buy)
    }

    /// Get the order kind
    pub fn kind(&self) -> OrderKind {
        OrderKind::from_u8(self.kind_raw).unwrap_or(OrderKind::Limit)
    }

    pub fn is_expired(&self, tick_number: u64) -> bool {
        self.expires_in_tick <= tick_number
    }

    /// Total funds still held for this order (exchangeable + reserved)
    pub fn locked_amount(&self) -> Option<Amount> {
        self.exchangeable_amount.checked_add(self.reserved_commission)
    }

    /// Effective price of the order given the frozen reference price
    ///
    /// # Returns
    ///
    /// * `Some(Price)` - The limit price, or `multiplier * market_price`
    /// * `None` - On arithmetic overflow
    pub fn effective_price(&self, market_price: Price) -> Option<Price> {
        match self.kind() {
            OrderKind::Limit => Some(self.price_key),
            OrderKind::Market => mul_div(self.price_key, market_price, RATE_PRECISION),
        }
    }

    /// Remove a matched portion from the order
    ///
    /// Both parts saturate at zero.
    pub fn consume(&mut self, amount: Amount, commission: Amount) {
        self.exchangeable_amount = self.exchangeable_amount.saturating_sub(amount);
        self.reserved_commission = self.reserved_commission.saturating_sub(commission);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::price::{to_fixed, WAD};

    #[test]
    fn test_side_conversion() {
        assert_eq!(Side::Buy.to_u8(), 0);
        assert_eq!(Side::Sell.to_u8(), 1);
        assert_eq!(Side::from_u8(0), Some(Side::Buy));
        assert_eq!(Side::from_u8(1), Some(Side::Sell));
        assert_eq!(Side::from_u8(2), None);
        assert_eq!(Side::Buy.opposite(), Side::Sell);
    }

    #[test]
    fn test_side_outranks() {
        assert!(Side::Buy.outranks(11, 10));
        assert!(!Side::Buy.outranks(10, 10));
        assert!(Side::Sell.outranks(9, 10));
        assert!(!Side::Sell.outranks(10, 10));
    }

    #[test]
    fn test_kind_conversion() {
        assert_eq!(OrderKind::Market.to_u8(), 1);
        assert_eq!(OrderKind::from_u8(0), Some(OrderKind::Limit));
        assert_eq!(OrderKind::from_u8(7), None);
        assert_eq!(OrderKind::Market.to_string(), "market");
    }

    #[test]
    fn test_effective_price() {
        let limit = Order::new_limit(1, 1, Side::Buy, WAD, 0, 10 * WAD, 5);
        assert_eq!(limit.effective_price(3 * WAD), Some(10 * WAD));

        let factor = to_fixed("1.5").unwrap();
        let market = Order::new_market(2, 1, Side::Sell, WAD, 0, factor, 5);
        assert_eq!(market.kind(), OrderKind::Market);
        assert_eq!(market.effective_price(4 * WAD), Some(6 * WAD));
    }

    #[test]
    fn test_expiration_boundary() {
        let order = Order::new_limit(1, 1, Side::Sell, WAD, 0, WAD, 4);
        assert!(!order.is_expired(3));
        assert!(order.is_expired(4));
        assert!(order.is_expired(5));
    }

    #[test]
    fn test_consume() {
        let mut order = Order::new_limit(1, 1, Side::Buy, 9 * WAD, WAD, WAD, 4);
        order.consume(3 * WAD, WAD / 3);
        assert_eq!(order.exchangeable_amount, 6 * WAD);
        assert_eq!(order.reserved_commission, WAD - WAD / 3);
        order.consume(10 * WAD, 10 * WAD);
        assert_eq!(order.locked_amount(), Some(0));
    }

    #[test]
    fn test_order_ssz_roundtrip() {
        let order = Order::new_market(7, 100, Side::Sell, 5 * WAD, WAD, WAD, 12);
        let serialized = ssz_rs::serialize(&order).expect("Failed to serialize");
        let deserialized: Order = ssz_rs::deserialize(&serialized).expect("Failed to deserialize");
        assert_eq!(order, deserialized);
        assert_eq!(serialized.len(), 74);
    }
}
