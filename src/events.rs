//! Observable events emitted by the exchange.
//!
//! Events are collected in order and drained by the host with
//! [`Dex::take_events`](crate::dex::Dex::take_events).

use crate::error::TransferError;
use crate::types::{
    AccountId, Amount, BuyerMatch, OrderId, OrderKind, PairKey, Price, SellerMatch, Side, TokenId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DexEvent {
    TokenPairListed {
        pair: PairKey,
        initial_price: Price,
        price_precision: u128,
    },
    TokenPairEnabled {
        pair: PairKey,
    },
    TokenPairDisabled {
        pair: PairKey,
    },
    NewOrderInserted {
        pair: PairKey,
        order_id: OrderId,
        owner: AccountId,
        side: Side,
        kind: OrderKind,
        exchangeable_amount: Amount,
        reserved_commission: Amount,
        price_key: u128,
        expires_in_tick: u64,
    },
    NewOrderAddedToPendingQueue {
        pair: PairKey,
        order_id: OrderId,
        side: Side,
        kind: OrderKind,
    },
    /// The owner is refunded `returned_amount + returned_commission`
    OrderCancelled {
        pair: PairKey,
        order_id: OrderId,
        owner: AccountId,
        side: Side,
        /// Exchangeable amount given back
        returned_amount: Amount,
        /// Penalty kept from the reserved commission
        commission: Amount,
        /// Reserved commission given back
        returned_commission: Amount,
    },
    ExpiredOrderProcessed {
        pair: PairKey,
        order_id: OrderId,
        owner: AccountId,
        side: Side,
        returned_amount: Amount,
        commission: Amount,
        returned_commission: Amount,
    },
    BuyerMatch {
        pair: PairKey,
        fill: BuyerMatch,
    },
    SellerMatch {
        pair: PairKey,
        fill: SellerMatch,
    },
    TickStart {
        pair: PairKey,
        number: u64,
    },
    TickEnd {
        pair: PairKey,
        number: u64,
        next_tick_block: u64,
        /// Emergent price, zero when nothing matched; the pair's last
        /// closing price then keeps its previous value
        closing_price: Price,
        blocks_for_tick: u64,
    },
    /// A payout could not be delivered; the funds stay in custody
    TransferFailed {
        token: TokenId,
        to: AccountId,
        amount: Amount,
        reason: TransferError,
    },
    CommissionsWithdrawn {
        token: TokenId,
        beneficiary: AccountId,
        amount: Amount,
    },
    Paused,
    Unpaused,
}
