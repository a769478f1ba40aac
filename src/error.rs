//! Error types for the tick exchange
//!
//! One variant per distinct rejection reason. Callers match on variants,
//! never on message text.

use thiserror::Error;

use crate::types::{AccountId, Amount, OrderId, OrderKind, TokenId};

/// Failure reported by a token ledger
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance of token {token} for account {account}: required {required}, available {available}")]
    InsufficientBalance {
        token: TokenId,
        account: AccountId,
        required: Amount,
        available: Amount,
    },

    #[error("account {account} cannot move token {token}")]
    Blocked { token: TokenId, account: AccountId },

    #[error("balance overflow for token {token}")]
    Overflow { token: TokenId },
}

/// Top-level exchange error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DexError {
    // ------------------------------------------------------------------
    // Input validation
    // ------------------------------------------------------------------
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("amount too low: {amount} is below the minimum of {minimum}")]
    AmountTooLow { amount: Amount, minimum: Amount },

    #[error("amount too high: {0} cannot be converted at the order price")]
    AmountTooHigh(Amount),

    #[error("price must be greater than zero")]
    ZeroPrice,

    #[error("multiply factor is zero")]
    MultiplyFactorZero,

    #[error("multiply factor {0} is below the minimum")]
    LowMultiplyFactor(u128),

    #[error("multiply factor {0} is above the maximum")]
    HighMultiplyFactor(u128),

    #[error("lifespan too high: {lifespan} exceeds {max}")]
    LifespanTooHigh { lifespan: u64, max: u64 },

    #[error("steps must be greater than zero")]
    ZeroSteps,

    // ------------------------------------------------------------------
    // Token pairs
    // ------------------------------------------------------------------
    #[error("token pair {base}/{secondary} does not exist")]
    PairNotFound { base: TokenId, secondary: TokenId },

    #[error("token pair {base}/{secondary} already exists")]
    PairAlreadyExists { base: TokenId, secondary: TokenId },

    #[error("inverse pair {secondary}/{base} already exists")]
    InversePairAlreadyExists { base: TokenId, secondary: TokenId },

    #[error("base token equals secondary token")]
    BaseEqualsSecondary,

    #[error("invalid pair: base token {0} cannot be converted to the common base token")]
    InvalidPair(TokenId),

    #[error("token pair {base}/{secondary} is disabled")]
    PairDisabled { base: TokenId, secondary: TokenId },

    #[error("token pair {base}/{secondary} is already {state}")]
    PairStateUnchanged {
        base: TokenId,
        secondary: TokenId,
        state: &'static str,
    },

    #[error("initial price must be greater than zero")]
    ZeroInitialPrice,

    #[error("price precision must be greater than zero")]
    ZeroPricePrecision,

    // ------------------------------------------------------------------
    // Hints and ordering
    // ------------------------------------------------------------------
    #[error("hint predecessor missing: order {0} is not in the target list")]
    HintPredecessorMissing(OrderId),

    #[error("hint is not a {expected} order: {order_id}")]
    HintKindMismatch { order_id: OrderId, expected: OrderKind },

    #[error("order should go before hinted predecessor {0}")]
    ShouldGoBefore(OrderId),

    #[error("order should go after hinted successor {0}")]
    ShouldGoAfter(OrderId),

    #[error("priority key does not belong at the list head")]
    NotBelongingToHead,

    #[error("previous order {0} not found before the target order")]
    PreviousOrderNotFound(OrderId),

    #[error("order {0} already exists")]
    DuplicateOrder(OrderId),

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    #[error("account {caller} is not the owner of order {order_id}")]
    NotOrderOwner { order_id: OrderId, caller: AccountId },

    #[error("the order to expire is not a {expected} order")]
    OrderKindMismatch { expected: OrderKind },

    #[error("no expired order found")]
    NoExpiredOrderFound,

    // ------------------------------------------------------------------
    // State machine
    // ------------------------------------------------------------------
    #[error("tick is running")]
    TickIsRunning,

    #[error("next tick not reached: current block {current}, next tick block {next}")]
    NextTickNotReached { current: u64, next: u64 },

    #[error("exchange is paused")]
    Paused,

    #[error("exchange is not paused")]
    NotPaused,

    // ------------------------------------------------------------------
    // Governance and configuration
    // ------------------------------------------------------------------
    #[error("account {0} is not authorized")]
    Unauthorized(AccountId),

    #[error("expected orders for tick too low: {0} (minimum 2)")]
    ExpectedOrdersTooLow(u64),

    #[error("min blocks for tick ({min}) should be lower than max ({max})")]
    InvalidBlockBounds { min: u64, max: u64 },

    #[error("{name} should be in relation to 1: got {value}")]
    RateAboveOne { name: &'static str, value: u128 },

    #[error("min multiply factor ({min}) should be lower than max ({max})")]
    InvalidMultiplyFactorBounds { min: u128, max: u128 },

    #[error("configuration error: {0}")]
    Config(String),

    // ------------------------------------------------------------------
    // External
    // ------------------------------------------------------------------
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// Shorthand for results of exchange operations
pub type DexResult<T> = Result<T, DexError>;

/// Map a `None` from fixed-point helpers to [`DexError::ArithmeticOverflow`]
pub(crate) trait OrOverflow<T> {
    fn or_overflow(self) -> DexResult<T>;
}

impl<T> OrOverflow<T> for Option<T> {
    #[inline]
    fn or_overflow(self) -> DexResult<T> {
        self.ok_or(DexError::ArithmeticOverflow)
    }
}
