//! # Tick DEX
//!
//! Batch auction exchange where each token pair clears once per tick.
//!
//! ## Architecture
//!
//! - **Types**: Core data structures (Order, BuyerMatch, SellerMatch, TickReceipt)
//! - **OrderBook**: Price-ordered linked lists over slab storage
//! - **Engine**: Resumable tick stages (simulation, matching, pending merge, expiration)
//! - **Dex**: Exchange facade with custody, commissions and governance
//!
//! ## Design Principles
//!
//! 1. **Determinism**: All operations produce identical results for identical inputs
//! 2. **No Floating Point**: All math uses fixed-point arithmetic (10^18 scaling)
//! 3. **Bounded Calls**: Long operations advance by a caller-chosen number of steps
//! 4. **Atomicity**: A failing call leaves no state behind
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use tick_dex::config::ExchangeConfig;
//! use tick_dex::dex::{CallContext, Dex};
//! use tick_dex::external::{Governor, InMemoryLedger, NoPriceProvider};
//! use tick_dex::types::price::WAD;
//! use tick_dex::types::PairKey;
//!
//! let admin = 1;
//! let (buyer, seller) = (10, 20);
//! let pair = PairKey::new(100, 200);
//!
//! let config = ExchangeConfig { common_base_token: 100, ..ExchangeConfig::default() };
//! let mut ledger = InMemoryLedger::new();
//! ledger.mint(100, buyer, 100 * WAD);
//! ledger.mint(200, seller, 10 * WAD);
//! let mut dex = Dex::new(config, ledger, Governor::new([admin])).unwrap();
//!
//! dex.add_token_pair(CallContext::new(admin, 0), pair, Arc::new(NoPriceProvider), WAD, 10 * WAD)
//!     .unwrap();
//! dex.insert_buy_limit_order(CallContext::new(buyer, 1), pair, 100 * WAD, 10 * WAD, 5).unwrap();
//! dex.insert_sell_limit_order(CallContext::new(seller, 1), pair, 10 * WAD, 10 * WAD, 5).unwrap();
//!
//! let outcome = dex.match_orders(CallContext::new(admin, 12), pair, 10).unwrap();
//! assert_eq!(outcome.receipt.unwrap().matches_executed, 1);
//! assert_eq!(dex.ledger().balance_of(200, buyer), 10 * WAD);
//! assert_eq!(dex.ledger().balance_of(100, seller), 100 * WAD);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: Order, matches, TickReceipt, fixed-point helpers
pub mod types;

/// Order book: price-ordered lists with slab-based storage
pub mod orderbook;

/// Tick engine: simulation, matching, pending merge, expiration
pub mod engine;

/// Exchange facade
pub mod dex;

/// Commission rates and balances
pub mod commission;

/// Price providers, token ledger and authorization
pub mod external;

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::ExchangeConfig;
pub use dex::{CallContext, Dex};
pub use error::{DexError, DexResult, TransferError};
pub use events::DexEvent;
pub use types::{Order, OrderKind, PairKey, Side, TickReceipt};
