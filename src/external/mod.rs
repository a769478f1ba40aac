//! Collaborators the exchange consumes but does not own.
//!
//! - [`PriceProvider`]: reference price for market orders, one per pair
//! - [`TokenLedger`]: token custody and transfers
//! - [`Authorizer`]: capability check for governed operations
//!
//! Each trait ships with an in-memory implementation used by the demo
//! binary and the tests.

pub mod price;
pub mod ledger;
pub mod governance;

pub use governance::{Authorizer, Governor};
pub use ledger::{InMemoryLedger, TokenLedger};
pub use price::{ManualPriceProvider, NoPriceProvider, PriceProvider};
