//! The exchange facade.
//!
//! [`Dex`] owns every listed pair, the commission balances and the token
//! ledger. Each public operation takes a [`CallContext`] naming the caller
//! and the current block.
//!
//! Operations are atomic. Stepped work runs on the stored pair with its
//! book journal open; a failing call is rolled back, a successful one
//! commits and only then pays accounts. A payout the ledger refuses is
//! reported as [`DexEvent::TransferFailed`] and the funds stay in custody.
//!
//! The implementation is split by concern:
//!
//! - `orders`: insertion, cancellation and expiration
//! - `matching`: tick progression
//! - `governance`: listing, pair settings and exchange-wide settings
//! - `queries`: read-only views

mod orders;
mod matching;
mod governance;
mod queries;

pub use orders::OrderRequest;
pub use queries::{EmergentPrice, PairStatus};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::commission::CommissionManager;
use crate::config::ExchangeConfig;
use crate::engine::{Effects, TokenPair};
use crate::error::{DexError, DexResult};
use crate::events::DexEvent;
use crate::external::{Authorizer, PriceProvider, TokenLedger};
use crate::types::{AccountId, OrderId, PairKey};

/// Caller and block of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: AccountId,
    pub block: u64,
}

impl CallContext {
    pub const fn new(sender: AccountId, block: u64) -> Self {
        Self { sender, block }
    }
}

pub struct Dex<L: TokenLedger> {
    config: ExchangeConfig,
    commissions: CommissionManager,
    pairs: HashMap<PairKey, TokenPair>,

    /// Pairs in listing order
    pair_order: Vec<PairKey>,

    providers: HashMap<PairKey, Arc<dyn PriceProvider>>,
    ledger: L,
    authorizer: Box<dyn Authorizer>,
    next_order_id: OrderId,
    paused: bool,
    events: Vec<DexEvent>,
}

impl<L: TokenLedger> Dex<L> {
    /// Create an exchange from a validated configuration
    pub fn new(
        config: ExchangeConfig,
        ledger: L,
        authorizer: impl Authorizer + 'static,
    ) -> DexResult<Self> {
        config.validate()?;
        let commissions = CommissionManager::new(config.beneficiary, config.commission)?;
        Ok(Self {
            config,
            commissions,
            pairs: HashMap::new(),
            pair_order: Vec::new(),
            providers: HashMap::new(),
            ledger,
            authorizer: Box::new(authorizer),
            next_order_id: 1,
            paused: false,
            events: Vec::new(),
        })
    }

    fn pair(&self, key: PairKey) -> DexResult<&TokenPair> {
        self.pairs.get(&key).ok_or(DexError::PairNotFound {
            base: key.base,
            secondary: key.secondary,
        })
    }

    fn pair_mut(&mut self, key: PairKey) -> DexResult<&mut TokenPair> {
        self.pairs.get_mut(&key).ok_or(DexError::PairNotFound {
            base: key.base,
            secondary: key.secondary,
        })
    }

    fn ensure_not_paused(&self) -> DexResult<()> {
        if self.paused {
            return Err(DexError::Paused);
        }
        Ok(())
    }

    fn ensure_authorized(&self, caller: AccountId) -> DexResult<()> {
        if !self.authorizer.is_authorized(caller) {
            return Err(DexError::Unauthorized(caller));
        }
        Ok(())
    }

    /// Rejects exchange-wide changes while any pair is mid-tick
    fn ensure_no_tick_running(&self) -> DexResult<()> {
        if self.pairs.values().any(|pair| pair.tick.is_running()) {
            return Err(DexError::TickIsRunning);
        }
        Ok(())
    }

    /// Run `work` on a pair, keeping its changes only if it succeeds
    ///
    /// The book journal and a checkpoint of the pair undo a failed call.
    /// Commission charges go to a copy of the manager that replaces the
    /// stored one on success, then the effects are delivered.
    fn transact<T>(
        &mut self,
        key: PairKey,
        work: impl FnOnce(&mut TokenPair, &mut CommissionManager, &mut Effects) -> DexResult<T>,
    ) -> DexResult<T> {
        let mut commissions = self.commissions.clone();
        let mut effects = Effects::default();
        let pair = self.pairs.get_mut(&key).ok_or(DexError::PairNotFound {
            base: key.base,
            secondary: key.secondary,
        })?;

        let saved = pair.checkpoint();
        pair.book.begin_journal();
        let result = work(&mut *pair, &mut commissions, &mut effects).and_then(|value| {
            for charge in &effects.charges {
                commissions.charge_commission(charge.token, charge.amount)?;
            }
            Ok(value)
        });

        match result {
            Ok(value) => {
                pair.book.commit_journal();
                self.commissions = commissions;
                self.deliver(effects);
                Ok(value)
            }
            Err(err) => {
                pair.book.rollback_journal();
                pair.restore(saved);
                Err(err)
            }
        }
    }

    /// Pay out of custody and record the events of a committed call
    fn deliver(&mut self, effects: Effects) {
        self.events.extend(effects.events);
        for payout in effects.payouts {
            if let Err(reason) = self.ledger.transfer(payout.token, payout.to, payout.amount) {
                warn!(
                    "payout of {} token {} to {} failed: {}",
                    payout.amount, payout.token, payout.to, reason
                );
                self.events.push(DexEvent::TransferFailed {
                    token: payout.token,
                    to: payout.to,
                    amount: payout.amount,
                    reason,
                });
            }
        }
    }
}

impl<L: TokenLedger> std::fmt::Debug for Dex<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dex")
            .field("pairs", &self.pair_order)
            .field("next_order_id", &self.next_order_id)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}
