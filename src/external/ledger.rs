//! Token custody.
//!
//! The exchange pulls an order's deposit into custody at insertion and
//! pays out of custody when orders match, expire or are cancelled.

use std::collections::{HashMap, HashSet};

use crate::error::TransferError;
use crate::types::{AccountId, Amount, TokenId};

/// Token transfers between accounts and the exchange's custody
pub trait TokenLedger {
    /// Move `amount` of `token` from `owner` into custody
    fn transfer_from(
        &mut self,
        token: TokenId,
        owner: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Move `amount` of `token` out of custody to `to`
    fn transfer(&mut self, token: TokenId, to: AccountId, amount: Amount)
        -> Result<(), TransferError>;
}

/// Ledger kept in memory
///
/// Accounts can be blocked per token to make transfers to or from them
/// fail, the way a token that refuses a recipient would.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryLedger {
    balances: HashMap<(TokenId, AccountId), Amount>,
    custody: HashMap<TokenId, Amount>,
    blocked: HashSet<(TokenId, AccountId)>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `account` out of thin air
    pub fn mint(&mut self, token: TokenId, account: AccountId, amount: Amount) {
        let balance = self.balances.entry((token, account)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, token: TokenId, account: AccountId) -> Amount {
        self.balances.get(&(token, account)).copied().unwrap_or(0)
    }

    /// Amount of `token` held by the exchange
    pub fn custody_of(&self, token: TokenId) -> Amount {
        self.custody.get(&token).copied().unwrap_or(0)
    }

    pub fn block(&mut self, token: TokenId, account: AccountId) {
        self.blocked.insert((token, account));
    }

    pub fn unblock(&mut self, token: TokenId, account: AccountId) {
        self.blocked.remove(&(token, account));
    }

    fn check_blocked(&self, token: TokenId, account: AccountId) -> Result<(), TransferError> {
        if self.blocked.contains(&(token, account)) {
            return Err(TransferError::Blocked { token, account });
        }
        Ok(())
    }
}

impl TokenLedger for InMemoryLedger {
    fn transfer_from(
        &mut self,
        token: TokenId,
        owner: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.check_blocked(token, owner)?;
        let available = self.balance_of(token, owner);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                token,
                account: owner,
                required: amount,
                available,
            });
        }
        let held = self
            .custody_of(token)
            .checked_add(amount)
            .ok_or(TransferError::Overflow { token })?;
        self.balances.insert((token, owner), available - amount);
        self.custody.insert(token, held);
        Ok(())
    }

    fn transfer(
        &mut self,
        token: TokenId,
        to: AccountId,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.check_blocked(token, to)?;
        let held = self.custody_of(token);
        if held < amount {
            return Err(TransferError::InsufficientBalance {
                token,
                account: to,
                required: amount,
                available: held,
            });
        }
        let balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow { token })?;
        self.custody.insert(token, held - amount);
        self.balances.insert((token, to), balance);
        Ok(())
    }
}
