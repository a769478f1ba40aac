//! Outbox of side effects produced by engine steps.
//!
//! Steps never touch the ledger or the commission balances directly. They
//! queue what has to happen; the exchange applies the outbox only after the
//! whole call succeeded, so a failing call leaves no trace.

use crate::events::DexEvent;
use crate::types::{AccountId, Amount, TokenId};

/// Transfer out of custody
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub token: TokenId,
    pub to: AccountId,
    pub amount: Amount,
}

/// Amount credited to the exchange's commission balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge {
    pub token: TokenId,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    pub payouts: Vec<Payout>,
    pub charges: Vec<Charge>,
    pub events: Vec<DexEvent>,
}

impl Effects {
    /// Queue a payout; zero amounts are dropped
    pub fn pay(&mut self, token: TokenId, to: AccountId, amount: Amount) {
        if amount > 0 {
            self.payouts.push(Payout { token, to, amount });
        }
    }

    /// Queue a commission charge; zero amounts are dropped
    pub fn charge(&mut self, token: TokenId, amount: Amount) {
        if amount > 0 {
            self.charges.push(Charge { token, amount });
        }
    }

    pub fn emit(&mut self, event: DexEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty() && self.charges.is_empty() && self.events.is_empty()
    }

    /// Total queued payouts of `token`
    pub fn paid(&self, token: TokenId) -> Amount {
        self.payouts
            .iter()
            .filter(|p| p.token == token)
            .map(|p| p.amount)
            .sum()
    }

    /// Total queued charges of `token`
    pub fn charged(&self, token: TokenId) -> Amount {
        self.charges
            .iter()
            .filter(|c| c.token == token)
            .map(|c| c.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_amounts_are_dropped() {
        let mut effects = Effects::default();
        effects.pay(1, 7, 0);
        effects.charge(1, 0);
        assert!(effects.is_empty());

        effects.pay(1, 7, 5);
        effects.pay(2, 7, 3);
        effects.pay(1, 8, 4);
        effects.charge(1, 2);
        assert_eq!(effects.paid(1), 9);
        assert_eq!(effects.paid(2), 3);
        assert_eq!(effects.charged(1), 2);
        assert_eq!(effects.charged(2), 0);
    }
}
