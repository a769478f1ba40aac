//! Commission manager.
//!
//! Computes the commission reserved from each order and keeps the balance
//! the exchange has earned per token. Balances only grow through charges
//! and are zeroed by a withdrawal to the beneficiary.

use std::collections::HashMap;

use tracing::debug;

use crate::config::{check_rate, CommissionRates};
use crate::error::{DexResult, OrOverflow};
use crate::types::price::apply_rate;
use crate::types::{AccountId, Amount, TokenId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommissionManager {
    beneficiary: AccountId,
    rates: CommissionRates,
    balances: HashMap<TokenId, Amount>,
}

impl CommissionManager {
    pub fn new(beneficiary: AccountId, rates: CommissionRates) -> DexResult<Self> {
        rates.validate()?;
        Ok(Self {
            beneficiary,
            rates,
            balances: HashMap::new(),
        })
    }

    pub fn beneficiary(&self) -> AccountId {
        self.beneficiary
    }

    pub fn rates(&self) -> CommissionRates {
        self.rates
    }

    /// Commission reserved from an order of `amount`
    pub fn calculate_initial_fee(&self, amount: Amount) -> DexResult<Amount> {
        apply_rate(amount, self.rates.commission_rate).or_overflow()
    }

    /// Credit `amount` of `token` to the exchange
    pub fn charge_commission(&mut self, token: TokenId, amount: Amount) -> DexResult<()> {
        if amount == 0 {
            return Ok(());
        }
        let balance = self.balances.entry(token).or_insert(0);
        *balance = balance.checked_add(amount).or_overflow()?;
        debug!("charged {} of token {} in commissions", amount, token);
        Ok(())
    }

    /// Split a cancelled order's reserve into `(penalty, returned)`
    ///
    /// The penalty is charged; the rest goes back to the owner.
    pub fn charge_cancelation_penalty(
        &mut self,
        token: TokenId,
        reserved: Amount,
    ) -> DexResult<(Amount, Amount)> {
        self.charge_penalty(token, reserved, self.rates.cancelation_penalty_rate)
    }

    /// Split an expired order's reserve into `(penalty, returned)`
    pub fn charge_expiration_penalty(
        &mut self,
        token: TokenId,
        reserved: Amount,
    ) -> DexResult<(Amount, Amount)> {
        self.charge_penalty(token, reserved, self.rates.expiration_penalty_rate)
    }

    fn charge_penalty(
        &mut self,
        token: TokenId,
        reserved: Amount,
        rate: u128,
    ) -> DexResult<(Amount, Amount)> {
        let penalty = apply_rate(reserved, rate).or_overflow()?;
        self.charge_commission(token, penalty)?;
        Ok((penalty, reserved - penalty))
    }

    /// Commissions accumulated in `token`
    pub fn exchange_commissions(&self, token: TokenId) -> Amount {
        self.balances.get(&token).copied().unwrap_or(0)
    }

    /// Zero the balance of `token` and return what it held
    pub fn withdraw(&mut self, token: TokenId) -> Amount {
        self.balances.remove(&token).unwrap_or(0)
    }

    pub fn set_beneficiary(&mut self, beneficiary: AccountId) {
        self.beneficiary = beneficiary;
    }

    pub fn set_rates(&mut self, rates: CommissionRates) -> DexResult<()> {
        rates.validate()?;
        self.rates = rates;
        Ok(())
    }

    pub fn set_commission_rate(&mut self, rate: u128) -> DexResult<()> {
        check_rate("commission_rate", rate)?;
        self.rates.commission_rate = rate;
        Ok(())
    }

    pub fn set_cancelation_penalty_rate(&mut self, rate: u128) -> DexResult<()> {
        check_rate("cancelation_penalty_rate", rate)?;
        self.rates.cancelation_penalty_rate = rate;
        Ok(())
    }

    pub fn set_expiration_penalty_rate(&mut self, rate: u128) -> DexResult<()> {
        check_rate("expiration_penalty_rate", rate)?;
        self.rates.expiration_penalty_rate = rate;
        Ok(())
    }
}
