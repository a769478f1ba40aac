//! Governed operations: listing, pair settings and exchange-wide settings.
//!
//! Every operation here requires an authorized caller. Pair settings are
//! rejected while that pair's tick runs.

use std::sync::Arc;

use tracing::info;

use crate::config::{check_rate, CommissionRates, SurplusPolicy, TickConfig};
use crate::engine::TokenPair;
use crate::error::{DexError, DexResult};
use crate::events::DexEvent;
use crate::external::{PriceProvider, TokenLedger};
use crate::types::{AccountId, Amount, PairKey, Price, TokenId};

use super::{CallContext, Dex};

impl<L: TokenLedger> Dex<L> {
    // ========================================================================
    // Pair Listing
    // ========================================================================

    /// List a new pair
    ///
    /// The base token must be the common base token, or the secondary of a
    /// pair whose base is the common base token, so that order amounts can
    /// be measured in the common base.
    pub fn add_token_pair(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        provider: Arc<dyn PriceProvider>,
        price_precision: u128,
        initial_price: Price,
    ) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        if key.base == key.secondary {
            return Err(DexError::BaseEqualsSecondary);
        }
        if self.pairs.contains_key(&key) {
            return Err(DexError::PairAlreadyExists {
                base: key.base,
                secondary: key.secondary,
            });
        }
        if self.pairs.contains_key(&key.inverse()) {
            return Err(DexError::InversePairAlreadyExists {
                base: key.base,
                secondary: key.secondary,
            });
        }
        if initial_price == 0 {
            return Err(DexError::ZeroInitialPrice);
        }
        if price_precision == 0 {
            return Err(DexError::ZeroPricePrecision);
        }
        let common = self.config.common_base_token;
        if key.base != common && !self.pairs.contains_key(&PairKey::new(common, key.base)) {
            return Err(DexError::InvalidPair(key.base));
        }

        let pair = TokenPair::new(
            key,
            initial_price,
            price_precision,
            self.config.default_smoothing_factor,
            ctx.block,
            &self.config.tick,
        );
        self.pairs.insert(key, pair);
        self.pair_order.push(key);
        self.providers.insert(key, provider);

        info!("pair {} listed at price {}", key, initial_price);
        self.events.push(DexEvent::TokenPairListed {
            pair: key,
            initial_price,
            price_precision,
        });
        Ok(())
    }

    /// List a pair with the configured default price precision
    pub fn add_token_pair_with_default_precision(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        provider: Arc<dyn PriceProvider>,
        initial_price: Price,
    ) -> DexResult<()> {
        let precision = self.config.default_price_precision();
        self.add_token_pair(ctx, key, provider, precision, initial_price)
    }

    pub fn enable_token_pair(&mut self, ctx: CallContext, key: PairKey) -> DexResult<()> {
        self.set_pair_disabled(ctx, key, false)
    }

    /// Stop accepting orders for a pair; resting orders and ticks continue
    pub fn disable_token_pair(&mut self, ctx: CallContext, key: PairKey) -> DexResult<()> {
        self.set_pair_disabled(ctx, key, true)
    }

    fn set_pair_disabled(&mut self, ctx: CallContext, key: PairKey, disabled: bool) -> DexResult<()> {
        let pair = self.governed_pair(ctx, key)?;
        if pair.disabled == disabled {
            return Err(DexError::PairStateUnchanged {
                base: key.base,
                secondary: key.secondary,
                state: if disabled { "disabled" } else { "enabled" },
            });
        }
        pair.disabled = disabled;

        info!("pair {} {}", key, if disabled { "disabled" } else { "enabled" });
        self.events.push(if disabled {
            DexEvent::TokenPairDisabled { pair: key }
        } else {
            DexEvent::TokenPairEnabled { pair: key }
        });
        Ok(())
    }

    // ========================================================================
    // Pair Settings
    // ========================================================================

    /// Authorized caller and idle pair
    fn governed_pair(&mut self, ctx: CallContext, key: PairKey) -> DexResult<&mut TokenPair> {
        self.ensure_authorized(ctx.sender)?;
        let pair = self.pair_mut(key)?;
        pair.tick.ensure_idle()?;
        Ok(pair)
    }

    pub fn set_price_provider(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        provider: Arc<dyn PriceProvider>,
    ) -> DexResult<()> {
        self.governed_pair(ctx, key)?;
        self.providers.insert(key, provider);
        Ok(())
    }

    pub fn set_price_precision(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        precision: u128,
    ) -> DexResult<()> {
        if precision == 0 {
            return Err(DexError::ZeroPricePrecision);
        }
        self.governed_pair(ctx, key)?.price_precision = precision;
        Ok(())
    }

    pub fn set_last_closing_price(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        price: Price,
    ) -> DexResult<()> {
        if price == 0 {
            return Err(DexError::ZeroPrice);
        }
        self.governed_pair(ctx, key)?.last_closing_price = price;
        Ok(())
    }

    pub fn set_ema_price(&mut self, ctx: CallContext, key: PairKey, price: Price) -> DexResult<()> {
        self.governed_pair(ctx, key)?.ema_price = price;
        Ok(())
    }

    pub fn set_smoothing_factor(
        &mut self,
        ctx: CallContext,
        key: PairKey,
        factor: u128,
    ) -> DexResult<()> {
        check_rate("smoothing_factor", factor)?;
        self.governed_pair(ctx, key)?.smoothing_factor = factor;
        Ok(())
    }

    // ========================================================================
    // Exchange Settings
    // ========================================================================

    pub fn set_commission_rates(&mut self, ctx: CallContext, rates: CommissionRates) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.commissions.set_rates(rates)?;
        self.config.commission = rates;
        Ok(())
    }

    pub fn set_commission_rate(&mut self, ctx: CallContext, rate: u128) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.commissions.set_commission_rate(rate)?;
        self.config.commission = self.commissions.rates();
        Ok(())
    }

    pub fn set_cancelation_penalty_rate(&mut self, ctx: CallContext, rate: u128) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.commissions.set_cancelation_penalty_rate(rate)?;
        self.config.commission = self.commissions.rates();
        Ok(())
    }

    pub fn set_expiration_penalty_rate(&mut self, ctx: CallContext, rate: u128) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.commissions.set_expiration_penalty_rate(rate)?;
        self.config.commission = self.commissions.rates();
        Ok(())
    }

    pub fn set_beneficiary(&mut self, ctx: CallContext, beneficiary: AccountId) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.commissions.set_beneficiary(beneficiary);
        self.config.beneficiary = beneficiary;
        Ok(())
    }

    /// Replace the tick schedule; applies from each pair's next tick end
    ///
    /// Rejected with `TickIsRunning` while any pair is mid-tick.
    pub fn set_tick_config(&mut self, ctx: CallContext, tick: TickConfig) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.ensure_no_tick_running()?;
        tick.validate()?;
        self.config.tick = tick;
        Ok(())
    }

    pub fn set_expected_orders_for_tick(&mut self, ctx: CallContext, expected: u64) -> DexResult<()> {
        let tick = TickConfig {
            expected_orders_for_tick: expected,
            ..self.config.tick
        };
        self.set_tick_config(ctx, tick)
    }

    pub fn set_max_order_lifespan(&mut self, ctx: CallContext, lifespan: u64) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.config.orders.max_order_lifespan = lifespan;
        Ok(())
    }

    pub fn set_min_order_amount(&mut self, ctx: CallContext, amount: Amount) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.config.orders.min_order_amount = amount;
        Ok(())
    }

    pub fn set_multiply_factor_bounds(
        &mut self,
        ctx: CallContext,
        min: u128,
        max: u128,
    ) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        let mut orders = self.config.orders;
        orders.min_multiply_factor = min;
        orders.max_multiply_factor = max;
        orders.validate()?;
        self.config.orders = orders;
        Ok(())
    }

    /// Rejected with `TickIsRunning` while any pair is mid-tick
    pub fn set_surplus_policy(&mut self, ctx: CallContext, policy: SurplusPolicy) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.ensure_no_tick_running()?;
        self.config.surplus_policy = policy;
        Ok(())
    }

    // ========================================================================
    // Pause and Commissions
    // ========================================================================

    pub fn pause(&mut self, ctx: CallContext) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        self.ensure_not_paused()?;
        self.paused = true;
        info!("exchange paused by {}", ctx.sender);
        self.events.push(DexEvent::Paused);
        Ok(())
    }

    pub fn unpause(&mut self, ctx: CallContext) -> DexResult<()> {
        self.ensure_authorized(ctx.sender)?;
        if !self.paused {
            return Err(DexError::NotPaused);
        }
        self.paused = false;
        info!("exchange unpaused by {}", ctx.sender);
        self.events.push(DexEvent::Unpaused);
        Ok(())
    }

    /// Send everything earned in `token` to the beneficiary
    pub fn withdraw_commissions(&mut self, ctx: CallContext, token: TokenId) -> DexResult<Amount> {
        self.ensure_authorized(ctx.sender)?;
        let amount = self.commissions.exchange_commissions(token);
        let beneficiary = self.commissions.beneficiary();
        self.ledger.transfer(token, beneficiary, amount)?;
        self.commissions.withdraw(token);

        info!("withdrew {} of token {} to {}", amount, token, beneficiary);
        self.events.push(DexEvent::CommissionsWithdrawn {
            token,
            beneficiary,
            amount,
        });
        Ok(amount)
    }
}
