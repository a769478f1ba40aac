//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use tick_dex::config::{CommissionRates, ExchangeConfig};
use tick_dex::dex::{CallContext, Dex};
use tick_dex::external::{Governor, InMemoryLedger, ManualPriceProvider};
use tick_dex::types::price::{to_fixed, WAD};
use tick_dex::types::{AccountId, PairKey, TickReceipt, TokenId};
use tick_dex::DexEvent;

pub const ADMIN: AccountId = 1;
pub const BASE: TokenId = 100;
pub const SECONDARY: TokenId = 200;
pub const OTHER: TokenId = 300;

/// Balance every test account starts with, in both tokens
pub const FUNDS: u128 = 1_000_000 * WAD;

pub fn w(s: &str) -> u128 {
    to_fixed(s).unwrap()
}

pub fn config() -> ExchangeConfig {
    ExchangeConfig {
        common_base_token: BASE,
        beneficiary: 900,
        ..ExchangeConfig::default()
    }
}

pub fn config_with_rates(commission: &str, cancel: &str, expire: &str) -> ExchangeConfig {
    ExchangeConfig {
        commission: CommissionRates {
            commission_rate: w(commission),
            cancelation_penalty_rate: w(cancel),
            expiration_penalty_rate: w(expire),
        },
        ..config()
    }
}

pub struct Harness {
    pub dex: Dex<InMemoryLedger>,
    pub pair: PairKey,
    pub provider: Arc<ManualPriceProvider>,
}

impl Harness {
    /// Exchange with the BASE/SECONDARY pair listed at block 0
    pub fn new(config: ExchangeConfig, initial_price: u128) -> Self {
        let mut ledger = InMemoryLedger::new();
        for account in 2..=30 {
            for token in [BASE, SECONDARY, OTHER] {
                ledger.mint(token, account, FUNDS);
            }
        }
        let mut dex = Dex::new(config, ledger, Governor::new([ADMIN])).unwrap();
        let pair = PairKey::new(BASE, SECONDARY);
        let provider = Arc::new(ManualPriceProvider::new(initial_price));
        provider.invalidate();
        dex.add_token_pair(admin(0), pair, provider.clone(), WAD, initial_price)
            .unwrap();
        dex.take_events();
        Self { dex, pair, provider }
    }

    pub fn balance(&self, token: TokenId, account: AccountId) -> u128 {
        self.dex.ledger().balance_of(token, account)
    }

    pub fn next_tick_block(&self) -> u64 {
        self.dex.token_pair_status(self.pair).unwrap().next_tick_block
    }

    /// Run the pending tick to completion with `steps` per call
    pub fn run_tick(&mut self, steps: u64) -> TickReceipt {
        let block = self.next_tick_block();
        loop {
            let outcome = self
                .dex
                .match_orders(CallContext::new(ADMIN, block), self.pair, steps)
                .unwrap();
            if let Some(receipt) = outcome.receipt {
                return receipt;
            }
        }
    }
}

pub fn admin(block: u64) -> CallContext {
    CallContext::new(ADMIN, block)
}

pub fn user(account: AccountId) -> CallContext {
    CallContext::new(account, 1)
}

pub fn buyer_matches(events: &[DexEvent]) -> Vec<tick_dex::types::BuyerMatch> {
    events
        .iter()
        .filter_map(|event| match event {
            DexEvent::BuyerMatch { fill, .. } => Some(fill.clone()),
            _ => None,
        })
        .collect()
}

pub fn seller_matches(events: &[DexEvent]) -> Vec<tick_dex::types::SellerMatch> {
    events
        .iter()
        .filter_map(|event| match event {
            DexEvent::SellerMatch { fill, .. } => Some(fill.clone()),
            _ => None,
        })
        .collect()
}
