//! Listing, pair settings, pause and commission withdrawal.

mod common;

use std::sync::Arc;

use common::*;
use tick_dex::config::{ExchangeConfig, SurplusPolicy};
use tick_dex::external::NoPriceProvider;
use tick_dex::types::price::WAD;
use tick_dex::types::{OrderKind, PairKey, Side};
use tick_dex::{DexError, DexEvent};

#[test]
fn test_listing_rejections() {
    let mut h = Harness::new(config(), w("3"));
    let provider = Arc::new(NoPriceProvider);

    let cases = [
        (2, PairKey::new(BASE, OTHER), w("1"), WAD, DexError::Unauthorized(2)),
        (ADMIN, PairKey::new(BASE, BASE), w("1"), WAD, DexError::BaseEqualsSecondary),
        (
            ADMIN,
            PairKey::new(BASE, SECONDARY),
            w("1"),
            WAD,
            DexError::PairAlreadyExists { base: BASE, secondary: SECONDARY },
        ),
        (
            ADMIN,
            PairKey::new(SECONDARY, BASE),
            w("1"),
            WAD,
            DexError::InversePairAlreadyExists { base: SECONDARY, secondary: BASE },
        ),
        (ADMIN, PairKey::new(BASE, OTHER), 0, WAD, DexError::ZeroInitialPrice),
        (ADMIN, PairKey::new(BASE, OTHER), w("1"), 0, DexError::ZeroPricePrecision),
        (ADMIN, PairKey::new(OTHER, 400), w("1"), WAD, DexError::InvalidPair(OTHER)),
    ];
    for (sender, key, price, precision, expected) in cases {
        let ctx = tick_dex::CallContext::new(sender, 0);
        assert_eq!(
            h.dex.add_token_pair(ctx, key, provider.clone(), precision, price),
            Err(expected)
        );
    }
    assert_eq!(h.dex.token_pairs(), &[h.pair]);
}

#[test]
fn test_listing_chains_through_common_base() {
    let mut h = Harness::new(config(), w("3"));
    let chained = PairKey::new(SECONDARY, OTHER);
    h.dex
        .add_token_pair(admin(0), chained, Arc::new(NoPriceProvider), WAD, w("5"))
        .unwrap();
    assert_eq!(
        h.dex.take_events(),
        vec![DexEvent::TokenPairListed {
            pair: chained,
            initial_price: w("5"),
            price_precision: WAD,
        }]
    );
    assert_eq!(h.dex.token_pairs(), &[h.pair, chained]);

    // 10 OTHER -> 50 SECONDARY -> 150 BASE
    assert_eq!(h.dex.convert_to_common_base(h.pair, w("10")), Some(w("30")));
    assert_eq!(h.dex.convert_to_common_base(chained, w("10")), Some(w("150")));
    assert_eq!(h.dex.convert_to_common_base(PairKey::new(OTHER, 400), w("1")), None);
}

#[test]
fn test_default_precision_listing() {
    let mut h = Harness::new(config(), w("1"));
    let key = PairKey::new(BASE, OTHER);
    h.dex
        .add_token_pair_with_default_precision(admin(0), key, Arc::new(NoPriceProvider), w("2"))
        .unwrap();
    let status = h.dex.token_pair_status(key).unwrap();
    assert_eq!(status.price_precision, WAD);
    assert_eq!(status.last_closing_price, w("2"));
    assert_eq!(status.ema_price, w("2"));
    assert_eq!(status.tick_number, 1);
}

#[test]
fn test_disabled_pair_rejects_new_orders() {
    let mut h = Harness::new(config(), w("1"));
    let resting = h.dex.insert_buy_limit_order(user(2), h.pair, w("5"), w("1"), 5).unwrap();
    h.dex.disable_token_pair(admin(1), h.pair).unwrap();

    assert_eq!(
        h.dex.disable_token_pair(admin(1), h.pair),
        Err(DexError::PairStateUnchanged {
            base: BASE,
            secondary: SECONDARY,
            state: "disabled",
        })
    );
    assert_eq!(
        h.dex.insert_sell_limit_order(user(3), h.pair, w("5"), w("1"), 5),
        Err(DexError::PairDisabled { base: BASE, secondary: SECONDARY })
    );

    // resting orders still match and can still be cancelled
    assert!(h.dex.token_pair_status(h.pair).unwrap().disabled);
    h.run_tick(10);
    h.dex.cancel_buy_order(user(2), h.pair, resting, None).unwrap();

    h.dex.enable_token_pair(admin(1), h.pair).unwrap();
    h.dex.insert_sell_limit_order(user(3), h.pair, w("5"), w("1"), 5).unwrap();
}

#[test]
fn test_pair_settings_blocked_while_tick_runs() {
    let mut h = Harness::new(config(), w("1"));
    h.dex.insert_buy_limit_order(user(2), h.pair, w("20"), w("2"), 5).unwrap();
    h.dex.insert_sell_limit_order(user(3), h.pair, w("5"), w("2"), 5).unwrap();
    h.dex.match_orders(admin(12), h.pair, 1).unwrap();

    assert_eq!(h.dex.disable_token_pair(admin(12), h.pair), Err(DexError::TickIsRunning));
    assert_eq!(
        h.dex.set_last_closing_price(admin(12), h.pair, w("3")),
        Err(DexError::TickIsRunning)
    );
    assert_eq!(
        h.dex.set_smoothing_factor(admin(12), h.pair, w("0.5")),
        Err(DexError::TickIsRunning)
    );

    h.run_tick(10);
    h.dex.set_last_closing_price(admin(12), h.pair, w("3")).unwrap();
    h.dex.set_ema_price(admin(12), h.pair, w("4")).unwrap();
    let status = h.dex.token_pair_status(h.pair).unwrap();
    assert_eq!(status.last_closing_price, w("3"));
    assert_eq!(status.ema_price, w("4"));
    assert_eq!(h.dex.set_last_closing_price(admin(12), h.pair, 0), Err(DexError::ZeroPrice));
}

#[test]
fn test_settlement_settings_blocked_while_any_tick_runs() {
    let mut h = Harness::new(config(), w("1"));
    h.dex.insert_buy_limit_order(user(2), h.pair, w("20"), w("2"), 5).unwrap();
    h.dex.insert_sell_limit_order(user(3), h.pair, w("5"), w("2"), 5).unwrap();
    h.dex.match_orders(admin(12), h.pair, 1).unwrap();

    let tick = h.dex.config().tick;
    assert_eq!(
        h.dex.set_surplus_policy(admin(12), SurplusPolicy::Retained),
        Err(DexError::TickIsRunning)
    );
    assert_eq!(h.dex.set_tick_config(admin(12), tick), Err(DexError::TickIsRunning));
    assert_eq!(
        h.dex.set_expected_orders_for_tick(admin(12), 16),
        Err(DexError::TickIsRunning)
    );
    assert_eq!(h.dex.config().surplus_policy, SurplusPolicy::ToSeller);

    h.run_tick(10);
    h.dex.set_surplus_policy(admin(12), SurplusPolicy::Retained).unwrap();
    h.dex.set_expected_orders_for_tick(admin(12), 16).unwrap();
    assert_eq!(h.dex.config().surplus_policy, SurplusPolicy::Retained);
    assert_eq!(h.dex.config().tick.expected_orders_for_tick, 16);
}

#[test]
fn test_order_validation() {
    let mut h = Harness::new(config_with_rates("0.1", "0", "0"), w("3"));
    h.dex.set_min_order_amount(admin(0), w("10")).unwrap();

    assert_eq!(
        h.dex.insert_buy_limit_order(user(2), h.pair, w("5"), w("1"), 5),
        Err(DexError::AmountTooLow { amount: w("5"), minimum: w("10") })
    );
    // 3 SECONDARY at a closing price of 3 is worth 9 BASE
    assert_eq!(
        h.dex.insert_sell_limit_order(user(2), h.pair, w("3"), w("1"), 5),
        Err(DexError::AmountTooLow { amount: w("9"), minimum: w("10") })
    );
    h.dex.insert_sell_limit_order(user(2), h.pair, w("4"), w("1"), 5).unwrap();

    assert_eq!(
        h.dex.insert_buy_limit_order(user(2), h.pair, w("20"), w("1"), 11),
        Err(DexError::LifespanTooHigh { lifespan: 11, max: 10 })
    );
    assert_eq!(
        h.dex.insert_buy_limit_order(user(2), h.pair, w("20"), 0, 5),
        Err(DexError::ZeroPrice)
    );
    assert_eq!(
        h.dex.insert_market_order(user(2), h.pair, Side::Buy, w("20"), 0, 5),
        Err(DexError::MultiplyFactorZero)
    );
    assert_eq!(
        h.dex.insert_market_order(user(2), h.pair, Side::Buy, w("20"), WAD / 1000, 5),
        Err(DexError::LowMultiplyFactor(WAD / 1000))
    );
    assert_eq!(
        h.dex.insert_market_order(user(2), h.pair, Side::Buy, w("20"), 200 * WAD, 5),
        Err(DexError::HighMultiplyFactor(200 * WAD))
    );
    assert_eq!(
        h.dex.insert_buy_limit_order(user(2), PairKey::new(BASE, OTHER), w("20"), w("1"), 5),
        Err(DexError::PairNotFound { base: BASE, secondary: OTHER })
    );

    // nothing was taken for the rejected orders
    assert_eq!(h.balance(BASE, 2), FUNDS);
    assert_eq!(h.balance(SECONDARY, 2), FUNDS - w("4"));
}

#[test]
fn test_insufficient_balance_rejects_order() {
    let mut h = Harness::new(config(), w("1"));
    let result = h.dex.insert_buy_limit_order(user(31), h.pair, w("1"), w("1"), 5);
    assert!(matches!(result, Err(DexError::Transfer(_))));
    assert_eq!(h.dex.orders_length(h.pair, Side::Buy, OrderKind::Limit).unwrap(), 0);
}

#[test]
fn test_pause_blocks_user_operations() {
    let mut h = Harness::new(config(), w("1"));
    let id = h.dex.insert_buy_limit_order(user(2), h.pair, w("5"), w("1"), 5).unwrap();

    assert_eq!(h.dex.pause(user(2)), Err(DexError::Unauthorized(2)));
    h.dex.pause(admin(1)).unwrap();
    assert!(h.dex.is_paused());
    assert_eq!(h.dex.pause(admin(1)), Err(DexError::Paused));

    assert_eq!(
        h.dex.insert_buy_limit_order(user(2), h.pair, w("5"), w("1"), 5),
        Err(DexError::Paused)
    );
    assert_eq!(h.dex.cancel_buy_order(user(2), h.pair, id, None), Err(DexError::Paused));
    assert_eq!(h.dex.match_orders(admin(12), h.pair, 10), Err(DexError::Paused));
    assert_eq!(
        h.dex.process_expired(user(2), h.pair, Side::Buy, OrderKind::Limit, None, None, 10),
        Err(DexError::Paused)
    );
    assert_eq!(h.dex.orders_length(h.pair, Side::Buy, OrderKind::Limit).unwrap(), 1);

    h.dex.unpause(admin(1)).unwrap();
    assert_eq!(h.dex.unpause(admin(1)), Err(DexError::NotPaused));
    h.dex.cancel_buy_order(user(2), h.pair, id, None).unwrap();
}

#[test]
fn test_withdraw_commissions_to_beneficiary() {
    let mut h = Harness::new(config_with_rates("0.1", "0.5", "0"), w("1"));
    let id = h.dex.insert_buy_limit_order(user(2), h.pair, w("10"), w("1"), 5).unwrap();
    h.dex.cancel_buy_order(user(2), h.pair, id, None).unwrap();
    assert_eq!(h.dex.commission_balance(BASE), w("0.5"));

    assert_eq!(
        h.dex.withdraw_commissions(user(2), BASE),
        Err(DexError::Unauthorized(2))
    );
    h.dex.set_beneficiary(admin(1), 901).unwrap();
    assert_eq!(h.dex.beneficiary(), 901);

    let amount = h.dex.withdraw_commissions(admin(1), BASE).unwrap();
    assert_eq!(amount, w("0.5"));
    assert_eq!(h.balance(BASE, 901), w("0.5"));
    assert_eq!(h.dex.commission_balance(BASE), 0);
    assert_eq!(h.dex.ledger().custody_of(BASE), 0);
}

#[test]
fn test_rate_setters_validate() {
    let mut h = Harness::new(config(), w("1"));
    assert!(h.dex.set_commission_rate(admin(1), 2 * WAD).is_err());
    assert!(h.dex.set_cancelation_penalty_rate(admin(1), WAD + 1).is_err());
    assert!(h.dex.set_multiply_factor_bounds(admin(1), 2 * WAD, WAD).is_err());
    assert_eq!(h.dex.set_commission_rate(user(2), w("0.1")), Err(DexError::Unauthorized(2)));

    h.dex.set_commission_rate(admin(1), w("0.2")).unwrap();
    h.dex.set_expiration_penalty_rate(admin(1), w("0.3")).unwrap();
    assert_eq!(h.dex.config().commission.commission_rate, w("0.2"));
    assert_eq!(h.dex.config().commission.expiration_penalty_rate, w("0.3"));

    let id = h.dex.insert_buy_limit_order(user(2), h.pair, w("10"), w("1"), 5).unwrap();
    let order = h.dex.order(h.pair, id).unwrap().unwrap();
    assert_eq!(order.reserved_commission, w("2"));
    assert_eq!(order.exchangeable_amount, w("8"));
}

#[test]
fn test_tick_config_setters() {
    let mut h = Harness::new(config(), w("1"));
    assert_eq!(
        h.dex.set_expected_orders_for_tick(admin(1), 1),
        Err(DexError::ExpectedOrdersTooLow(1))
    );
    h.dex.set_expected_orders_for_tick(admin(1), 16).unwrap();
    assert_eq!(h.dex.config().tick.expected_orders_for_tick, 16);

    for i in 0..4 {
        h.dex.insert_buy_limit_order(user(2 + i), h.pair, w("1"), w("1"), 10).unwrap();
        h.dex.insert_sell_limit_order(user(2 + i), h.pair, w("1"), w("2"), 10).unwrap();
    }
    // 12 * 16 / 8 = 24, capped at 12
    let receipt = h.run_tick(20);
    assert_eq!(receipt.next_tick_block, 24);
}

#[test]
fn test_bundled_config_loads() {
    let config = ExchangeConfig::load("config/default.yaml").unwrap();
    assert_eq!(config.commission.commission_rate, w("0.1"));
    assert_eq!(config.commission.cancelation_penalty_rate, w("0.25"));
    assert_eq!(config.commission.expiration_penalty_rate, w("0.65"));
    assert!(ExchangeConfig::from_yaml("tick:\n  expected_orders_for_tick: 1\n").is_err());
}
