//! Tick DEX - Demo Binary
//!
//! Lists a pair, places a few orders and runs one tick in small steps.
//! Configuration is read from `config/default.yaml` when present.

use std::sync::Arc;

use tick_dex::config::ExchangeConfig;
use tick_dex::dex::{CallContext, Dex};
use tick_dex::external::{Governor, InMemoryLedger, ManualPriceProvider};
use tick_dex::logging::init_logging;
use tick_dex::types::price::{from_fixed, to_fixed, WAD};
use tick_dex::types::{PairKey, Side};
use tick_dex::{DexEvent, DexResult};

const CONFIG_PATH: &str = "config/default.yaml";
const ADMIN: u64 = 1;
const BUYERS: [u64; 2] = [10, 11];
const SELLERS: [u64; 2] = [20, 21];

fn wad(s: &str) -> u128 {
    to_fixed(s).unwrap_or_default()
}

fn main() -> DexResult<()> {
    let config = match ExchangeConfig::load(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("using default configuration ({})", e);
            ExchangeConfig::default()
        }
    };
    init_logging(&config.log_level);

    println!("===========================================");
    println!("  Tick DEX - batch auction demo");
    println!("===========================================");
    println!();

    let common = config.common_base_token;
    let pair = PairKey::new(common, 2);
    let mut ledger = InMemoryLedger::new();
    for account in BUYERS {
        ledger.mint(pair.base, account, 1_000 * WAD);
    }
    for account in SELLERS {
        ledger.mint(pair.secondary, account, 100 * WAD);
    }

    let mut dex = Dex::new(config, ledger, Governor::new([ADMIN]))?;
    let provider = Arc::new(ManualPriceProvider::new(wad("10")));
    dex.add_token_pair(CallContext::new(ADMIN, 0), pair, provider, WAD, wad("10"))?;

    let block = 1;
    dex.insert_buy_limit_order(CallContext::new(BUYERS[0], block), pair, wad("100"), wad("11"), 5)?;
    dex.insert_buy_limit_order(CallContext::new(BUYERS[1], block), pair, wad("50"), wad("10"), 5)?;
    dex.insert_market_order(
        CallContext::new(BUYERS[1], block),
        pair,
        Side::Buy,
        wad("20"),
        wad("1.05"),
        5,
    )?;
    dex.insert_sell_limit_order(CallContext::new(SELLERS[0], block), pair, wad("8"), wad("9"), 5)?;
    dex.insert_sell_limit_order(CallContext::new(SELLERS[1], block), pair, wad("6"), wad("10.5"), 5)?;

    let preview = dex.get_emergent_price(pair)?;
    println!("Emergent price preview: {}", from_fixed(preview.price));
    println!("Simulated matches:      {}", preview.matches);
    println!();

    // Two steps per call, the way a block-bounded caller would run it
    let tick_block = dex.token_pair_status(pair)?.next_tick_block;
    let mut calls = 0;
    let receipt = loop {
        calls += 1;
        let outcome = dex.match_orders(CallContext::new(ADMIN, tick_block), pair, 2)?;
        if let Some(receipt) = outcome.receipt {
            break receipt;
        }
    };

    println!("Tick {} finished after {} calls", receipt.tick_number, calls);
    println!("  Matches:         {}", receipt.matches_executed);
    println!("  Closing price:   {}", from_fixed(receipt.closing_price));
    println!("  Next tick block: {}", receipt.next_tick_block);
    println!("  State root:      {}", receipt.state_root_hex());
    println!();

    for event in dex.take_events() {
        match event {
            DexEvent::BuyerMatch { fill, .. } => println!(
                "  buyer  order {}: sent {}, received {}, change {}",
                fill.order_id,
                from_fixed(fill.amount_sent),
                from_fixed(fill.received),
                from_fixed(fill.change)
            ),
            DexEvent::SellerMatch { fill, .. } => println!(
                "  seller order {}: sent {}, received {}, surplus {}",
                fill.order_id,
                from_fixed(fill.amount_sent),
                from_fixed(fill.received),
                from_fixed(fill.surplus)
            ),
            _ => {}
        }
    }
    println!();
    println!(
        "Commissions: {} base, {} secondary",
        from_fixed(dex.commission_balance(pair.base)),
        from_fixed(dex.commission_balance(pair.secondary))
    );
    Ok(())
}
