//! Exchange configuration.
//!
//! Loaded from YAML. Every section has defaults, so a file only needs the
//! values it changes. Fixed-point values are written as decimal strings
//! (`"0.1"`) and stored as wad integers.
//!
//! ```yaml
//! common_base_token: 1
//! beneficiary: 900
//! tick:
//!   expected_orders_for_tick: 8
//!   min_blocks_for_tick: 4
//!   max_blocks_for_tick: 12
//! commission:
//!   commission_rate: "0.1"
//!   cancelation_penalty_rate: "0.25"
//!   expiration_penalty_rate: "0.65"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DexError, DexResult};
use crate::types::price::{RATE_PRECISION, WAD};
use crate::types::{AccountId, Amount, TokenId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Token every pair's minimum order amount is measured in
    pub common_base_token: TokenId,

    /// Account that receives withdrawn commissions
    pub beneficiary: AccountId,

    pub log_level: String,

    pub tick: TickConfig,

    pub orders: OrderLimits,

    pub commission: CommissionRates,

    /// EMA smoothing factor given to newly listed pairs
    #[serde(with = "wad")]
    pub default_smoothing_factor: u128,

    /// Decimals of the price precision given to newly listed pairs
    pub default_price_decimals: u32,

    pub surplus_policy: SurplusPolicy,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            common_base_token: 1,
            beneficiary: 0,
            log_level: "info".to_string(),
            tick: TickConfig::default(),
            orders: OrderLimits::default(),
            commission: CommissionRates::default(),
            default_smoothing_factor: 2 * WAD / 121,
            default_price_decimals: 18,
            surplus_policy: SurplusPolicy::default(),
        }
    }
}

impl ExchangeConfig {
    /// Read and validate a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> DexResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| DexError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> DexResult<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| DexError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DexResult<()> {
        self.tick.validate()?;
        self.orders.validate()?;
        self.commission.validate()?;
        check_rate("smoothing_factor", self.default_smoothing_factor)?;
        if self.default_price_decimals > 36 {
            return Err(DexError::Config(format!(
                "price decimals {} exceed 36",
                self.default_price_decimals
            )));
        }
        Ok(())
    }

    /// Price precision for newly listed pairs
    pub fn default_price_precision(&self) -> u128 {
        10u128.pow(self.default_price_decimals)
    }
}

/// Tick scheduling parameters shared by every pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Order count a tick is expected to see; drives the adaptive interval
    pub expected_orders_for_tick: u64,
    pub min_blocks_for_tick: u64,
    pub max_blocks_for_tick: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            expected_orders_for_tick: 8,
            min_blocks_for_tick: 4,
            max_blocks_for_tick: 12,
        }
    }
}

impl TickConfig {
    pub fn validate(&self) -> DexResult<()> {
        if self.expected_orders_for_tick < 2 {
            return Err(DexError::ExpectedOrdersTooLow(self.expected_orders_for_tick));
        }
        if self.min_blocks_for_tick > self.max_blocks_for_tick {
            return Err(DexError::InvalidBlockBounds {
                min: self.min_blocks_for_tick,
                max: self.max_blocks_for_tick,
            });
        }
        Ok(())
    }

    /// Blocks until the next tick may start
    ///
    /// Scales the elapsed interval by `expected / observed` orders and
    /// clamps it to the configured bounds. A tick without orders waits the
    /// maximum.
    ///
    /// # Example
    ///
    /// ```
    /// use tick_dex::config::TickConfig;
    ///
    /// let config = TickConfig::default(); // expected 8, bounds [4, 12]
    /// assert_eq!(config.blocks_for_tick(20, 16), 10);
    /// assert_eq!(config.blocks_for_tick(3, 12), 4);
    /// assert_eq!(config.blocks_for_tick(5, 0), 12);
    /// ```
    pub fn blocks_for_tick(&self, elapsed_blocks: u64, orders_count: u64) -> u64 {
        if orders_count == 0 {
            return self.max_blocks_for_tick;
        }
        let scaled = u128::from(elapsed_blocks) * u128::from(self.expected_orders_for_tick)
            / u128::from(orders_count);
        u64::try_from(scaled)
            .unwrap_or(u64::MAX)
            .clamp(self.min_blocks_for_tick, self.max_blocks_for_tick)
    }
}

/// Order acceptance limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderLimits {
    /// Maximum lifespan, in ticks
    pub max_order_lifespan: u64,

    /// Minimum order amount, measured in the common base token
    #[serde(with = "wad")]
    pub min_order_amount: Amount,

    #[serde(with = "wad")]
    pub min_multiply_factor: u128,

    #[serde(with = "wad")]
    pub max_multiply_factor: u128,
}

impl Default for OrderLimits {
    fn default() -> Self {
        Self {
            max_order_lifespan: 10,
            min_order_amount: 0,
            min_multiply_factor: WAD / 100,
            max_multiply_factor: 199 * WAD,
        }
    }
}

impl OrderLimits {
    pub fn validate(&self) -> DexResult<()> {
        if self.min_multiply_factor > self.max_multiply_factor {
            return Err(DexError::InvalidMultiplyFactorBounds {
                min: self.min_multiply_factor,
                max: self.max_multiply_factor,
            });
        }
        Ok(())
    }
}

/// Commission and penalty rates, scaled by `RATE_PRECISION`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionRates {
    /// Reserved from every order at insertion
    #[serde(with = "wad")]
    pub commission_rate: u128,

    /// Share of the reserved commission kept on cancel
    #[serde(with = "wad")]
    pub cancelation_penalty_rate: u128,

    /// Share of the reserved commission kept on expiration
    #[serde(with = "wad")]
    pub expiration_penalty_rate: u128,
}

impl CommissionRates {
    pub fn validate(&self) -> DexResult<()> {
        check_rate("commission_rate", self.commission_rate)?;
        check_rate("cancelation_penalty_rate", self.cancelation_penalty_rate)?;
        check_rate("expiration_penalty_rate", self.expiration_penalty_rate)
    }
}

/// Where the price improvement of a seller goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurplusPolicy {
    /// The seller receives the whole amount paid at the emergent price
    #[default]
    ToSeller,
    /// The seller receives its own price; the rest is kept as commission
    Retained,
}

pub(crate) fn check_rate(name: &'static str, value: u128) -> DexResult<()> {
    if value > RATE_PRECISION {
        return Err(DexError::RateAboveOne { name, value });
    }
    Ok(())
}

/// Serde adapter: wad `u128` written as a decimal string
pub mod wad {
    use rust_decimal::Decimal;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::types::price::{decimal_to_fixed, from_fixed};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&from_fixed(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let decimal = <Decimal as Deserialize>::deserialize(deserializer)?;
        decimal_to_fixed(decimal)
            .ok_or_else(|| D::Error::custom(format!("{} is not a valid fixed-point value", decimal)))
    }
}
