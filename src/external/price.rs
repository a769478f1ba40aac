//! Reference price sources.

use std::sync::Mutex;

use crate::types::Price;

/// Reference price for a pair's market orders
///
/// The exchange reads it once per tick. An invalid reading makes the tick
/// fall back to the pair's last closing price.
pub trait PriceProvider: Send + Sync {
    /// Whether the current reading can be used
    fn is_valid(&self) -> bool;

    /// Current price, scaled like the pair's prices
    fn get_price(&self) -> Price;
}

/// Provider whose price is set by hand
///
/// ```
/// use tick_dex::external::{ManualPriceProvider, PriceProvider};
///
/// let provider = ManualPriceProvider::new(100);
/// assert!(provider.is_valid());
/// provider.invalidate();
/// assert!(!provider.is_valid());
/// provider.set_price(120);
/// assert_eq!(provider.get_price(), 120);
/// assert!(provider.is_valid());
/// ```
#[derive(Debug, Default)]
pub struct ManualPriceProvider {
    state: Mutex<(Price, bool)>,
}

impl ManualPriceProvider {
    pub fn new(price: Price) -> Self {
        Self {
            state: Mutex::new((price, true)),
        }
    }

    /// Set a new price and mark the reading valid
    pub fn set_price(&self, price: Price) {
        if let Ok(mut state) = self.state.lock() {
            *state = (price, true);
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.1 = false;
        }
    }
}

impl PriceProvider for ManualPriceProvider {
    fn is_valid(&self) -> bool {
        self.state.lock().map(|state| state.1).unwrap_or(false)
    }

    fn get_price(&self) -> Price {
        self.state.lock().map(|state| state.0).unwrap_or(0)
    }
}

/// Provider that never has a usable reading
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPriceProvider;

impl PriceProvider for NoPriceProvider {
    fn is_valid(&self) -> bool {
        false
    }

    fn get_price(&self) -> Price {
        0
    }
}
