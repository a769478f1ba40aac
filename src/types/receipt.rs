//! Tick receipt summarizing one completed batch auction.
//!
//! The receipt is produced when a pair returns to `ReceivingOrders` and
//! carries a state root over the pair's resting orders for verification.

use ssz_rs::prelude::*;
use sha2::{Digest, Sha256};

/// Receipt for a finished tick.
///
/// ## State Root
///
/// The 32-byte state root is a SHA-256 hash of the SSZ encoding of every
/// order still in the pair's main lists, in list order. Two replicas that
/// processed the same calls produce the same root.
///
/// ## Example
///
/// ```
/// use tick_dex::types::TickReceipt;
///
/// let receipt = TickReceipt {
///     base_token: 1,
///     secondary_token: 2,
///     tick_number: 1,
///     matches_executed: 0,
///     closing_price: 0,
///     next_tick_block: 112,
///     state_root: TickReceipt::compute_hash(b""),
/// };
/// assert!(receipt.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct TickReceipt {
    pub base_token: u64,
    pub secondary_token: u64,

    /// Number of the tick that just ended
    pub tick_number: u64,

    /// Matches settled during the tick
    pub matches_executed: u64,

    /// Emergent price of the tick, or zero without matches
    pub closing_price: u128,

    /// First block at which the next tick may start
    pub next_tick_block: u64,

    /// SHA-256 over the resting orders after the tick
    pub state_root: [u8; 32],
}

impl TickReceipt {
    /// Compute SHA-256 hash of the given data
    pub fn compute_hash(data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        hash
    }

    /// Get the state root as a hex string
    pub fn state_root_hex(&self) -> String {
        hex::encode(self.state_root)
    }

    /// True when the tick closed without any match
    pub fn is_empty(&self) -> bool {
        self.matches_executed == 0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
