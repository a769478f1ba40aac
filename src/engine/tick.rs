//! Tick stage and scheduling for one pair.
//!
//! ```text
//! ReceivingOrders ──match call at/after next_tick_block──▶ RunningSimulation
//!        ▲                                                         │
//!        │                                                         ▼
//! MovingPendingOrders ◀────────────────────────────────── RunningMatching
//! ```

use crate::config::TickConfig;
use crate::error::{DexError, DexResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TickStage {
    /// Resting state; orders go straight into the main book
    #[default]
    ReceivingOrders,
    /// Computing the emergent price
    RunningSimulation,
    /// Settling matches at the emergent price
    RunningMatching,
    /// Merging the pending queue into the main book
    MovingPendingOrders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickState {
    pub stage: TickStage,

    /// Number of the current (or next) tick, starting at 1
    pub number: u64,

    /// First block at which a new tick may start
    pub next_tick_block: u64,

    /// Block at which the previous tick ended (or the pair was listed)
    pub last_tick_block: u64,
}

impl TickState {
    /// State of a pair listed at `block`
    pub fn new(block: u64, config: &TickConfig) -> Self {
        Self {
            stage: TickStage::ReceivingOrders,
            number: 1,
            next_tick_block: block.saturating_add(config.max_blocks_for_tick),
            last_tick_block: block,
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.stage != TickStage::ReceivingOrders
    }

    /// Reject structural changes while a tick is in flight
    pub fn ensure_idle(&self) -> DexResult<()> {
        if self.is_running() {
            return Err(DexError::TickIsRunning);
        }
        Ok(())
    }

    /// Enter `RunningSimulation` if the schedule allows it
    pub fn begin(&mut self, block: u64) -> DexResult<()> {
        self.ensure_idle()?;
        if block < self.next_tick_block {
            return Err(DexError::NextTickNotReached {
                current: block,
                next: self.next_tick_block,
            });
        }
        self.stage = TickStage::RunningSimulation;
        Ok(())
    }

    /// Close the tick at `block` and schedule the next one `blocks` later
    pub fn finish(&mut self, block: u64, blocks: u64) {
        self.number += 1;
        self.last_tick_block = block;
        self.next_tick_block = block.saturating_add(blocks);
        self.stage = TickStage::ReceivingOrders;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pair_schedule() {
        let state = TickState::new(100, &TickConfig::default());
        assert_eq!(state.number, 1);
        assert_eq!(state.next_tick_block, 112);
        assert_eq!(state.last_tick_block, 100);
        assert!(!state.is_running());
    }

    #[test]
    fn test_begin_requires_next_tick_block() {
        let mut state = TickState::new(100, &TickConfig::default());
        assert_eq!(
            state.begin(111),
            Err(DexError::NextTickNotReached { current: 111, next: 112 })
        );
        assert!(state.begin(112).is_ok());
        assert_eq!(state.stage, TickStage::RunningSimulation);
        assert_eq!(state.begin(113), Err(DexError::TickIsRunning));
    }

    #[test]
    fn test_finish_schedules_next_tick() {
        let mut state = TickState::new(0, &TickConfig::default());
        state.begin(12).unwrap();
        state.finish(15, 6);
        assert_eq!(state.number, 2);
        assert_eq!(state.last_tick_block, 15);
        assert_eq!(state.next_tick_block, 21);
        assert!(state.ensure_idle().is_ok());
    }
}
