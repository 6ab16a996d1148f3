//! Synthetic progress schedule.
//!
//! Each stage starts at a fixed value. While a stage waits on its provider,
//! idle ticks advance the value but never reach the next stage's start.

use std::time::Duration;

use crate::config::PipelineConfig;

pub const BALANCES_START: u8 = 0;
pub const CONTRACT_INFO_START: u8 = 40;
pub const SCORE_START: u8 = 70;
pub const COMPLETE: u8 = 100;

/// Idle tick settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTicker {
    pub interval: Option<Duration>,
    pub step: u8,
}

impl ProgressTicker {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            interval: (config.progress_tick_ms > 0)
                .then(|| Duration::from_millis(config.progress_tick_ms)),
            step: config.progress_tick_step,
        }
    }

    /// Progress after one tick from `current`, staying below `ceiling`.
    /// `None` when the value would not move.
    pub fn advance(&self, current: u8, ceiling: u8) -> Option<u8> {
        let cap = ceiling.saturating_sub(1);
        let next = current.saturating_add(self.step).min(cap);
        (next > current).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_caps_below_next_stage() {
        let ticker = ProgressTicker { interval: Some(Duration::from_millis(10)), step: 15 };
        assert_eq!(ticker.advance(0, CONTRACT_INFO_START), Some(15));
        assert_eq!(ticker.advance(30, CONTRACT_INFO_START), Some(39));
        assert_eq!(ticker.advance(39, CONTRACT_INFO_START), None);
        assert_eq!(ticker.advance(90, COMPLETE), Some(99));
    }

    #[test]
    fn test_zero_interval_disables_ticks() {
        let config = PipelineConfig { progress_tick_ms: 0, ..PipelineConfig::default() };
        assert!(ProgressTicker::from_config(&config).interval.is_none());
        let stalled = ProgressTicker { interval: None, step: 0 };
        assert_eq!(stalled.advance(5, CONTRACT_INFO_START), None);
    }
}
