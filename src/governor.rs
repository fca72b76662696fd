//! Tick-Rate Governor
//!
//! Estimates how fast the decision loop actually runs from the spacing of
//! recent successful cycles, and compares it with the rate the policy asks for.
//! The estimate is advisory: it is handed to an optional [`PacingHook`] and
//! kept for inspection, nothing is throttled here.

use crate::core::config::GovernorConfig;
use crate::core::types::Millis;
use std::collections::VecDeque;

/// Sliding FIFO of the most recent tick timestamps
#[derive(Debug, Clone)]
pub struct TickTimingWindow {
    capacity: usize,
    stamps: VecDeque<Millis>,
}

impl TickTimingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(2),
            stamps: VecDeque::with_capacity(capacity.max(2)),
        }
    }

    /// Record a tick, evicting the oldest one when full
    pub fn push(&mut self, now_ms: Millis) {
        if self.stamps.len() == self.capacity {
            self.stamps.pop_front();
        }
        self.stamps.push_back(now_ms);
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Consecutive inter-arrival intervals, sorted ascending
    pub fn sorted_intervals(&self) -> Vec<Millis> {
        let mut intervals: Vec<Millis> = self
            .stamps
            .iter()
            .zip(self.stamps.iter().skip(1))
            .map(|(a, b)| b.saturating_sub(*a))
            .collect();
        intervals.sort_unstable();
        intervals
    }
}

/// Element at index `floor(p * len)` of a sorted slice, clamped to the last
pub fn percentile(sorted: &[Millis], p: f64) -> Option<Millis> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Outcome of one re-estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateEstimate {
    /// Rate requested by the policy (ticks per second)
    pub target_rate: f64,
    /// Fraction of the target the loop should aim for
    pub desired_rate: f64,
    /// Percentile inter-arrival interval
    pub interval_ms: Millis,
    /// Rate implied by `interval_ms`
    pub observed_rate: f64,
}

/// Receives every new estimate
pub trait PacingHook {
    fn on_estimate(&mut self, estimate: &RateEstimate);
}

pub struct TickRateGovernor {
    config: GovernorConfig,
    window: TickTimingWindow,
    hook: Option<Box<dyn PacingHook>>,
    last_estimate: Option<RateEstimate>,
}

impl TickRateGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        let window = TickTimingWindow::new(config.window);
        Self {
            config,
            window,
            hook: None,
            last_estimate: None,
        }
    }

    pub fn set_hook(&mut self, hook: Box<dyn PacingHook>) {
        self.hook = Some(hook);
    }

    pub fn window(&self) -> &TickTimingWindow {
        &self.window
    }

    pub fn last_estimate(&self) -> Option<RateEstimate> {
        self.last_estimate
    }

    /// Record a successful cycle that carried `target_rate`
    pub fn record(&mut self, now_ms: Millis, target_rate: f64) -> Option<RateEstimate> {
        self.window.push(now_ms);
        let intervals = self.window.sorted_intervals();
        let interval_ms = percentile(&intervals, self.config.percentile)?.max(1);

        let estimate = RateEstimate {
            target_rate,
            desired_rate: target_rate * self.config.target_fraction,
            interval_ms,
            observed_rate: 1000.0 / interval_ms as f64,
        };
        tracing::debug!(
            target = estimate.target_rate,
            desired = estimate.desired_rate,
            observed = estimate.observed_rate,
            interval_ms,
            "Tick rate estimate"
        );
        if let Some(hook) = self.hook.as_mut() {
            hook.on_estimate(&estimate);
        }
        self.last_estimate = Some(estimate);
        Some(estimate)
    }
}
