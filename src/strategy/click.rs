//! Randomized attack clicking

use super::{Strategy, StrategyContext, TickResult};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Each step of `n` adds this much to the per-tick click probability
const ODDS_PER_STEP: f64 = 0.05;
/// Per-tick jitter applied to the click probability
const ODDS_JITTER: f64 = 0.05;
const MIN_TICKS: u32 = 4;

/// Presses attack on a random subset of ticks, then aborts
pub struct ClickStrategy {
    odds: f64,
    ticks: u32,
    max_ticks: u32,
    clicks: u32,
    rng: ChaCha8Rng,
}

impl ClickStrategy {
    /// `n` in 1..=15 sets the click probability to `n * 0.05`
    pub fn new(n: u32, max_ticks: u32) -> Self {
        Self::with_rng(n, max_ticks, ChaCha8Rng::from_entropy())
    }

    pub fn seeded(n: u32, max_ticks: u32, seed: u64) -> Self {
        Self::with_rng(n, max_ticks, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(n: u32, max_ticks: u32, rng: ChaCha8Rng) -> Self {
        let odds = n.clamp(1, 15) as f64 * ODDS_PER_STEP;
        tracing::debug!(odds, "Click odds");
        Self {
            odds,
            ticks: 0,
            max_ticks: max_ticks.max(MIN_TICKS),
            clicks: 0,
            rng,
        }
    }

    pub fn odds(&self) -> f64 {
        self.odds
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }
}

impl Strategy for ClickStrategy {
    fn tick(&mut self, ctx: &mut StrategyContext<'_>) -> TickResult {
        if self.ticks >= self.max_ticks {
            ctx.effector.attack = false;
            return TickResult::Abort;
        }
        self.ticks += 1;

        let jitter = self.rng.gen_range(-ODDS_JITTER..=ODDS_JITTER);
        let roll: f64 = self.rng.gen();
        let click = self.odds + jitter >= roll;
        ctx.effector.attack = click;
        if click {
            self.clicks += 1;
        }
        TickResult::Handled
    }

    fn deactivate(&mut self, ctx: &mut StrategyContext<'_>) {
        ctx.effector.attack = false;
    }

    fn describe(&self) -> String {
        format!("Clicking ({}/{})", self.ticks, self.max_ticks)
    }
}
