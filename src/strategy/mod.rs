//! Behavior strategies and the scheduler that runs them
//!
//! A strategy is a small state machine ticked once per frame. It reads the
//! world through the context, writes the shared [`EffectorState`], and reports
//! through [`TickResult`] whether it wants more time this frame, is done for
//! this frame, or is finished for good.

pub mod click;
pub mod pvp;
pub mod rl_controller;
pub mod scheduler;
pub mod task;
pub mod walk;

pub use click::ClickStrategy;
pub use pvp::PvpStrategy;
pub use rl_controller::RlControllerStrategy;
pub use scheduler::{DescriptionHandle, Scheduler, StrategyFactory};
pub use task::{Task, TaskStrategy};
pub use walk::{WalkStrategy, WalkTask};

use crate::core::types::Millis;
use crate::effector::EffectorState;
use crate::host::WorldSensor;

/// Outcome of one strategy tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Done for this frame
    Handled,
    /// Tick again within the same frame
    Again,
    /// Stop and remove the strategy
    Abort,
    /// Nothing left to do; remove the strategy
    NoMoreWork,
}

impl TickResult {
    pub fn is_terminal(self) -> bool {
        matches!(self, TickResult::Abort | TickResult::NoMoreWork)
    }
}

/// What a strategy sees during one call
pub struct StrategyContext<'a> {
    pub world: &'a dyn WorldSensor,
    pub effector: &'a mut EffectorState,
    pub now_ms: Millis,
    resume_requested: bool,
}

impl<'a> StrategyContext<'a> {
    pub fn new(world: &'a dyn WorldSensor, effector: &'a mut EffectorState, now_ms: Millis) -> Self {
        Self {
            world,
            effector,
            now_ms,
            resume_requested: false,
        }
    }

    /// Ask the scheduler to bring back the most recently suspended strategy
    pub fn request_resume(&mut self) {
        self.resume_requested = true;
    }

    pub fn resume_requested(&self) -> bool {
        self.resume_requested
    }
}

/// A behavior driven by the [`Scheduler`]
pub trait Strategy {
    /// Called once before the first tick, and again after a resume
    fn activate(&mut self, _ctx: &mut StrategyContext<'_>) {}

    fn tick(&mut self, ctx: &mut StrategyContext<'_>) -> TickResult;

    /// Called once when the strategy is removed or suspended
    fn deactivate(&mut self, _ctx: &mut StrategyContext<'_>) {}

    /// One-line human readable status
    fn describe(&self) -> String;
}
