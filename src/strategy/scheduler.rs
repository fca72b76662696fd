//! Cooperative strategy scheduler
//!
//! Runs on the host's tick-start callback. Every active strategy gets one slot
//! per frame, in insertion order; a strategy answering `Again` is re-ticked
//! within the same frame up to `max_ticks_per_frame` times.

use super::{Strategy, StrategyContext, TickResult};
use crate::core::config::SchedulerConfig;
use crate::effector::EffectorState;
use crate::host::{HostTick, TickPhase, WorldSensor};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Builds a fresh strategy when its trigger key is pressed
pub type StrategyFactory = Box<dyn Fn() -> Box<dyn Strategy>>;

/// Read side of the published status text
#[derive(Debug, Clone, Default)]
pub struct DescriptionHandle {
    inner: Arc<Mutex<String>>,
}

impl DescriptionHandle {
    /// Status of every active strategy, one per line
    pub fn snapshot(&self) -> String {
        match self.inner.lock() {
            Ok(text) => text.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn publish(&self, text: String) {
        match self.inner.lock() {
            Ok(mut slot) => *slot = text,
            Err(poisoned) => *poisoned.into_inner() = text,
        }
    }
}

enum Request {
    Fresh(Box<dyn Strategy>),
    Interrupt(Box<dyn Strategy>),
    Resume,
}

struct ActiveStrategy {
    id: Uuid,
    strategy: Box<dyn Strategy>,
}

pub struct Scheduler {
    config: SchedulerConfig,
    active: Vec<ActiveStrategy>,
    requested: Option<Request>,
    /// Most recently suspended strategy
    resume: Option<Box<dyn Strategy>>,
    triggers: Vec<(String, StrategyFactory)>,
    stop_requested: bool,
    description: DescriptionHandle,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            active: Vec::new(),
            requested: None,
            resume: None,
            triggers: Vec::new(),
            stop_requested: false,
            description: DescriptionHandle::default(),
        }
    }

    /// Start `factory()` whenever `key` is pressed
    pub fn bind_trigger(&mut self, key: impl Into<String>, factory: StrategyFactory) {
        self.triggers.push((key.into(), factory));
    }

    /// Start `strategy` on the next frame. Forgets any suspended strategy.
    pub fn request(&mut self, strategy: Box<dyn Strategy>) {
        self.requested = Some(Request::Fresh(strategy));
    }

    /// Suspend the first active strategy and start `strategy` in its place
    pub fn interrupt(&mut self, strategy: Box<dyn Strategy>) {
        self.requested = Some(Request::Interrupt(strategy));
    }

    /// Stop everything on the next frame
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    pub fn description(&self) -> DescriptionHandle {
        self.description.clone()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_ids(&self) -> Vec<Uuid> {
        self.active.iter().map(|a| a.id).collect()
    }

    pub fn has_suspended(&self) -> bool {
        self.resume.is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty() && self.requested.is_none()
    }

    pub fn tick(&mut self, frame: &HostTick, world: &dyn WorldSensor, effector: &mut EffectorState) {
        if frame.phase != TickPhase::Start {
            return;
        }
        let Some(avatar) = world.avatar() else {
            return;
        };
        let mut ctx = StrategyContext::new(world, effector, frame.now_ms);

        let dead = avatar.health <= 0.0;
        if frame.stop_pressed || self.stop_requested || dead {
            self.stop_all(&mut ctx, dead);
            return;
        }

        if self.requested.is_none() {
            for key in &frame.pressed_triggers {
                if let Some((_, factory)) = self.triggers.iter().find(|(k, _)| k == key) {
                    tracing::debug!(key = %key, "Trigger pressed");
                    self.requested = Some(Request::Fresh(factory()));
                    break;
                }
            }
        }
        if let Some(request) = self.requested.take() {
            self.start(request, &mut ctx);
        }

        let mut idx = 0;
        while idx < self.active.len() {
            let result = self.tick_bounded(idx, &mut ctx);
            if result.is_terminal() {
                let mut finished = self.active.remove(idx);
                finished.strategy.deactivate(&mut ctx);
                tracing::info!(
                    id = %finished.id,
                    strategy = %finished.strategy.describe(),
                    ?result,
                    "Strategy finished"
                );
            } else {
                idx += 1;
            }
        }

        if ctx.resume_requested() && self.resume.is_some() {
            self.requested = Some(Request::Resume);
        }
        self.publish();
    }

    /// Tick one strategy until it stops answering `Again`, or the bound is hit
    fn tick_bounded(&mut self, idx: usize, ctx: &mut StrategyContext<'_>) -> TickResult {
        let entry = &mut self.active[idx];
        let mut result = TickResult::Again;
        for _ in 0..self.config.max_ticks_per_frame {
            result = entry.strategy.tick(ctx);
            if result != TickResult::Again {
                return result;
            }
        }
        tracing::warn!(
            id = %entry.id,
            limit = self.config.max_ticks_per_frame,
            "Strategy kept asking for another tick, deferring to next frame"
        );
        result
    }

    fn start(&mut self, request: Request, ctx: &mut StrategyContext<'_>) {
        let strategy = match request {
            Request::Fresh(strategy) => {
                self.resume = None;
                strategy
            }
            Request::Interrupt(strategy) => {
                if !self.active.is_empty() {
                    let mut suspended = self.active.remove(0);
                    suspended.strategy.deactivate(ctx);
                    tracing::info!(id = %suspended.id, "Strategy suspended");
                    self.resume = Some(suspended.strategy);
                }
                strategy
            }
            Request::Resume => match self.resume.take() {
                Some(strategy) => strategy,
                None => return,
            },
        };
        self.activate(strategy, ctx);
    }

    fn activate(&mut self, mut strategy: Box<dyn Strategy>, ctx: &mut StrategyContext<'_>) {
        strategy.activate(ctx);
        let id = Uuid::new_v4();
        tracing::info!(%id, strategy = %strategy.describe(), "Strategy activated");
        self.active.push(ActiveStrategy { id, strategy });
    }

    fn stop_all(&mut self, ctx: &mut StrategyContext<'_>, dead: bool) {
        if !self.active.is_empty() {
            tracing::info!(count = self.active.len(), dead, "Stopping all strategies");
        }
        for mut entry in self.active.drain(..) {
            entry.strategy.deactivate(ctx);
        }
        self.resume = None;
        self.requested = None;
        self.stop_requested = false;
        self.publish();
    }

    fn publish(&self) {
        let text = self
            .active
            .iter()
            .map(|a| a.strategy.describe())
            .collect::<Vec<_>>()
            .join("\n");
        self.description.publish(text);
    }
}
