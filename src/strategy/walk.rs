//! Walking to a point on the ground plane

use super::task::{Task, TaskStrategy};
use super::{Strategy, StrategyContext, TickResult};
use crate::core::types::{normalize_degrees, Rotation, Vec3};

/// Squared horizontal distance under which the target counts as reached
const ARRIVAL_DISTANCE_SQ: f64 = 0.15;

/// Turn towards (x, z) and hold forward until close enough
#[derive(Debug, Clone)]
pub struct WalkTask {
    pub x: f64,
    pub z: f64,
    pub jump: bool,
}

impl WalkTask {
    fn offset(&self, ctx: &StrategyContext<'_>) -> Option<Vec3> {
        let avatar = ctx.world.avatar()?;
        Some(Vec3::new(self.x - avatar.position.x, 0.0, self.z - avatar.position.z))
    }
}

impl Task for WalkTask {
    fn is_finished(&self, ctx: &StrategyContext<'_>) -> bool {
        self.offset(ctx)
            .map_or(true, |d| d.x * d.x + d.z * d.z < ARRIVAL_DISTANCE_SQ)
    }

    fn run_tick(&mut self, ctx: &mut StrategyContext<'_>) {
        let Some(avatar) = ctx.world.avatar() else {
            return;
        };
        let Some(offset) = self.offset(ctx) else {
            return;
        };
        let bearing = Rotation::bearing(offset);
        let turn = normalize_degrees(bearing.yaw as f64 - avatar.rotation.yaw as f64);

        let effector = &mut *ctx.effector;
        effector.begin_cycle();
        effector.forward = true;
        effector.jump = self.jump;
        if turn.abs() > f64::EPSILON {
            effector.set_look(turn as f32, 0.0);
        }
    }

    fn describe(&self) -> String {
        format!("walking to {:.1}, {:.1}", self.x, self.z)
    }
}

/// Walk strategy: a single [`WalkTask`], aborted on arrival
pub struct WalkStrategy {
    inner: TaskStrategy,
}

impl WalkStrategy {
    pub fn new(x: f64, z: f64, jump: bool) -> Self {
        Self {
            inner: TaskStrategy::new("Walk").with_task(Box::new(WalkTask { x, z, jump })),
        }
    }
}

impl Strategy for WalkStrategy {
    fn tick(&mut self, ctx: &mut StrategyContext<'_>) -> TickResult {
        match self.inner.tick(ctx) {
            TickResult::NoMoreWork => TickResult::Abort,
            other => other,
        }
    }

    fn deactivate(&mut self, ctx: &mut StrategyContext<'_>) {
        self.inner.deactivate(ctx);
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}
