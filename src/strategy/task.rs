//! Task-composed strategies

use super::{Strategy, StrategyContext, TickResult};
use std::collections::VecDeque;

/// A step of a [`TaskStrategy`]
pub trait Task {
    fn is_finished(&self, ctx: &StrategyContext<'_>) -> bool;

    fn run_tick(&mut self, ctx: &mut StrategyContext<'_>);

    fn describe(&self) -> String {
        String::from("task")
    }
}

/// Runs its tasks one after another, finishing when the queue is empty
pub struct TaskStrategy {
    name: String,
    tasks: VecDeque<Box<dyn Task>>,
}

impl TaskStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: VecDeque::new(),
        }
    }

    pub fn with_task(mut self, task: Box<dyn Task>) -> Self {
        self.tasks.push_back(task);
        self
    }

    pub fn push(&mut self, task: Box<dyn Task>) {
        self.tasks.push_back(task);
    }

    pub fn remaining(&self) -> usize {
        self.tasks.len()
    }
}

impl Strategy for TaskStrategy {
    fn tick(&mut self, ctx: &mut StrategyContext<'_>) -> TickResult {
        while let Some(task) = self.tasks.front() {
            if !task.is_finished(ctx) {
                break;
            }
            self.tasks.pop_front();
        }
        match self.tasks.front_mut() {
            Some(task) => {
                task.run_tick(ctx);
                TickResult::Handled
            }
            None => TickResult::NoMoreWork,
        }
    }

    fn deactivate(&mut self, ctx: &mut StrategyContext<'_>) {
        ctx.effector.begin_cycle();
    }

    fn describe(&self) -> String {
        match self.tasks.front() {
            Some(task) => format!("{}: {}", self.name, task.describe()),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Rotation, Vec3};
    use crate::effector::EffectorState;
    use crate::host::ScriptedWorld;

    /// Presses jump for a fixed number of ticks
    struct Hop {
        left: u32,
    }

    impl Task for Hop {
        fn is_finished(&self, _ctx: &StrategyContext<'_>) -> bool {
            self.left == 0
        }

        fn run_tick(&mut self, ctx: &mut StrategyContext<'_>) {
            ctx.effector.jump = true;
            self.left -= 1;
        }
    }

    #[test]
    fn test_tasks_run_in_order_until_exhausted() {
        let world = ScriptedWorld::with_avatar(Vec3::default(), Rotation::default());
        let mut effector = EffectorState::new();
        let mut strategy = TaskStrategy::new("hops")
            .with_task(Box::new(Hop { left: 2 }))
            .with_task(Box::new(Hop { left: 1 }));

        let mut results = Vec::new();
        for t in 0..5 {
            let mut ctx = StrategyContext::new(&world, &mut effector, t);
            results.push(strategy.tick(&mut ctx));
        }
        assert_eq!(
            results,
            vec![
                TickResult::Handled,
                TickResult::Handled,
                TickResult::Handled,
                TickResult::NoMoreWork,
                TickResult::NoMoreWork,
            ]
        );
        assert!(effector.jump);
        assert_eq!(strategy.remaining(), 0);
    }
}
