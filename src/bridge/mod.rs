//! Decision Bridge
//!
//! One synchronous round trip per scheduled tick: observation out, action in,
//! action written to the effector. A failed round trip skips the cycle and
//! leaves the effector exactly as it was.

use crate::core::config::GovernorConfig;
use crate::core::types::Millis;
use crate::effector::EffectorState;
use crate::governor::{RateEstimate, TickRateGovernor};
use crate::observation::Observation;
use crate::service::client::DecisionService;
use crate::service::spaces::ActionSpaceConfig;
use crate::service::wire::{ActionCommand, PredictRequest};
use std::sync::Arc;

/// Result of one decision cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// Action applied; carries the governor estimate if the policy sent a rate
    Applied(Option<RateEstimate>),
    /// Round trip failed, effector untouched
    Skipped,
}

/// Write the fields present in `command` into a freshly reset effector.
///
/// Channels disabled in `space` are ignored.
pub fn apply_command(command: &ActionCommand, space: &ActionSpaceConfig, effector: &mut EffectorState) {
    effector.begin_cycle();

    if space.enable_movement {
        if let Some(bin) = command.movement {
            if !effector.apply_movement_bin(bin) {
                tracing::debug!(bin, "Movement bin out of range, releasing movement");
            }
        }
    }
    if space.enable_jump {
        effector.jump = command.jump.unwrap_or(false);
    }
    if space.enable_sneak {
        effector.sneak = command.sneak.unwrap_or(false);
    }
    if space.enable_sprint {
        effector.sprint = command.sprint.unwrap_or(false);
    }
    if space.enable_attack {
        effector.attack = command.attack.unwrap_or(false);
    }
    if space.enable_use_item {
        effector.use_item = command.use_item.unwrap_or(false);
    }
    if space.enable_hotbar {
        if let Some(slot) = command.hotbar {
            if !effector.apply_hotbar(slot) {
                tracing::debug!(slot, "Hotbar index out of range");
            }
        }
    }
    if space.enable_look && (command.yaw.is_some() || command.pitch.is_some()) {
        effector.set_look(command.yaw.unwrap_or(0.0), command.pitch.unwrap_or(0.0));
    }
}

pub struct DecisionBridge {
    service: Arc<dyn DecisionService>,
    model: String,
    action_space: ActionSpaceConfig,
    bot_name: String,
    governor: TickRateGovernor,
    failures: u64,
}

impl DecisionBridge {
    pub fn new(
        service: Arc<dyn DecisionService>,
        model: impl Into<String>,
        action_space: ActionSpaceConfig,
        bot_name: impl Into<String>,
        governor: GovernorConfig,
    ) -> Self {
        Self {
            service,
            model: model.into(),
            action_space,
            bot_name: bot_name.into(),
            governor: TickRateGovernor::new(governor),
            failures: 0,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn action_space(&self) -> &ActionSpaceConfig {
        &self.action_space
    }

    pub fn governor(&self) -> &TickRateGovernor {
        &self.governor
    }

    pub fn governor_mut(&mut self) -> &mut TickRateGovernor {
        &mut self.governor
    }

    /// Consecutive failed cycles
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn cycle(
        &mut self,
        observation: &Observation,
        effector: &mut EffectorState,
        now_ms: Millis,
    ) -> CycleOutcome {
        let request = PredictRequest {
            observation,
            action_space: &self.action_space,
            bot_name: &self.bot_name,
        };

        let response = match self.service.predict(&self.model, &request) {
            Ok(response) => response,
            Err(e) => {
                self.failures += 1;
                tracing::warn!(error = %e, model = %self.model, failures = self.failures, "Decision cycle skipped");
                return CycleOutcome::Skipped;
            }
        };
        self.failures = 0;

        if !response.rejected.is_empty() {
            tracing::warn!(fields = ?response.rejected, "Ignored wrong-typed response fields");
        }
        apply_command(&response.action, &self.action_space, effector);

        let estimate = response
            .tick_rate
            .and_then(|rate| self.governor.record(now_ms, rate));
        CycleOutcome::Applied(estimate)
    }
}
