//! Top-level wiring
//!
//! An [`Agent`] owns one scheduler, one reward detector and the effector state
//! they share. The host constructs it explicitly and calls
//! [`Agent::on_host_tick`] once per frame; host events are forwarded through
//! the `on_*` methods.

use crate::core::config::AgentConfig;
use crate::core::types::Millis;
use crate::effector::EffectorState;
use crate::host::{Actuator, EntityView, HostTick, TickPhase, WorldSensor};
use crate::reward::RewardDetector;
use crate::service::client::{DecisionService, TelemetrySink};
use crate::strategy::{DescriptionHandle, RlControllerStrategy, Scheduler, Strategy};
use std::sync::Arc;

pub struct Agent {
    config: AgentConfig,
    scheduler: Scheduler,
    detector: RewardDetector,
    telemetry: Option<Arc<dyn TelemetrySink>>,
    effector: EffectorState,
    applied_revision: u64,
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            scheduler: Scheduler::new(config.scheduler.clone()),
            detector: RewardDetector::new(config.reward.clone()),
            telemetry: None,
            effector: EffectorState::new(),
            applied_revision: 0,
            config,
        }
    }

    /// Send reward events to `sink`; without one they are discarded
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    pub fn detector(&self) -> &RewardDetector {
        &self.detector
    }

    pub fn effector(&self) -> &EffectorState {
        &self.effector
    }

    pub fn description(&self) -> DescriptionHandle {
        self.scheduler.description()
    }

    pub fn request(&mut self, strategy: Box<dyn Strategy>) {
        self.scheduler.request(strategy);
    }

    /// Build a policy-driven strategy bound to this agent's configuration
    pub fn rl_controller(&self, service: Arc<dyn DecisionService>, bot_name: &str) -> RlControllerStrategy {
        RlControllerStrategy::new(
            service,
            &self.config.service,
            self.config.scan.clone(),
            self.config.governor.clone(),
            bot_name,
        )
    }

    /// Name reported to the services: the avatar's, or the configured fallback
    pub fn bot_name(&self, world: &dyn WorldSensor) -> String {
        world
            .avatar()
            .map(|a| a.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.config.service.bot_name.clone())
    }

    pub fn on_host_tick(
        &mut self,
        frame: &HostTick,
        world: &dyn WorldSensor,
        actuator: &mut dyn Actuator,
    ) {
        if frame.phase != TickPhase::Start {
            return;
        }
        if world.avatar().is_none() {
            return;
        }

        self.scheduler.tick(frame, world, &mut self.effector);
        if self.scheduler.active_count() == 0 {
            // Nobody drives the controls; release them
            self.effector.begin_cycle();
        }

        self.detector.poll(world, frame.now_ms);
        match &self.telemetry {
            Some(sink) => {
                let bot_name = self.bot_name(world);
                self.detector.flush(sink.as_ref(), world, &bot_name);
            }
            None => {
                self.detector.drain();
            }
        }

        self.applied_revision = self.effector.apply(actuator, self.applied_revision);
    }

    /// Host reports the avatar lost `amount` health
    pub fn on_hurt(
        &mut self,
        world: &dyn WorldSensor,
        amount: f32,
        attacker: Option<&str>,
        now_ms: Millis,
    ) {
        if let Some(avatar) = world.avatar() {
            self.detector.on_hurt(&avatar, amount, attacker, now_ms);
        }
    }

    /// Host reports the avatar attacked `target`
    pub fn on_attack(&mut self, target: &EntityView, now_ms: Millis) {
        self.detector.on_attack(target, now_ms);
    }

    /// Host reports the avatar hit `target` for `amount`; `target` is the pre-hit view
    pub fn on_damage_dealt(&mut self, target: &EntityView, amount: f32, now_ms: Millis) {
        self.detector.on_damage_dealt(target, amount, now_ms);
    }

    /// Host reports the avatar died
    pub fn on_death(&mut self, now_ms: Millis) {
        tracing::info!("Avatar died, stopping strategies");
        self.detector.on_death(now_ms);
        self.scheduler.stop();
    }
}
