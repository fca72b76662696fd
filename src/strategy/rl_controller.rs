//! Policy-driven control loop
//!
//! Each tick assembles an observation, asks the decision service for an
//! action, and writes it to the effector. Spaces and model route are fetched
//! from the service on activation; any of them that cannot be fetched falls
//! back to the local default.

use super::{Strategy, StrategyContext, TickResult};
use crate::bridge::{CycleOutcome, DecisionBridge};
use crate::core::config::{GovernorConfig, ScanConfig, ServiceConfig};
use crate::governor::RateEstimate;
use crate::observation::ObservationAssembler;
use crate::service::client::DecisionService;
use crate::service::spaces::{ActionSpaceConfig, ObservationSpaceConfig};
use std::sync::Arc;

pub struct RlControllerStrategy {
    service: Arc<dyn DecisionService>,
    bot_name: String,
    default_model: String,
    scan: ScanConfig,
    governor: GovernorConfig,
    /// Skip the remote space/model lookup and use these instead
    fixed: Option<(ActionSpaceConfig, ObservationSpaceConfig)>,
    assembler: ObservationAssembler,
    bridge: Option<DecisionBridge>,
    cycles: u64,
    skipped: u64,
}

impl RlControllerStrategy {
    pub fn new(
        service: Arc<dyn DecisionService>,
        service_config: &ServiceConfig,
        scan: ScanConfig,
        governor: GovernorConfig,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            service,
            bot_name: bot_name.into(),
            default_model: service_config.model_version.clone(),
            assembler: ObservationAssembler::new(ObservationSpaceConfig::default(), scan.clone()),
            scan,
            governor,
            fixed: None,
            bridge: None,
            cycles: 0,
            skipped: 0,
        }
    }

    /// Use the given spaces and the default model instead of asking the service
    pub fn with_spaces(mut self, action: ActionSpaceConfig, observation: ObservationSpaceConfig) -> Self {
        self.fixed = Some((action, observation));
        self
    }

    pub fn model(&self) -> &str {
        self.bridge
            .as_ref()
            .map_or(self.default_model.as_str(), |b| b.model())
    }

    pub fn last_estimate(&self) -> Option<RateEstimate> {
        self.bridge.as_ref().and_then(|b| b.governor().last_estimate())
    }

    /// (applied, skipped) cycle counts
    pub fn cycle_counts(&self) -> (u64, u64) {
        (self.cycles, self.skipped)
    }

    fn load_remote(&self) -> (ActionSpaceConfig, ObservationSpaceConfig, String) {
        let action = self.service.action_space().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load action space, using defaults");
            ActionSpaceConfig::default()
        });
        let observation = self.service.observation_space().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not load observation space, using defaults");
            ObservationSpaceConfig::default()
        });
        let model = match self.service.model() {
            Ok(selection) => selection
                .route()
                .map(str::to_owned)
                .unwrap_or_else(|| self.default_model.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load model route, using default");
                self.default_model.clone()
            }
        };
        (action, observation, model)
    }

    fn configure(&mut self) {
        let (action, observation, model) = match &self.fixed {
            Some((action, observation)) => {
                (action.clone(), observation.clone(), self.default_model.clone())
            }
            None => self.load_remote(),
        };
        tracing::info!(
            model = %model,
            action_size = action.action_space_size(),
            observation_size = observation.observation_space_size(),
            "RL controller configured"
        );
        self.assembler = ObservationAssembler::new(observation, self.scan.clone());
        self.bridge = Some(DecisionBridge::new(
            self.service.clone(),
            model,
            action,
            self.bot_name.clone(),
            self.governor.clone(),
        ));
    }
}

impl Strategy for RlControllerStrategy {
    fn activate(&mut self, _ctx: &mut StrategyContext<'_>) {
        // Spaces stay fixed for the strategy's lifetime, including across a resume
        if self.bridge.is_none() {
            self.configure();
        }
    }

    fn tick(&mut self, ctx: &mut StrategyContext<'_>) -> TickResult {
        if self.bridge.is_none() {
            self.configure();
        }
        let Some(observation) = self.assembler.assemble(ctx.world) else {
            return TickResult::Handled;
        };
        let Some(bridge) = self.bridge.as_mut() else {
            return TickResult::Handled;
        };
        match bridge.cycle(&observation, ctx.effector, ctx.now_ms) {
            CycleOutcome::Applied(_) => self.cycles += 1,
            CycleOutcome::Skipped => self.skipped += 1,
        }
        TickResult::Handled
    }

    fn deactivate(&mut self, ctx: &mut StrategyContext<'_>) {
        ctx.effector.begin_cycle();
    }

    fn describe(&self) -> String {
        format!("RL Controller - Model: {}", self.model())
    }
}
