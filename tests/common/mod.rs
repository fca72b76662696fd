//! Shared fixtures for integration tests

#![allow(dead_code)]

use cambium_agent::core::error::{AgentError, Result};
use cambium_agent::core::types::{EntityId, Rotation, Vec3};
use cambium_agent::host::{EntityKind, EntityView, ScriptedWorld};
use cambium_agent::reward::RewardEvent;
use cambium_agent::service::client::{DecisionService, TelemetrySink};
use cambium_agent::service::spaces::{ActionSpaceConfig, ObservationSpaceConfig};
use cambium_agent::service::wire::{ModelSelection, PredictRequest, PredictResponse, RewardBatch};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Decision service answering from a script of response bodies.
///
/// `None` entries fail the call. When the script runs out, `fallback` is used.
pub struct FakePolicy {
    script: Mutex<VecDeque<Option<String>>>,
    fallback: Option<String>,
    pub model: ModelSelection,
    pub requests: Mutex<Vec<(String, serde_json::Value)>>,
    space_loads: AtomicUsize,
}

impl FakePolicy {
    pub fn new(script: Vec<Option<&str>>, fallback: Option<&str>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().map(|s| s.map(str::to_owned)).collect()),
            fallback: fallback.map(str::to_owned),
            model: ModelSelection::default(),
            requests: Mutex::new(Vec::new()),
            space_loads: AtomicUsize::new(0),
        }
    }

    pub fn always(body: &str) -> Self {
        Self::new(Vec::new(), Some(body))
    }

    pub fn offline() -> Self {
        Self::new(Vec::new(), None)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Times the action space was fetched
    pub fn space_loads(&self) -> usize {
        self.space_loads.load(Ordering::SeqCst)
    }
}

impl DecisionService for FakePolicy {
    fn predict(&self, model: &str, request: &PredictRequest<'_>) -> Result<PredictResponse> {
        let body = serde_json::to_value(request)?;
        self.requests.lock().unwrap().push((model.to_string(), body));
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            Some(body) => PredictResponse::parse(&body),
            None => Err(AgentError::RemoteStatus {
                endpoint: format!("/predict-action/{}", model),
                status: 503,
                body: "unavailable".into(),
            }),
        }
    }

    fn action_space(&self) -> Result<ActionSpaceConfig> {
        self.space_loads.fetch_add(1, Ordering::SeqCst);
        Ok(ActionSpaceConfig::default())
    }

    fn observation_space(&self) -> Result<ObservationSpaceConfig> {
        Ok(ObservationSpaceConfig::default())
    }

    fn model(&self) -> Result<ModelSelection> {
        Ok(self.model.clone())
    }
}

/// Telemetry sink that keeps every batch
#[derive(Default)]
pub struct RecordingSink {
    pub batches: Mutex<Vec<(String, Vec<RewardEvent>, serde_json::Value)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<RewardEvent> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, events, _)| events.clone())
            .collect()
    }
}

impl TelemetrySink for RecordingSink {
    fn add_reward(&self, batch: &RewardBatch<'_>) -> Result<()> {
        let state = serde_json::to_value(batch.current_state)?;
        self.batches.lock().unwrap().push((
            batch.bot_name.to_string(),
            batch.events.to_vec(),
            state,
        ));
        Ok(())
    }
}

pub fn arena() -> ScriptedWorld {
    ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::default())
}

pub fn mob(id: u32, name: &str, kind: EntityKind, position: Vec3) -> EntityView {
    EntityView {
        id: EntityId(id),
        name: name.into(),
        kind,
        position,
        velocity: Vec3::default(),
        rotation: Rotation::default(),
        health: 20.0,
        max_health: 20.0,
        armor: 0,
        held_weapon_damage: None,
    }
}
