//! Reward/Event Detector
//!
//! Watches the avatar and its surroundings for training signals and forwards
//! them, batched, to the telemetry service. Two sources feed the detector:
//! host callbacks (`on_hurt`, `on_attack`, `on_death`) and per-frame polling.
//! Both go through one [`CooldownGate`], so a hit reported by the host and
//! then seen again by polling is only emitted once.

pub mod aim;
pub mod cooldown;

pub use aim::{aim_score, AimError};
pub use cooldown::CooldownGate;

use crate::core::config::RewardConfig;
use crate::core::types::{EntityId, Millis, Vec3};
use crate::host::{AvatarState, EntityKind, EntityView, WorldSensor};
use crate::observation::PlayerState;
use crate::service::client::TelemetrySink;
use crate::service::spaces::ObservationSpaceConfig;
use crate::service::wire::RewardBatch;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Event kind, used as the cooldown key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardKind {
    DamageTaken,
    DamageDealt,
    GoodAim,
    Death,
}

/// One scored training signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardEvent {
    DamageTaken {
        /// Raw health lost
        amount: f32,
        /// `amount` relative to max health, capped at 1
        magnitude: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attacker: Option<String>,
    },
    DamageDealt {
        amount: f32,
        damage_percentage: f32,
        target: String,
    },
    GoodAim {
        /// Aim score in [0, 1]
        amount: f32,
        yaw_diff: f32,
        pitch_diff: f32,
        distance: f32,
    },
    Death,
}

fn normalized(amount: f32, max_health: f32) -> f32 {
    if max_health <= 0.0 {
        return 1.0;
    }
    (amount / max_health).clamp(0.0, 1.0)
}

impl RewardEvent {
    pub fn damage_taken(amount: f32, max_health: f32, attacker: Option<String>) -> Self {
        RewardEvent::DamageTaken {
            amount,
            magnitude: normalized(amount, max_health),
            attacker,
        }
    }

    pub fn damage_dealt(amount: f32, target_max_health: f32, target: impl Into<String>) -> Self {
        RewardEvent::DamageDealt {
            amount,
            damage_percentage: normalized(amount, target_max_health),
            target: target.into(),
        }
    }

    pub fn kind(&self) -> RewardKind {
        match self {
            RewardEvent::DamageTaken { .. } => RewardKind::DamageTaken,
            RewardEvent::DamageDealt { .. } => RewardKind::DamageDealt,
            RewardEvent::GoodAim { .. } => RewardKind::GoodAim,
            RewardEvent::Death => RewardKind::Death,
        }
    }

    /// Normalized strength in [0, 1]
    pub fn magnitude(&self) -> f32 {
        match self {
            RewardEvent::DamageTaken { magnitude, .. } => *magnitude,
            RewardEvent::DamageDealt {
                damage_percentage, ..
            } => *damage_percentage,
            RewardEvent::GoodAim { amount, .. } => *amount,
            RewardEvent::Death => 1.0,
        }
    }
}

/// State snapshot sent along with a batch of events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentState {
    pub player: PlayerState,
}

impl CurrentState {
    pub fn of(avatar: &AvatarState) -> Self {
        Self {
            player: crate::observation::sample_player(avatar, &ObservationSpaceConfig::default()),
        }
    }
}

#[derive(Debug, Clone)]
struct TrackedTarget {
    id: EntityId,
    name: String,
    last_health: f32,
}

pub struct RewardDetector {
    config: RewardConfig,
    gate: CooldownGate,
    pending: Vec<RewardEvent>,
    last_health: Option<f32>,
    target: Option<TrackedTarget>,
    attacking: bool,
    attack_started_ms: Option<Millis>,
    last_poll_ms: Option<Millis>,
    last_aim_ms: Option<Millis>,
    dead: bool,
}

impl RewardDetector {
    pub fn new(config: RewardConfig) -> Self {
        let gate = CooldownGate::new(config.cooldown_ms);
        Self {
            config,
            gate,
            pending: Vec::new(),
            last_health: None,
            target: None,
            attacking: false,
            attack_started_ms: None,
            last_poll_ms: None,
            last_aim_ms: None,
            dead: false,
        }
    }

    /// Queue an event unless its kind is cooling down
    fn emit(&mut self, event: RewardEvent, now_ms: Millis) -> bool {
        if !self.gate.try_pass(event.kind(), now_ms) {
            tracing::trace!(kind = ?event.kind(), "Reward event suppressed by cooldown");
            return false;
        }
        tracing::debug!(?event, "Reward event");
        self.pending.push(event);
        true
    }

    /// Host reports the avatar was hurt
    pub fn on_hurt(
        &mut self,
        avatar: &AvatarState,
        amount: f32,
        attacker: Option<&str>,
        now_ms: Millis,
    ) {
        // Keep polling from seeing the same drop again
        self.last_health = Some(avatar.health);
        if amount < self.config.min_damage {
            return;
        }
        let event =
            RewardEvent::damage_taken(amount, avatar.max_health, attacker.map(str::to_owned));
        self.emit(event, now_ms);
    }

    /// Host reports the avatar attacked `target`; start tracking its health
    pub fn on_attack(&mut self, target: &EntityView, now_ms: Millis) {
        if !target.kind.is_living() {
            return;
        }
        self.track(target, now_ms);
    }

    /// Host reports the avatar hit `target` for `amount`.
    ///
    /// `target` is the pre-hit view. The hit is reported right away and the
    /// target is tracked from its post-hit health, so polling only reports
    /// further losses.
    pub fn on_damage_dealt(&mut self, target: &EntityView, amount: f32, now_ms: Millis) {
        if !target.kind.is_living() {
            return;
        }
        self.track(target, now_ms);
        if let Some(t) = self.target.as_mut() {
            t.last_health = (target.health - amount).max(0.0);
        }
        if amount < self.config.min_damage {
            return;
        }
        let event = RewardEvent::damage_dealt(amount, target.max_health, target.name.clone());
        self.emit(event, now_ms);
    }

    /// Host reports the avatar died
    pub fn on_death(&mut self, now_ms: Millis) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.target = None;
        self.attacking = false;
        self.emit(RewardEvent::Death, now_ms);
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    fn track(&mut self, target: &EntityView, now_ms: Millis) {
        let same = self.target.as_ref().is_some_and(|t| t.id == target.id);
        if !same {
            tracing::debug!(target = %target.name, "Tracking attack target");
            self.target = Some(TrackedTarget {
                id: target.id,
                name: target.name.clone(),
                last_health: target.health,
            });
            self.attack_started_ms = Some(now_ms);
        }
        self.attacking = true;
    }

    /// Per-frame polling; each check runs at its own cadence
    pub fn poll(&mut self, world: &dyn WorldSensor, now_ms: Millis) {
        let Some(avatar) = world.avatar() else {
            return;
        };

        if avatar.health <= 0.0 {
            self.on_death(now_ms);
            self.last_health = Some(avatar.health);
            return;
        }
        if self.dead {
            tracing::info!("Avatar respawned");
            self.dead = false;
            self.last_health = None;
        }

        let poll_due = self
            .last_poll_ms
            .map_or(true, |t| now_ms.saturating_sub(t) >= self.config.poll_interval_ms);
        if poll_due {
            self.last_poll_ms = Some(now_ms);
            self.poll_own_health(world, &avatar, now_ms);
            self.poll_target(world, now_ms);
        }

        let aim_due = self
            .last_aim_ms
            .map_or(true, |t| now_ms.saturating_sub(t) >= self.config.aim_interval_ms);
        if aim_due {
            self.last_aim_ms = Some(now_ms);
            self.poll_aim(world, &avatar, now_ms);
        }
    }

    fn poll_own_health(&mut self, world: &dyn WorldSensor, avatar: &AvatarState, now_ms: Millis) {
        let previous = self.last_health.replace(avatar.health);
        let Some(previous) = previous else {
            return;
        };
        let lost = previous - avatar.health;
        if lost < self.config.min_damage {
            return;
        }
        let attacker = nearest(
            world,
            avatar.position,
            self.config.attacker_search_range,
            |e| e.kind == EntityKind::Player && e.is_alive(),
        )
        .map(|e| e.name);
        self.emit(
            RewardEvent::damage_taken(lost, avatar.max_health, attacker),
            now_ms,
        );
    }

    fn poll_target(&mut self, world: &dyn WorldSensor, now_ms: Millis) {
        let Some(tracked) = self.target.clone() else {
            let expired = self.attack_started_ms.map_or(true, |t| {
                now_ms.saturating_sub(t) > self.config.attack_timeout_ms
            });
            if self.attacking && expired {
                self.attacking = false;
                self.attack_started_ms = None;
            }
            return;
        };

        let current = world.entity(tracked.id);
        let health = current.as_ref().map_or(0.0, |e| e.health.max(0.0));
        let dealt = tracked.last_health - health;
        if current.is_some() && dealt >= self.config.min_damage {
            let max_health = current.as_ref().map_or(1.0, |e| e.max_health);
            self.emit(
                RewardEvent::damage_dealt(dealt, max_health, tracked.name.clone()),
                now_ms,
            );
        }

        match current {
            Some(entity) if entity.is_alive() => {
                if let Some(t) = self.target.as_mut() {
                    t.last_health = entity.health;
                }
            }
            _ => {
                tracing::debug!(target = %tracked.name, "Attack target gone");
                self.target = None;
            }
        }
    }

    fn poll_aim(&mut self, world: &dyn WorldSensor, avatar: &AvatarState, now_ms: Millis) {
        let Some(hostile) = nearest(world, avatar.position, self.config.aim_range, |e| {
            e.kind.is_hostile() && e.is_alive()
        }) else {
            return;
        };

        let error = AimError::measure(avatar.position, avatar.rotation, hostile.position);
        let angle = error.angle();

        if angle < self.config.track_angle
            && error.distance < self.config.track_distance
            && (avatar.swinging || self.attacking)
        {
            self.track(&hostile, now_ms);
        }

        let score = aim_score(angle);
        if score > 0.0 {
            self.emit(
                RewardEvent::GoodAim {
                    amount: score as f32,
                    yaw_diff: error.yaw_diff as f32,
                    pitch_diff: error.pitch_diff as f32,
                    distance: error.distance as f32,
                },
                now_ms,
            );
        }
    }

    pub fn pending(&self) -> &[RewardEvent] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<RewardEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Send pending events. Failures are logged and the batch is dropped.
    pub fn flush(&mut self, sink: &dyn TelemetrySink, world: &dyn WorldSensor, bot_name: &str) {
        if self.pending.is_empty() {
            return;
        }
        let events = self.drain();
        let Some(avatar) = world.avatar() else {
            tracing::debug!(count = events.len(), "No avatar, dropping reward events");
            return;
        };
        let state = CurrentState::of(&avatar);
        let batch = RewardBatch {
            bot_name,
            events: &events,
            current_state: &state,
        };
        match sink.add_reward(&batch) {
            Ok(()) => tracing::debug!(count = events.len(), "Sent reward events"),
            Err(e) => tracing::warn!(error = %e, count = events.len(), "Failed to send reward events"),
        }
    }
}

/// Closest entity matching `filter` within `range` of `from`
fn nearest(
    world: &dyn WorldSensor,
    from: Vec3,
    range: f64,
    filter: impl Fn(&EntityView) -> bool,
) -> Option<EntityView> {
    world
        .entities()
        .into_iter()
        .filter(|e| filter(e))
        .map(|e| (OrderedFloat(e.position.distance(&from)), e))
        .filter(|(d, _)| d.0 <= range)
        .min_by_key(|(d, _)| *d)
        .map(|(_, e)| e)
}
