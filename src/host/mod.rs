//! Host world interfaces
//!
//! The control core never talks to the game directly. Each frame it reads the
//! world through [`WorldSensor`] and writes inputs through [`Actuator`]; the host
//! drives everything by calling into [`crate::agent::Agent`] once per tick.

pub mod scripted;

use crate::core::types::{BlockPos, EntityId, Millis, Rotation, Vec3};
use serde::{Deserialize, Serialize};

pub use scripted::{RecordingActuator, ScriptedWorld};

/// Phase of the host's per-frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Start,
    End,
}

/// One host simulation tick as seen by the agent
#[derive(Debug, Clone)]
pub struct HostTick {
    pub phase: TickPhase,
    /// Wall-clock time of this frame
    pub now_ms: Millis,
    /// Stop key held or pressed during this frame
    pub stop_pressed: bool,
    /// Trigger keys pressed during this frame
    pub pressed_triggers: Vec<String>,
}

impl HostTick {
    pub fn start(now_ms: Millis) -> Self {
        Self {
            phase: TickPhase::Start,
            now_ms,
            stop_pressed: false,
            pressed_triggers: Vec::new(),
        }
    }

    pub fn end(now_ms: Millis) -> Self {
        Self {
            phase: TickPhase::End,
            ..Self::start(now_ms)
        }
    }

    pub fn with_stop(mut self) -> Self {
        self.stop_pressed = true;
        self
    }

    pub fn with_trigger(mut self, key: impl Into<String>) -> Self {
        self.pressed_triggers.push(key.into());
        self
    }
}

/// The avatar this agent pilots
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarState {
    pub id: EntityId,
    pub name: String,
    /// Feet position
    pub position: Vec3,
    pub rotation: Rotation,
    pub health: f32,
    pub max_health: f32,
    pub armor: i32,
    /// Arm swing animation in progress
    pub swinging: bool,
}

/// Category of a loaded entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Hostile,
    Passive,
    Projectile,
    /// Particles, item frames, dropped items and other non-actors
    Decoration,
}

impl EntityKind {
    /// Worth reporting to the decision policy
    pub fn is_relevant(self) -> bool {
        !matches!(self, EntityKind::Decoration)
    }

    pub fn is_living(self) -> bool {
        matches!(
            self,
            EntityKind::Player | EntityKind::Hostile | EntityKind::Passive
        )
    }

    /// Valid target for aim scoring and damage tracking
    pub fn is_hostile(self) -> bool {
        matches!(self, EntityKind::Player | EntityKind::Hostile)
    }
}

/// A loaded entity other than the avatar
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub rotation: Rotation,
    pub health: f32,
    pub max_health: f32,
    pub armor: i32,
    /// Damage of the held weapon, if the entity holds one
    pub held_weapon_damage: Option<f32>,
}

impl EntityView {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

/// What an inventory stack holds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ItemKind {
    Block,
    Sword { damage: f32 },
    Bow,
    FishingRod,
    Egg,
    Snowball,
    Other,
}

/// Inventory slots `0..HOST_HOTBAR_SIZE` are the host's hotbar
pub const HOST_HOTBAR_SIZE: usize = 9;

/// A non-empty main-inventory slot
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStackView {
    pub slot: usize,
    pub count: u32,
    pub kind: ItemKind,
}

/// First solid cell along a ray
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub cell: BlockPos,
    /// Distance from the ray origin to the point where it entered the cell
    pub distance: f64,
    pub material: String,
}

/// Read-only per-frame view of the world
pub trait WorldSensor {
    /// `None` when no controllable avatar is in the world
    fn avatar(&self) -> Option<AvatarState>;

    /// Loaded entities, excluding the avatar, in host order
    fn entities(&self) -> Vec<EntityView>;

    fn entity(&self, id: EntityId) -> Option<EntityView> {
        self.entities().into_iter().find(|e| e.id == id)
    }

    /// Non-empty main-inventory slots in slot order
    fn inventory(&self) -> Vec<ItemStackView>;

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<RayHit>;
}

/// A host input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Back,
    Left,
    Right,
    Jump,
    Sneak,
    Sprint,
    Attack,
    UseItem,
    Hotbar(u8),
}

/// Per-frame input sink
pub trait Actuator {
    fn set_control(&mut self, control: Control, pressed: bool);

    /// Accumulate a look delta in degrees
    fn add_look(&mut self, yaw: f32, pitch: f32);
}
