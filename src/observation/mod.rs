//! Observation Assembler
//!
//! Turns the live world into a bounded, deterministic snapshot the decision
//! policy can consume. Each group is sampled independently:
//!
//! - `scan` - fixed spherical ray pattern around the avatar's eyes
//! - `sample` - entity, inventory and player sampling
//!
//! Group sizes never exceed the maxima of the active [`ObservationSpaceConfig`];
//! overflow keeps a stable prefix.

pub mod sample;
pub mod scan;

use crate::core::config::ScanConfig;
use crate::host::WorldSensor;
use crate::service::spaces::ObservationSpaceConfig;
use serde::{Deserialize, Serialize};

pub use sample::{sample_entities, sample_inventory, sample_player};
pub use scan::{scan_blocks, scan_directions, PITCH_BANDS};

/// Own avatar state. Disabled sub-fields are left out of the wire form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaw: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor: Option<i32>,
}

/// One nearby entity, positioned relative to the avatar's feet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySample {
    pub is_projectile: bool,
    pub is_player: bool,
    pub health: f32,
    pub armor: i32,
    pub hand_damage: f32,
    pub relative_x: f64,
    pub relative_y: f64,
    pub relative_z: f64,
    pub velo_x: f64,
    pub velo_y: f64,
    pub velo_z: f64,
    pub facing_yaw: f32,
    pub facing_pitch: f32,
}

/// First solid cell hit by one scan ray
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSample {
    /// Offset of the hit cell from the avatar's feet cell
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub distance: f64,
    pub solid: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySlot {
    pub slot_number: usize,
    pub count: u32,
    pub is_block: bool,
    pub is_weapon: bool,
    pub weapon_damage: f32,
    pub is_projectile: bool,
    pub flair: u8,
}

/// Per-frame snapshot sent to the decision policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<EntitySample>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<BlockSample>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<InventorySlot>>,
}

impl Observation {
    pub fn entities(&self) -> &[EntitySample] {
        self.entities.as_deref().unwrap_or(&[])
    }

    pub fn blocks(&self) -> &[BlockSample] {
        self.blocks.as_deref().unwrap_or(&[])
    }

    pub fn inventory(&self) -> &[InventorySlot] {
        self.inventory.as_deref().unwrap_or(&[])
    }
}

/// Builds observations for one fixed configuration
#[derive(Debug, Clone, Default)]
pub struct ObservationAssembler {
    space: ObservationSpaceConfig,
    scan: ScanConfig,
}

impl ObservationAssembler {
    pub fn new(space: ObservationSpaceConfig, scan: ScanConfig) -> Self {
        Self { space, scan }
    }

    pub fn space(&self) -> &ObservationSpaceConfig {
        &self.space
    }

    /// Sample the world. Returns `None` when no avatar is present.
    pub fn assemble(&self, world: &dyn WorldSensor) -> Option<Observation> {
        let avatar = world.avatar()?;
        let space = &self.space;

        let player = space
            .include_player_data
            .then(|| sample_player(&avatar, space));
        let entities = space
            .include_entity_data
            .then(|| sample_entities(world, &avatar, space.max_entities));
        let blocks = space.include_block_data.then(|| {
            scan_blocks(
                world,
                &avatar,
                self.scan.max_distance,
                self.scan.eye_height,
                space.max_blocks,
            )
        });
        let inventory = space
            .include_inventory_data
            .then(|| sample_inventory(world, space.max_inventory_slots));

        let observation = Observation {
            player,
            entities,
            blocks,
            inventory,
        };
        tracing::trace!(
            entities = observation.entities().len(),
            blocks = observation.blocks().len(),
            inventory = observation.inventory().len(),
            "Assembled observation"
        );
        Some(observation)
    }
}
