//! In-memory host for the demo runner and tests
//!
//! Voxels live in a sparse hash map keyed by cell; rays walk the grid cell by
//! cell (Amanatides–Woo traversal) so scans are exact and deterministic.

use super::{Actuator, AvatarState, Control, EntityView, ItemStackView, RayHit, WorldSensor};
use crate::core::types::{BlockPos, EntityId, Rotation, Vec3};
use ahash::AHashMap;

/// Scripted world with a static voxel map
#[derive(Debug, Clone, Default)]
pub struct ScriptedWorld {
    pub avatar: Option<AvatarState>,
    pub entities: Vec<EntityView>,
    pub inventory: Vec<ItemStackView>,
    blocks: AHashMap<BlockPos, String>,
}

impl ScriptedWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World with an avatar standing at `position`
    pub fn with_avatar(position: Vec3, rotation: Rotation) -> Self {
        Self {
            avatar: Some(AvatarState {
                id: EntityId(0),
                name: "bot".into(),
                position,
                rotation,
                health: 20.0,
                max_health: 20.0,
                armor: 0,
                swinging: false,
            }),
            ..Self::default()
        }
    }

    pub fn set_block(&mut self, pos: BlockPos, material: impl Into<String>) {
        self.blocks.insert(pos, material.into());
    }

    pub fn clear_block(&mut self, pos: BlockPos) {
        self.blocks.remove(&pos);
    }

    /// Fill an axis-aligned box of cells (inclusive bounds)
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, material: &str) {
        for x in from.x.min(to.x)..=from.x.max(to.x) {
            for y in from.y.min(to.y)..=from.y.max(to.y) {
                for z in from.z.min(to.z)..=from.z.max(to.z) {
                    self.set_block(BlockPos::new(x, y, z), material);
                }
            }
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn spawn(&mut self, entity: EntityView) {
        self.entities.push(entity);
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityView> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn avatar_mut(&mut self) -> Option<&mut AvatarState> {
        self.avatar.as_mut()
    }
}

impl WorldSensor for ScriptedWorld {
    fn avatar(&self) -> Option<AvatarState> {
        self.avatar.clone()
    }

    fn entities(&self) -> Vec<EntityView> {
        self.entities.clone()
    }

    fn entity(&self, id: EntityId) -> Option<EntityView> {
        self.entities.iter().find(|e| e.id == id).cloned()
    }

    fn inventory(&self) -> Vec<ItemStackView> {
        self.inventory.clone()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f64) -> Option<RayHit> {
        let len = direction.length();
        if len < 1e-9 || max_distance <= 0.0 {
            return None;
        }
        let dir = direction.scale(1.0 / len);

        let mut cell = origin.cell();
        let axis = |o: f64, d: f64, c: i32| -> (i32, f64, f64) {
            if d > 0.0 {
                (1, ((c as f64 + 1.0) - o) / d, 1.0 / d)
            } else if d < 0.0 {
                (-1, (c as f64 - o) / d, -1.0 / d)
            } else {
                (0, f64::INFINITY, f64::INFINITY)
            }
        };
        let (sx, mut tmx, tdx) = axis(origin.x, dir.x, cell.x);
        let (sy, mut tmy, tdy) = axis(origin.y, dir.y, cell.y);
        let (sz, mut tmz, tdz) = axis(origin.z, dir.z, cell.z);

        let mut t = 0.0;
        while t <= max_distance {
            if let Some(material) = self.blocks.get(&cell) {
                return Some(RayHit {
                    cell,
                    distance: t,
                    material: material.clone(),
                });
            }
            if tmx < tmy && tmx < tmz {
                cell.x += sx;
                t = tmx;
                tmx += tdx;
            } else if tmy < tmz {
                cell.y += sy;
                t = tmy;
                tmy += tdy;
            } else {
                cell.z += sz;
                t = tmz;
                tmz += tdz;
            }
        }
        None
    }
}

/// Actuator that remembers the last state of every control
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    controls: AHashMap<Control, bool>,
    pub yaw_total: f32,
    pub pitch_total: f32,
    pub look_updates: usize,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, control: Control) -> bool {
        self.controls.get(&control).copied().unwrap_or(false)
    }

    pub fn pressed(&self) -> Vec<Control> {
        let mut pressed: Vec<Control> = self
            .controls
            .iter()
            .filter(|(_, down)| **down)
            .map(|(&c, _)| c)
            .collect();
        pressed.sort_by_key(|c| format!("{:?}", c));
        pressed
    }
}

impl Actuator for RecordingActuator {
    fn set_control(&mut self, control: Control, pressed: bool) {
        self.controls.insert(control, pressed);
    }

    fn add_look(&mut self, yaw: f32, pitch: f32) {
        self.yaw_total += yaw;
        self.pitch_total = (self.pitch_total + pitch).clamp(-90.0, 90.0);
        self.look_updates += 1;
    }
}
