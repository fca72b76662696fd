//! Entity, inventory and player sampling

use super::{EntitySample, InventorySlot, PlayerState};
use crate::host::{AvatarState, EntityKind, ItemKind, WorldSensor};
use crate::service::spaces::ObservationSpaceConfig;

/// Reported hand damage when nothing useful is held
const BARE_HAND_DAMAGE: f32 = 1.0;

pub fn sample_player(avatar: &AvatarState, space: &ObservationSpaceConfig) -> PlayerState {
    let mut player = PlayerState::default();
    if space.include_health {
        player.health = Some(avatar.health);
    }
    if space.include_position {
        player.x = Some(avatar.position.x);
        player.y = Some(avatar.position.y);
        player.z = Some(avatar.position.z);
    }
    if space.include_rotation {
        player.yaw = Some(avatar.rotation.yaw);
        player.pitch = Some(avatar.rotation.pitch);
    }
    if space.include_armor {
        player.armor = Some(avatar.armor);
    }
    player
}

/// Living creatures, players and projectiles in host order, avatar excluded
pub fn sample_entities(
    world: &dyn WorldSensor,
    avatar: &AvatarState,
    max_entities: usize,
) -> Vec<EntitySample> {
    world
        .entities()
        .into_iter()
        .filter(|e| e.id != avatar.id && e.kind.is_relevant())
        .take(max_entities)
        .map(|e| {
            let living = e.kind.is_living();
            let relative = e.position - avatar.position;
            EntitySample {
                is_projectile: e.kind == EntityKind::Projectile,
                is_player: e.kind == EntityKind::Player,
                health: if living { e.health } else { 0.0 },
                armor: if living { e.armor } else { 0 },
                hand_damage: e.held_weapon_damage.unwrap_or(BARE_HAND_DAMAGE),
                relative_x: relative.x,
                relative_y: relative.y,
                relative_z: relative.z,
                velo_x: e.velocity.x,
                velo_y: e.velocity.y,
                velo_z: e.velocity.z,
                facing_yaw: e.rotation.yaw,
                facing_pitch: e.rotation.pitch,
            }
        })
        .collect()
}

/// Non-empty main-inventory slots in slot order
pub fn sample_inventory(world: &dyn WorldSensor, max_slots: usize) -> Vec<InventorySlot> {
    world
        .inventory()
        .into_iter()
        .filter(|stack| stack.count > 0)
        .take(max_slots)
        .map(|stack| {
            let (is_weapon, weapon_damage) = match stack.kind {
                ItemKind::Sword { damage } => (true, damage),
                _ => (false, BARE_HAND_DAMAGE),
            };
            InventorySlot {
                slot_number: stack.slot,
                count: stack.count,
                is_block: stack.kind == ItemKind::Block,
                is_weapon,
                weapon_damage,
                is_projectile: matches!(
                    stack.kind,
                    ItemKind::Egg | ItemKind::Snowball | ItemKind::FishingRod
                ),
                // Only bows carry flair
                flair: u8::from(stack.kind == ItemKind::Bow),
            }
        })
        .collect()
}
