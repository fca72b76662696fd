//! Observation assembler property tests

mod common;

use cambium_agent::core::config::ScanConfig;
use cambium_agent::core::types::{BlockPos, Rotation, Vec3};
use cambium_agent::host::{EntityKind, ItemKind, ItemStackView, ScriptedWorld};
use cambium_agent::observation::ObservationAssembler;
use cambium_agent::service::spaces::ObservationSpaceConfig;
use common::mob;
use proptest::prelude::*;
use std::collections::HashSet;

const MATERIALS: [&str; 4] = ["stone", "dirt", "glass", "oak_log"];
const KINDS: [EntityKind; 5] = [
    EntityKind::Player,
    EntityKind::Hostile,
    EntityKind::Passive,
    EntityKind::Projectile,
    EntityKind::Decoration,
];

fn build_world(
    blocks: &[(i32, i32, i32, usize)],
    entities: &[(f64, f64, usize)],
    slots: usize,
) -> ScriptedWorld {
    let mut world = ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::new(30.0, 10.0));
    for &(x, y, z, m) in blocks {
        world.set_block(BlockPos::new(x, y, z), MATERIALS[m]);
    }
    for (i, &(x, z, k)) in entities.iter().enumerate() {
        world.spawn(mob(i as u32 + 1, "mob", KINDS[k], Vec3::new(x, 64.0, z)));
    }
    world.inventory = (0..slots)
        .map(|slot| ItemStackView {
            slot,
            count: 1,
            kind: if slot % 2 == 0 { ItemKind::Block } else { ItemKind::Other },
        })
        .collect();
    world
}

proptest! {
    #[test]
    fn prop_observation_respects_bounds(
        blocks in prop::collection::vec((-15i32..15, 55i32..75, -15i32..15, 0usize..4), 0..300),
        entities in prop::collection::vec((-30.0f64..30.0, -30.0f64..30.0, 0usize..5), 0..40),
        slots in 0usize..40,
        max_entities in 0usize..20,
        max_blocks in 0usize..120,
        max_slots in 0usize..36,
    ) {
        let world = build_world(&blocks, &entities, slots);
        let space = ObservationSpaceConfig {
            max_entities,
            max_blocks,
            max_inventory_slots: max_slots,
            ..ObservationSpaceConfig::default()
        };
        let assembler = ObservationAssembler::new(space, ScanConfig::default());
        let observation = assembler.assemble(&world).unwrap();

        prop_assert!(observation.entities().len() <= max_entities);
        prop_assert!(observation.blocks().len() <= max_blocks);
        prop_assert!(observation.inventory().len() <= max_slots);

        let mut keys = HashSet::new();
        for b in observation.blocks() {
            prop_assert!(keys.insert((b.x, b.y, b.z, b.name.clone())));
            prop_assert!(b.distance <= ScanConfig::default().max_distance);
        }
    }

    #[test]
    fn prop_scan_is_deterministic(
        blocks in prop::collection::vec((-15i32..15, 55i32..75, -15i32..15, 0usize..4), 0..300),
    ) {
        let world = build_world(&blocks, &[], 0);
        let assembler = ObservationAssembler::default();
        let first = assembler.assemble(&world).unwrap();
        let second = assembler.assemble(&world).unwrap();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn test_enclosed_room_fills_block_budget() {
    let mut world = ScriptedWorld::with_avatar(Vec3::new(0.5, 64.0, 0.5), Rotation::default());
    world.fill(BlockPos::new(-4, 63, -4), BlockPos::new(4, 63, 4), "stone");
    world.fill(BlockPos::new(-4, 68, -4), BlockPos::new(4, 68, 4), "glass");
    for i in -4..=4 {
        world.fill(BlockPos::new(-4, 64, i), BlockPos::new(-4, 67, i), "brick");
        world.fill(BlockPos::new(4, 64, i), BlockPos::new(4, 67, i), "brick");
        world.fill(BlockPos::new(i, 64, -4), BlockPos::new(i, 67, -4), "brick");
        world.fill(BlockPos::new(i, 64, 4), BlockPos::new(i, 67, 4), "brick");
    }

    let observation = ObservationAssembler::default().assemble(&world).unwrap();
    assert_eq!(observation.blocks().len(), 50);
    // Straight down is scanned first
    let first = &observation.blocks()[0];
    assert_eq!((first.x, first.y, first.z), (0, -1, 0));
    assert_eq!(first.name, "stone");
}

#[test]
fn test_entity_sample_is_relative_to_avatar() {
    let mut world = ScriptedWorld::with_avatar(Vec3::new(10.0, 64.0, -3.0), Rotation::default());
    world.spawn(mob(5, "creeper", EntityKind::Hostile, Vec3::new(13.0, 65.0, -1.0)));
    let observation = ObservationAssembler::default().assemble(&world).unwrap();
    let sample = &observation.entities()[0];
    assert_eq!(
        (sample.relative_x, sample.relative_y, sample.relative_z),
        (3.0, 1.0, 2.0)
    );
    assert!(!sample.is_player);
}
