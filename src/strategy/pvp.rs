//! Rule-based player-versus-player strategy

use super::{Strategy, StrategyContext, TickResult};
use crate::core::types::EntityId;
use crate::host::{EntityKind, ItemKind, HOST_HOTBAR_SIZE};
use crate::reward::AimError;
use ordered_float::OrderedFloat;

/// Players further away than this are ignored
const SEARCH_RANGE: f64 = 32.0;
/// Melee reach
const REACH: f64 = 3.5;
/// Stop walking when this close
const HOLD_DISTANCE: f64 = 2.5;
/// Aim error under which the target counts as under the crosshair
const STRIKE_ANGLE: f64 = 15.0;

/// Faces the nearest living player, closes in, and swings every other tick
#[derive(Debug, Default)]
pub struct PvpStrategy {
    tick_counter: u64,
    target: Option<(EntityId, String)>,
}

impl PvpStrategy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for PvpStrategy {
    fn tick(&mut self, ctx: &mut StrategyContext<'_>) -> TickResult {
        ctx.effector.begin_cycle();
        self.tick_counter += 1;

        let Some(avatar) = ctx.world.avatar() else {
            return TickResult::Handled;
        };
        let target = ctx
            .world
            .entities()
            .into_iter()
            .filter(|e| e.kind == EntityKind::Player && e.id != avatar.id && e.is_alive())
            .map(|e| (OrderedFloat(e.position.distance(&avatar.position)), e))
            .filter(|(d, _)| d.0 <= SEARCH_RANGE)
            .min_by_key(|(d, _)| *d)
            .map(|(_, e)| e);

        let Some(target) = target else {
            if self.target.take().is_some() {
                tracing::debug!("PvP target lost");
            }
            return TickResult::Handled;
        };
        if self.target.as_ref().map(|(id, _)| *id) != Some(target.id) {
            tracing::debug!(target = %target.name, "PvP target acquired");
        }
        self.target = Some((target.id, target.name.clone()));

        let aim = AimError::measure(avatar.position, avatar.rotation, target.position);
        ctx.effector.set_look(aim.yaw_diff as f32, aim.pitch_diff as f32);
        ctx.effector.forward = aim.distance > HOLD_DISTANCE;

        if aim.distance <= REACH && aim.angle() < STRIKE_ANGLE {
            let sword = ctx
                .world
                .inventory()
                .into_iter()
                .find(|s| matches!(s.kind, ItemKind::Sword { .. }) && s.slot < HOST_HOTBAR_SIZE);
            if let Some(sword) = sword {
                ctx.effector.apply_hotbar(sword.slot as i64);
            }
            ctx.effector.attack = self.tick_counter % 2 == 0;
        }
        TickResult::Handled
    }

    fn deactivate(&mut self, ctx: &mut StrategyContext<'_>) {
        ctx.effector.begin_cycle();
    }

    fn describe(&self) -> String {
        match &self.target {
            Some((_, name)) => format!("PvP: Attacking {}", name),
            None => "PvP: Searching for players...".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Rotation, Vec3};
    use crate::effector::EffectorState;
    use crate::host::{EntityView, ItemStackView, ScriptedWorld};

    fn player(id: u32, name: &str, position: Vec3) -> EntityView {
        EntityView {
            id: EntityId(id),
            name: name.into(),
            kind: EntityKind::Player,
            position,
            velocity: Vec3::default(),
            rotation: Rotation::default(),
            health: 20.0,
            max_health: 20.0,
            armor: 0,
            held_weapon_damage: None,
        }
    }

    #[test]
    fn test_searching_without_players() {
        let world = ScriptedWorld::with_avatar(Vec3::default(), Rotation::default());
        let mut effector = EffectorState::new();
        let mut pvp = PvpStrategy::new();
        let mut ctx = StrategyContext::new(&world, &mut effector, 0);
        assert_eq!(pvp.tick(&mut ctx), TickResult::Handled);
        assert_eq!(pvp.describe(), "PvP: Searching for players...");
        assert!(!effector.attack);
    }

    #[test]
    fn test_faces_and_approaches_far_player() {
        let mut world = ScriptedWorld::with_avatar(Vec3::default(), Rotation::new(0.0, 0.0));
        world.spawn(player(1, "alice", Vec3::new(10.0, 0.0, 0.0)));
        let mut effector = EffectorState::new();
        let mut pvp = PvpStrategy::new();
        let mut ctx = StrategyContext::new(&world, &mut effector, 0);
        pvp.tick(&mut ctx);
        assert!(effector.forward);
        assert!((effector.delta_yaw + 90.0).abs() < 1e-3);
        assert_eq!(pvp.describe(), "PvP: Attacking alice");
    }

    #[test]
    fn test_swings_every_other_tick_in_reach() {
        // Yaw -90 faces +X, where bob stands
        let mut world = ScriptedWorld::with_avatar(Vec3::default(), Rotation::new(-90.0, 0.0));
        world.spawn(player(2, "bob", Vec3::new(2.0, 0.0, 0.0)));
        world.inventory = vec![ItemStackView {
            slot: 3,
            count: 1,
            kind: ItemKind::Sword { damage: 7.0 },
        }];
        let mut effector = EffectorState::new();
        let mut pvp = PvpStrategy::new();
        let mut attacks = Vec::new();
        for t in 0..4 {
            let mut ctx = StrategyContext::new(&world, &mut effector, t);
            pvp.tick(&mut ctx);
            attacks.push(effector.attack);
        }
        assert_eq!(attacks, vec![false, true, false, true]);
        assert!(effector.hotbar[3]);
        assert!(!effector.forward);
    }

    #[test]
    fn test_sword_outside_hotbar_not_selected() {
        let mut world = ScriptedWorld::with_avatar(Vec3::default(), Rotation::new(-90.0, 0.0));
        world.spawn(player(2, "bob", Vec3::new(2.0, 0.0, 0.0)));
        world.inventory = vec![ItemStackView {
            slot: HOST_HOTBAR_SIZE,
            count: 1,
            kind: ItemKind::Sword { damage: 7.0 },
        }];
        let mut effector = EffectorState::new();
        let mut pvp = PvpStrategy::new();
        let mut ctx = StrategyContext::new(&world, &mut effector, 0);
        pvp.tick(&mut ctx);
        assert!(effector.hotbar.iter().all(|pressed| !pressed));
    }
}
