//! Per-kind event deduplication

use super::RewardKind;
use crate::core::types::Millis;
use ahash::AHashMap;

/// Rate limiter shared by every reward source.
///
/// An event passes when no event of the same kind passed within the last
/// `cooldown_ms`. Suppressed events leave the stamp untouched.
#[derive(Debug, Clone)]
pub struct CooldownGate {
    cooldown_ms: Millis,
    last_emitted: AHashMap<RewardKind, Millis>,
}

impl CooldownGate {
    pub fn new(cooldown_ms: Millis) -> Self {
        Self {
            cooldown_ms,
            last_emitted: AHashMap::new(),
        }
    }

    pub fn try_pass(&mut self, kind: RewardKind, now_ms: Millis) -> bool {
        if let Some(&last) = self.last_emitted.get(&kind) {
            if now_ms.saturating_sub(last) < self.cooldown_ms {
                return false;
            }
        }
        self.last_emitted.insert(kind, now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_emitted.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_window() {
        let mut gate = CooldownGate::new(100);
        assert!(gate.try_pass(RewardKind::DamageTaken, 0));
        assert!(!gate.try_pass(RewardKind::DamageTaken, 30));
        assert!(gate.try_pass(RewardKind::DamageTaken, 150));
    }

    #[test]
    fn test_suppressed_event_does_not_extend_window() {
        let mut gate = CooldownGate::new(100);
        assert!(gate.try_pass(RewardKind::GoodAim, 0));
        assert!(!gate.try_pass(RewardKind::GoodAim, 90));
        assert!(gate.try_pass(RewardKind::GoodAim, 100));
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut gate = CooldownGate::new(100);
        assert!(gate.try_pass(RewardKind::DamageTaken, 0));
        assert!(gate.try_pass(RewardKind::DamageDealt, 10));
        assert!(gate.try_pass(RewardKind::GoodAim, 20));
    }
}
