//! Desired input-device state, applied to the host once per frame
//!
//! Buttons are level-triggered: the host sees the same key state every frame
//! until a writer changes it. Look deltas are impulses, so they carry the
//! revision of the cycle that produced them and are applied once.

use crate::host::{Actuator, Control};

/// Number of hotbar triggers (keys 0-9)
pub const HOTBAR_SLOTS: usize = 10;

/// Number of discrete movement directions
pub const MOVEMENT_BINS: i64 = 8;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectorState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub sneak: bool,
    pub sprint: bool,
    pub attack: bool,
    pub use_item: bool,
    pub hotbar: [bool; HOTBAR_SLOTS],
    pub delta_yaw: f32,
    pub delta_pitch: f32,
    revision: u64,
}

impl EffectorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Release every control and start a new decision cycle
    pub fn begin_cycle(&mut self) {
        let revision = self.revision + 1;
        *self = Self {
            revision,
            ..Self::default()
        };
    }

    /// Incremented by every cycle that rewrote this state
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Press the direction pair for a movement bin.
    ///
    /// Bins run clockwise from straight ahead: 0 forward, 1 forward+right,
    /// 2 right, 3 back+right, 4 back, 5 back+left, 6 left, 7 forward+left.
    /// Returns false for bins outside 0-7, leaving movement released.
    pub fn apply_movement_bin(&mut self, bin: i64) -> bool {
        self.forward = false;
        self.back = false;
        self.left = false;
        self.right = false;
        match bin {
            0 => self.forward = true,
            1 => {
                self.forward = true;
                self.right = true;
            }
            2 => self.right = true,
            3 => {
                self.back = true;
                self.right = true;
            }
            4 => self.back = true,
            5 => {
                self.back = true;
                self.left = true;
            }
            6 => self.left = true,
            7 => {
                self.forward = true;
                self.left = true;
            }
            _ => return false,
        }
        true
    }

    /// Press exactly one hotbar trigger; out-of-range slots press none
    pub fn apply_hotbar(&mut self, slot: i64) -> bool {
        self.hotbar = [false; HOTBAR_SLOTS];
        match usize::try_from(slot) {
            Ok(idx) if idx < HOTBAR_SLOTS => {
                self.hotbar[idx] = true;
                true
            }
            _ => false,
        }
    }

    pub fn set_look(&mut self, yaw: f32, pitch: f32) {
        self.delta_yaw = yaw;
        self.delta_pitch = pitch;
        self.revision += 1;
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.back || self.left || self.right
    }

    /// Push this state to the host.
    ///
    /// Look deltas are only forwarded when `revision` differs from
    /// `last_applied`; returns the revision that is now applied.
    pub fn apply(&self, actuator: &mut dyn Actuator, last_applied: u64) -> u64 {
        actuator.set_control(Control::Forward, self.forward);
        actuator.set_control(Control::Back, self.back);
        actuator.set_control(Control::Left, self.left);
        actuator.set_control(Control::Right, self.right);
        actuator.set_control(Control::Jump, self.jump);
        actuator.set_control(Control::Sneak, self.sneak);
        actuator.set_control(Control::Sprint, self.sprint);
        actuator.set_control(Control::Attack, self.attack);
        actuator.set_control(Control::UseItem, self.use_item);
        for (slot, &pressed) in self.hotbar.iter().enumerate() {
            actuator.set_control(Control::Hotbar(slot as u8), pressed);
        }

        if self.revision != last_applied && (self.delta_yaw != 0.0 || self.delta_pitch != 0.0) {
            actuator.add_look(self.delta_yaw, self.delta_pitch);
        }
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingActuator;

    #[test]
    fn test_movement_bins_map_to_direction_pairs() {
        let expected = [
            (true, false, false, false),
            (true, false, false, true),
            (false, false, false, true),
            (false, true, false, true),
            (false, true, false, false),
            (false, true, true, false),
            (false, false, true, false),
            (true, false, true, false),
        ];
        for (bin, &(f, b, l, r)) in expected.iter().enumerate() {
            let mut state = EffectorState::new();
            assert!(state.apply_movement_bin(bin as i64));
            assert_eq!(
                (state.forward, state.back, state.left, state.right),
                (f, b, l, r),
                "bin {}",
                bin
            );
        }
    }

    #[test]
    fn test_out_of_range_movement_releases_keys() {
        let mut state = EffectorState::new();
        state.apply_movement_bin(0);
        assert!(!state.apply_movement_bin(8));
        assert!(!state.any_movement());
        assert!(!state.apply_movement_bin(-1));
    }

    #[test]
    fn test_hotbar_presses_single_trigger() {
        let mut state = EffectorState::new();
        assert!(state.apply_hotbar(3));
        assert_eq!(state.hotbar.iter().filter(|&&p| p).count(), 1);
        assert!(state.hotbar[3]);
        assert!(!state.apply_hotbar(10));
        assert!(state.hotbar.iter().all(|&p| !p));
    }

    #[test]
    fn test_begin_cycle_resets_and_bumps_revision() {
        let mut state = EffectorState::new();
        state.attack = true;
        state.jump = true;
        state.set_look(5.0, -2.0);
        let rev = state.revision();
        state.begin_cycle();
        assert!(!state.attack && !state.jump);
        assert_eq!(state.delta_yaw, 0.0);
        assert_eq!(state.revision(), rev + 1);
    }

    #[test]
    fn test_look_delta_applied_once_per_revision() {
        let mut state = EffectorState::new();
        state.begin_cycle();
        state.forward = true;
        state.set_look(10.0, 0.0);

        let mut act = RecordingActuator::new();
        let applied = state.apply(&mut act, 0);
        let applied = state.apply(&mut act, applied);
        state.apply(&mut act, applied);

        assert!(act.is_pressed(Control::Forward));
        assert_eq!(act.look_updates, 1);
        assert_eq!(act.yaw_total, 10.0);
    }
}
