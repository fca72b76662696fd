//! Action-Space and Observation-Space configuration
//!
//! Both documents are supplied by the decision service as JSON with camelCase
//! keys. Every field is optional; omitted fields take the defaults below. They
//! are loaded once when a strategy activates and never change afterwards.

use crate::core::error::{AgentError, Result};
use serde::{Deserialize, Serialize};

/// Hard ceiling on sampled entities, whatever the service asks for
pub const MAX_ENTITIES_CAP: usize = 256;
/// Hard ceiling on block samples
pub const MAX_BLOCKS_CAP: usize = 512;
/// Hard ceiling on inventory slots
pub const MAX_INVENTORY_CAP: usize = 64;

/// Which control channels the policy drives, and how finely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionSpaceConfig {
    pub enable_movement: bool,
    pub enable_jump: bool,
    pub enable_sneak: bool,
    pub enable_sprint: bool,
    pub enable_attack: bool,
    pub enable_use_item: bool,
    pub enable_hotbar: bool,
    pub enable_look: bool,
    /// Movement directions (N, NE, E, SE, S, SW, W, NW)
    pub movement_bins: u32,
    pub yaw_bins: u32,
    /// Pitch angles spanning -90..90
    pub pitch_bins: u32,
}

impl Default for ActionSpaceConfig {
    fn default() -> Self {
        Self {
            enable_movement: true,
            enable_jump: true,
            enable_sneak: false,
            enable_sprint: false,
            enable_attack: true,
            enable_use_item: true,
            enable_hotbar: true,
            enable_look: true,
            movement_bins: 8,
            yaw_bins: 16,
            pitch_bins: 9,
        }
    }
}

impl ActionSpaceConfig {
    /// Total width of the flattened action vector
    pub fn action_space_size(&self) -> u32 {
        let mut size = 0;
        if self.enable_movement {
            size += self.movement_bins;
        }
        size += [
            self.enable_jump,
            self.enable_sneak,
            self.enable_sprint,
            self.enable_attack,
            self.enable_use_item,
        ]
        .iter()
        .filter(|&&on| on)
        .count() as u32;
        if self.enable_hotbar {
            size += crate::effector::HOTBAR_SLOTS as u32;
        }
        if self.enable_look {
            size += self.yaw_bins + self.pitch_bins;
        }
        size
    }

    pub fn validate(&self) -> Result<()> {
        if self.movement_bins == 0 || self.movement_bins > 8 {
            return Err(AgentError::Config(format!(
                "movementBins ({}) must be within 1..=8",
                self.movement_bins
            )));
        }
        if self.enable_look && (self.yaw_bins == 0 || self.pitch_bins == 0) {
            return Err(AgentError::Config(
                "yawBins and pitchBins must be positive when look is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn parse(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a document, reporting problems and keeping the defaults instead
    pub fn parse_or_default(json: &str) -> Self {
        Self::parse(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Rejected action space config, using defaults");
            Self::default()
        })
    }
}

/// Which observation groups are sampled, and how many of each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservationSpaceConfig {
    pub include_player_data: bool,
    pub include_entity_data: bool,
    pub include_block_data: bool,
    pub include_inventory_data: bool,

    pub max_entities: usize,
    pub max_blocks: usize,
    pub max_inventory_slots: usize,

    // Player sub-fields
    pub include_health: bool,
    pub include_position: bool,
    pub include_rotation: bool,
    pub include_velocity: bool,
    pub include_armor: bool,
}

impl Default for ObservationSpaceConfig {
    fn default() -> Self {
        Self {
            include_player_data: true,
            include_entity_data: true,
            include_block_data: true,
            include_inventory_data: true,
            max_entities: 10,
            max_blocks: 50,
            max_inventory_slots: 36,
            include_health: true,
            include_position: true,
            include_rotation: true,
            include_velocity: true,
            include_armor: true,
        }
    }
}

/// Features per sampled entity in the flattened observation vector
const ENTITY_FEATURES: usize = 15;
const BLOCK_FEATURES: usize = 6;
const INVENTORY_FEATURES: usize = 7;

impl ObservationSpaceConfig {
    /// Total width of the flattened observation vector
    pub fn observation_space_size(&self) -> usize {
        let mut size = 0;
        if self.include_player_data {
            if self.include_health {
                size += 1;
            }
            if self.include_position {
                size += 3;
            }
            if self.include_rotation {
                size += 2;
            }
            if self.include_velocity {
                size += 3;
            }
            if self.include_armor {
                size += 1;
            }
        }
        if self.include_entity_data {
            size += self.max_entities * ENTITY_FEATURES;
        }
        if self.include_block_data {
            size += self.max_blocks * BLOCK_FEATURES;
        }
        if self.include_inventory_data {
            size += self.max_inventory_slots * INVENTORY_FEATURES;
        }
        size
    }

    pub fn validate(&self) -> Result<()> {
        let caps = [
            ("maxEntities", self.max_entities, MAX_ENTITIES_CAP),
            ("maxBlocks", self.max_blocks, MAX_BLOCKS_CAP),
            ("maxInventorySlots", self.max_inventory_slots, MAX_INVENTORY_CAP),
        ];
        for (name, value, cap) in caps {
            if value > cap {
                return Err(AgentError::Config(format!(
                    "{} ({}) exceeds the supported maximum of {}",
                    name, value, cap
                )));
            }
        }
        Ok(())
    }

    pub fn parse(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse_or_default(json: &str) -> Self {
        Self::parse(json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Rejected observation space config, using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_space_defaults() {
        let config = ActionSpaceConfig::default();
        assert!(config.enable_movement);
        assert!(!config.enable_sneak);
        // 8 movement + jump/attack/useItem + 10 hotbar + 16 yaw + 9 pitch
        assert_eq!(config.action_space_size(), 8 + 3 + 10 + 16 + 9);
    }

    #[test]
    fn test_action_space_partial_document() {
        let config = ActionSpaceConfig::parse(r#"{"enableSneak": true, "yawBins": 8}"#).unwrap();
        assert!(config.enable_sneak);
        assert_eq!(config.yaw_bins, 8);
        assert_eq!(config.pitch_bins, 9);
    }

    #[test]
    fn test_action_space_rejects_too_many_movement_bins() {
        let result = ActionSpaceConfig::parse(r#"{"movementBins": 12}"#);
        assert!(matches!(result, Err(AgentError::Config(_))));
    }

    #[test]
    fn test_wrong_type_falls_back_to_default() {
        let config = ActionSpaceConfig::parse_or_default(r#"{"enableJump": "yes"}"#);
        assert_eq!(config, ActionSpaceConfig::default());
    }

    #[test]
    fn test_observation_space_size() {
        let config = ObservationSpaceConfig::default();
        assert_eq!(
            config.observation_space_size(),
            10 + 10 * 15 + 50 * 6 + 36 * 7
        );
    }

    #[test]
    fn test_observation_space_caps() {
        let result = ObservationSpaceConfig::parse(r#"{"maxBlocks": 100000}"#);
        assert!(result.is_err());
        let ok = ObservationSpaceConfig::parse(r#"{"maxEntities": 3, "includeBlockData": false}"#)
            .unwrap();
        assert_eq!(ok.max_entities, 3);
        assert!(!ok.include_block_data);
    }
}
