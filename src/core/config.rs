//! Agent configuration with documented constants
//!
//! Every tunable of the control core lives here. The document is TOML; any
//! section or field may be omitted and falls back to the defaults below.

use crate::core::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Upper bound on consecutive `Again` ticks one strategy gets per frame
pub const MAX_TICKS_PER_FRAME: u32 = 100;

/// Upper bound on tick timestamps the governor keeps
pub const MAX_TIMING_WINDOW: usize = 20;

/// Remote decision/telemetry service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// TCP connect timeout
    pub connect_timeout_ms: u64,
    /// Upper bound on a whole request, including reading the body
    ///
    /// A stuck call occupies the frame for at most this long.
    pub read_timeout_ms: u64,
    /// Model version used for `/predict-action/{model}` until the service
    /// names a different one through `/set-model`
    pub model_version: String,
    /// Identifier sent as `bot_name` when the host does not provide one
    pub bot_name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://backend:8000".into(),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 10_000,
            model_version: "v1".into(),
            bot_name: "unknown".into(),
        }
    }
}

impl ServiceConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Scheduler settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Safety bound on consecutive `Again` results per strategy per frame
    pub max_ticks_per_frame: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_ticks_per_frame: MAX_TICKS_PER_FRAME,
        }
    }
}

/// Block scan settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Ray length of the spherical block scan (world units)
    pub max_distance: f64,
    /// Height of the avatar's eyes above its feet
    pub eye_height: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_distance: 20.0,
            eye_height: 1.62,
        }
    }
}

/// Reward detector timing and thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Health polling cadence; catches damage between decision cycles
    pub poll_interval_ms: u64,
    /// Aim scoring cadence
    pub aim_interval_ms: u64,
    /// Minimum spacing between two events of the same kind
    pub cooldown_ms: u64,
    /// Hostiles further away than this are ignored for aim scoring
    pub aim_range: f64,
    /// Radius searched for a likely attacker when damage is detected by polling
    pub attacker_search_range: f64,
    /// Health drops below this are treated as noise
    pub min_damage: f32,
    /// Aim error under which a swing at a close hostile starts tracking it
    pub track_angle: f64,
    /// Distance under which a swing at a hostile starts tracking it
    pub track_distance: f64,
    /// Attack state is forgotten this long after the last attack start
    pub attack_timeout_ms: u64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 50,
            aim_interval_ms: 100,
            cooldown_ms: 100,
            aim_range: 50.0,
            attacker_search_range: 10.0,
            min_damage: 0.1,
            track_angle: 30.0,
            track_distance: 5.0,
            attack_timeout_ms: 2_000,
        }
    }
}

/// Tick-rate estimation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    /// Number of tick timestamps kept in the sliding window
    pub window: usize,
    /// Percentile of the sorted inter-arrival intervals used as the estimate
    pub percentile: f64,
    /// Fraction of the policy's target rate the loop should aim for
    pub target_fraction: f64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            window: MAX_TIMING_WINDOW,
            percentile: 0.9,
            target_fraction: 0.9,
        }
    }
}

/// Complete agent configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub reward: RewardConfig,
    #[serde(default)]
    pub governor: GovernorConfig,
}

impl AgentConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AgentConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::info!(?path, "Loaded agent config");
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !self.service.base_url.starts_with("http://")
            && !self.service.base_url.starts_with("https://")
        {
            return Err(AgentError::Config(format!(
                "service.base_url must be an http(s) URL, got {:?}",
                self.service.base_url
            )));
        }

        if self.service.connect_timeout_ms == 0 || self.service.read_timeout_ms == 0 {
            return Err(AgentError::Config(
                "service timeouts must be positive; an unbounded call would stall the frame".into(),
            ));
        }

        if !(1..=MAX_TICKS_PER_FRAME).contains(&self.scheduler.max_ticks_per_frame) {
            return Err(AgentError::Config(format!(
                "scheduler.max_ticks_per_frame ({}) must be within 1..={}",
                self.scheduler.max_ticks_per_frame, MAX_TICKS_PER_FRAME
            )));
        }

        if self.scan.max_distance <= 0.0 {
            return Err(AgentError::Config(format!(
                "scan.max_distance ({}) must be positive",
                self.scan.max_distance
            )));
        }

        if !(2..=MAX_TIMING_WINDOW).contains(&self.governor.window) {
            return Err(AgentError::Config(format!(
                "governor.window ({}) must be within 2..={}",
                self.governor.window, MAX_TIMING_WINDOW
            )));
        }

        if !(0.0..=1.0).contains(&self.governor.percentile) {
            return Err(AgentError::Config(format!(
                "governor.percentile ({}) must be within [0, 1]",
                self.governor.percentile
            )));
        }

        if self.reward.poll_interval_ms == 0 || self.reward.aim_interval_ms == 0 {
            return Err(AgentError::Config(
                "reward polling intervals must be positive".into(),
            ));
        }

        Ok(())
    }
}
