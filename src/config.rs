//! Configuration for the hexapod skill
//!
//! Loaded from a TOML file. Every field has a default, so a partial file (or
//! no file at all) is valid.

use anyhow::{bail, Context, Result};
use hexa_shared::{link, motion, Command};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "HEXA_SKILL_CONFIG";

/// Top-level skill configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SkillConfig {
    pub transport: TransportConfig,
    pub motion: MotionConfig,
    pub policy: MotionPolicy,
    pub body: BodyConfig,
    pub logging: LoggingConfig,
}

/// Transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransportConfig {
    /// TCP bind address for the remote client
    pub bind_address: String,
    /// Size of the socket read buffer
    pub read_buffer: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_address: format!("0.0.0.0:{}", link::DEFAULT_PORT),
            read_buffer: 1024,
        }
    }
}

/// Motion constants driving every command
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Target time between command receipt and motion response
    pub reaction_latency_ms: u64,
    /// How long a directional walk is held
    pub move_duration_ms: u64,
    /// Duration of the head recenter move
    pub head_recenter_duration_ms: u64,
    /// Neutral head angle in degrees
    pub head_neutral_deg: f64,
    pub walk_speed: f64,
    pub stand_up_height: f64,
    pub stand_down_height: f64,
    pub forward_deg: f64,
    pub left_deg: f64,
    pub backward_deg: f64,
    pub right_deg: f64,
    /// Pitch swing of the start sequence
    pub start_pitch_deg: f64,
    pub start_pitch_left_ms: u64,
    pub start_pitch_right_ms: u64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            reaction_latency_ms: motion::REACTION_LATENCY_MS,
            move_duration_ms: motion::MOVE_DURATION_MS,
            head_recenter_duration_ms: motion::HEAD_RECENTER_DURATION_MS,
            head_neutral_deg: motion::HEAD_NEUTRAL_DEG,
            walk_speed: motion::WALK_SPEED,
            stand_up_height: motion::STAND_UP_HEIGHT,
            stand_down_height: motion::STAND_DOWN_HEIGHT,
            forward_deg: motion::DIRECTION_FORWARD_DEG,
            left_deg: motion::DIRECTION_LEFT_DEG,
            backward_deg: motion::DIRECTION_BACKWARD_DEG,
            right_deg: motion::DIRECTION_RIGHT_DEG,
            start_pitch_deg: motion::START_PITCH_DEG,
            start_pitch_left_ms: motion::START_PITCH_LEFT_MS,
            start_pitch_right_ms: motion::START_PITCH_RIGHT_MS,
        }
    }
}

impl MotionConfig {
    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }

    pub fn reaction_latency(&self) -> Duration {
        Duration::from_millis(self.reaction_latency_ms)
    }

    /// Duration of the longest motion routine (a walk or the start sequence)
    pub fn longest_routine(&self) -> Duration {
        let start_sequence = self.start_pitch_left_ms + self.start_pitch_right_ms;
        Duration::from_millis(
            self.head_recenter_duration_ms + self.move_duration_ms.max(start_sequence),
        )
    }

    /// Walk heading for a directional command, `None` for anything else
    pub fn walk_direction(&self, command: Command) -> Option<f64> {
        match command {
            Command::Forward => Some(self.forward_deg),
            Command::Left => Some(self.left_deg),
            Command::Backward => Some(self.backward_deg),
            Command::Right => Some(self.right_deg),
            _ => None,
        }
    }

    /// Reject values the body cannot act on
    pub fn validate(&self) -> Result<()> {
        let headings = [
            ("forward_deg", self.forward_deg),
            ("left_deg", self.left_deg),
            ("backward_deg", self.backward_deg),
            ("right_deg", self.right_deg),
        ];
        for (name, angle) in headings {
            if !(0.0..360.0).contains(&angle) {
                bail!("motion.{} must be in [0, 360), got {}", name, angle);
            }
        }
        if self.move_duration_ms == 0 {
            bail!("motion.move_duration_ms must be positive");
        }
        if !self.walk_speed.is_finite() || self.walk_speed <= 0.0 {
            bail!("motion.walk_speed must be positive, got {}", self.walk_speed);
        }
        Ok(())
    }
}

/// How motion tasks interact with each other and with "stop"
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionPolicy {
    /// Abort in-flight motions before starting a new one
    pub preempt_previous: bool,
    /// Let "stop" cut a running hold short
    pub cooperative_stop: bool,
}

/// Simulated body configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Name shown in logs
    pub name: String,
    /// Make `start()` fail, to exercise the aborted connect path
    pub fail_start: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            name: "hexa".into(),
            fail_start: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error); RUST_LOG wins
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl SkillConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config = Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: SkillConfig = toml::from_str(contents)?;
        config.motion.validate()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
