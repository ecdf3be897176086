use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const VERSION: u32 = 301;
pub const BACK_COMPAT: u32 = 300;
pub const DEFAULT_PORT: u16 = 3108;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub name: String,
    pub seed: Option<u64>,
    /// Restore a saved round at start-up when one exists.
    pub resume: bool,
    pub save_dir: PathBuf,
    pub max_power_diff: i32,
    pub timing: Timing,
    pub net: NetConfig,
    pub ai: AiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            name: "Player".to_string(),
            seed: None,
            resume: true,
            save_dir: PathBuf::from("."),
            max_power_diff: 10,
            timing: Timing::default(),
            net: NetConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub tick_hz: u32,
    pub move_ms: u64,
    pub flip_ms: u64,
    pub game_over_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            tick_hz: 200,
            move_ms: 250,
            flip_ms: 200,
            game_over_secs: 10,
        }
    }
}

impl Timing {
    pub fn tick(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.tick_hz.max(1) as u64)
    }

    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_ms)
    }

    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_ms)
    }

    pub fn game_over(&self) -> Duration {
        Duration::from_secs(self.game_over_secs)
    }

    /// No animations and no countdown, for headless runs.
    pub fn instant() -> Timing {
        Timing {
            tick_hz: 200,
            move_ms: 0,
            flip_ms: 0,
            game_over_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    pub version: u32,
    pub back_compat: u32,
    pub port: u16,
    pub connect_attempts: u32,
    pub connect_backoff_ms: u64,
    pub mailbox_attempts: u32,
    pub mailbox_step_ms: u64,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            version: VERSION,
            back_compat: BACK_COMPAT,
            port: DEFAULT_PORT,
            connect_attempts: 10,
            connect_backoff_ms: 500,
            mailbox_attempts: 4,
            mailbox_step_ms: 1500,
        }
    }
}

impl NetConfig {
    pub fn is_compatible(&self, version: u32) -> bool {
        version >= self.back_compat
    }

    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.connect_backoff_ms * attempt as u64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub think_ms: u64,
    pub follow_up_ms: u64,
    pub max_bias: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        AiConfig {
            think_ms: 500,
            follow_up_ms: 100,
            max_bias: 3,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.tick_hz == 0 {
            return Err(ConfigError::Invalid("timing.tick_hz must be positive".into()));
        }
        if self.net.mailbox_attempts == 0 {
            return Err(ConfigError::Invalid("net.mailbox_attempts must be positive".into()));
        }
        if self.net.back_compat > self.net.version {
            return Err(ConfigError::Invalid(format!(
                "net.back_compat {} is above net.version {}",
                self.net.back_compat, self.net.version
            )));
        }
        if self.max_power_diff < 0 {
            return Err(ConfigError::Invalid("max_power_diff must not be negative".into()));
        }
        Ok(())
    }
}
