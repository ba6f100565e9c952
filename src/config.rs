use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::common::types::AnyResult;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlaybackConfig {
    /// How long a session may sit idle (empty queue, nothing playing)
    /// before the coordinator leaves the voice channel.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    /// Poll interval of the inactivity watchdog.
    #[serde(default = "default_idle_poll_secs")]
    pub idle_poll_secs: u64,
}

impl PlaybackConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_secs(self.idle_poll_secs.max(1))
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            idle_poll_secs: default_idle_poll_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_true")]
    pub http: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self { http: true }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

impl Config {
    pub fn load() -> AnyResult<Self> {
        if !std::path::Path::new("config.toml").exists() {
            tracing::warn!("config.toml not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string("config.toml")?;
        let config: Config = toml::from_str(&raw)?;
        Ok(config)
    }
}

fn default_idle_timeout_secs() -> u64 {
    600
}

fn default_idle_poll_secs() -> u64 {
    1
}

fn default_true() -> bool {
    true
}
