//! TOML-based application configuration.
//!
//! Stores the reminder notifier settings (mail-gateway endpoint, sender
//! address, per-send timeout).
//!
//! Configuration is stored at `~/.config/habitforge/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;

/// Notifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Mail-gateway webhook endpoint. Reminders are dropped with a logged
    /// warning when unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Sender address reported to the gateway.
    #[serde(default = "default_from")]
    pub from: String,
    /// Upper bound for a single delivery attempt.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/habitforge/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifier: NotifierConfig,
}

// Default functions
fn default_from() -> String {
    "reminders@habitforge.local".into()
}
fn default_send_timeout_secs() -> u64 {
    10
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            from: default_from(),
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notifier: NotifierConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, swallowing errors into the default.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
