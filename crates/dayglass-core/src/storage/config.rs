//! TOML-based application configuration.
//!
//! Tunables for the learning engine, the staging scheduler and vibe
//! tracking. Stored at `~/.config/dayglass/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Learning engine tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningConfig {
    /// Event history cap (FIFO eviction past this).
    #[serde(default = "default_max_events")]
    pub max_events: usize,
    /// Minimum spacing between analysis runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// New events since the last run that force a full re-analysis.
    #[serde(default = "default_full_reanalysis_delta")]
    pub full_reanalysis_delta: usize,
    /// Below this many events every run is a full one.
    #[serde(default = "default_min_events_for_incremental")]
    pub min_events_for_incremental: usize,
    /// Events considered by incremental alignment.
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
}

/// Staging scheduler tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingConfig {
    #[serde(default = "default_chain_buffer_minutes")]
    pub chain_buffer_minutes: i64,
    /// Days searched for pillar slots, today included.
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    #[serde(default = "default_max_slots_per_pillar")]
    pub max_slots_per_pillar: usize,
}

/// Vibe tracking tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibeConfig {
    #[serde(default = "default_history_days")]
    pub history_days: usize,
    /// Trailing days that must agree before a season is updated.
    #[serde(default = "default_season_window")]
    pub season_window: usize,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub learning: LearningConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub vibe: VibeConfig,
}

fn default_max_events() -> usize {
    1000
}
fn default_debounce_ms() -> u64 {
    2000
}
fn default_full_reanalysis_delta() -> usize {
    10
}
fn default_min_events_for_incremental() -> usize {
    20
}
fn default_recent_window() -> usize {
    10
}
fn default_chain_buffer_minutes() -> i64 {
    5
}
fn default_lookahead_days() -> u32 {
    3
}
fn default_max_slots_per_pillar() -> usize {
    2
}
fn default_history_days() -> usize {
    14
}
fn default_season_window() -> usize {
    7
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            max_events: default_max_events(),
            debounce_ms: default_debounce_ms(),
            full_reanalysis_delta: default_full_reanalysis_delta(),
            min_events_for_incremental: default_min_events_for_incremental(),
            recent_window: default_recent_window(),
        }
    }
}

impl LearningConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            chain_buffer_minutes: default_chain_buffer_minutes(),
            lookahead_days: default_lookahead_days(),
            max_slots_per_pillar: default_max_slots_per_pillar(),
        }
    }
}

impl Default for VibeConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            season_window: default_season_window(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".to_string(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let (parent_path, leaf) = match key.rsplit_once('.') {
            Some((parent, leaf)) => (Some(parent), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        if let Some(parent) = parent_path {
            for part in parent.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<i64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as integer")).into());
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(invalid("cannot set a whole section".to_string()).into());
            }
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .map_err(|e| ConfigError::ParseFailed(e.to_string()).into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the existing field's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Flattened `key = value` listing of every leaf setting.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }
}
