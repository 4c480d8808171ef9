//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Authoring limits (minimum segments, speed and incline caps)
//! - Audio cue settings
//! - Timer cadence
//!
//! Configuration is stored at `~/.config/treadpro/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::workout::{DEFAULT_TICK_INTERVAL, MAX_INCLINE, MAX_SPEED, MIN_SEGMENTS};

/// Bounds enforced while authoring a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    #[serde(default = "default_min_segments")]
    pub min_segments: usize,
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
    #[serde(default = "default_max_incline")]
    pub max_incline: u32,
}

/// Audio cue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 0 ..= 100
    #[serde(default = "default_volume")]
    pub volume: u32,
    #[serde(default = "default_countdown_hz")]
    pub countdown_hz: f32,
    #[serde(default = "default_countdown_ms")]
    pub countdown_ms: u32,
    #[serde(default = "default_segment_end_hz")]
    pub segment_end_hz: f32,
    #[serde(default = "default_segment_end_ms")]
    pub segment_end_ms: u32,
}

/// Timer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Real milliseconds per logical second. Only lower it for demos.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/treadpro/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

// Default functions
fn default_min_segments() -> usize {
    MIN_SEGMENTS
}
fn default_max_speed() -> f64 {
    MAX_SPEED
}
fn default_max_incline() -> u32 {
    MAX_INCLINE
}
fn default_true() -> bool {
    true
}
fn default_volume() -> u32 {
    80
}
fn default_countdown_hz() -> f32 {
    440.0
}
fn default_countdown_ms() -> u32 {
    150
}
fn default_segment_end_hz() -> f32 {
    1200.0
}
fn default_segment_end_ms() -> u32 {
    500
}
fn default_tick_ms() -> u64 {
    DEFAULT_TICK_INTERVAL.as_millis() as u64
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            min_segments: default_min_segments(),
            max_speed: default_max_speed(),
            max_incline: default_max_incline(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: default_volume(),
            countdown_hz: default_countdown_hz(),
            countdown_ms: default_countdown_ms(),
            segment_end_hz: default_segment_end_hz(),
            segment_end_ms: default_segment_end_ms(),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
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

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("using default config: {e}");
            Self::default()
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit the
    /// field. The config is left untouched on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values that would make sessions impossible to author or run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        if self.limits.min_segments == 0 {
            return Err(invalid("limits.min_segments", "must be at least 1"));
        }
        if self.limits.max_speed.is_nan() || self.limits.max_speed <= 0.0 {
            return Err(invalid("limits.max_speed", "must be positive"));
        }
        if self.audio.volume > 100 {
            return Err(invalid("audio.volume", "must be between 0 and 100"));
        }
        if self.timer.tick_ms == 0 {
            return Err(invalid("timer.tick_ms", "must be positive"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.timer.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.limits, Limits::default());
        assert_eq!(parsed.audio.volume, 80);
        assert_eq!(parsed.timer.tick_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[limits]\nmax_speed = 16.0\n").unwrap();
        assert_eq!(parsed.limits.max_speed, 16.0);
        assert_eq!(parsed.limits.min_segments, MIN_SEGMENTS);
        assert!(parsed.audio.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("audio.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("limits.max_incline").as_deref(), Some("15"));
        assert!(cfg.get("audio.missing_key").is_none());
        assert!(cfg.get("limits").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("audio.enabled", "false").unwrap();
        cfg.set("audio.volume", "35").unwrap();
        cfg.set("limits.max_speed", "18.5").unwrap();
        cfg.set("audio.countdown_hz", "500").unwrap();
        assert!(!cfg.audio.enabled);
        assert_eq!(cfg.audio.volume, 35);
        assert_eq!(cfg.limits.max_speed, 18.5);
        assert_eq!(cfg.audio.countdown_hz, 500.0);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("audio.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(cfg.set("audio", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("audio.enabled", "not_a_bool").is_err());
        assert!(cfg.set("audio.volume", "loud").is_err());
        assert!(cfg.set("audio.volume", "12.5").is_err());
        assert_eq!(cfg.audio.volume, 80);
    }

    #[test]
    fn set_rejects_out_of_range() {
        let mut cfg = Config::default();
        assert!(cfg.set("limits.min_segments", "0").is_err());
        assert!(cfg.set("audio.volume", "150").is_err());
        assert!(cfg.set("timer.tick_ms", "0").is_err());
        assert_eq!(cfg.limits.min_segments, MIN_SEGMENTS);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.limits, Limits::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timer.tick_ms", "250").unwrap();
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.tick_ms, 250);
        assert_eq!(loaded.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "limits = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
