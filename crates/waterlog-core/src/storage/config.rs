//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Daily hydration goal and goal threshold
//! - Notification behaviour and snooze policy
//! - Smart reminder window (wake-up, bed time, interval, active weekdays)
//! - Custom reminders
//!
//! Configuration is stored at `~/.config/waterlog/config.toml`.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::reminder::Weekday;

/// Daily goal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Daily net-hydration goal in milliliters.
    #[serde(default = "default_daily_ml")]
    pub daily_ml: u32,
    /// Goal threshold fraction, 0.8..=1.2.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

/// Notification behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Include hydration progress in the notification payload.
    #[serde(default = "default_true")]
    pub show_progress: bool,
    #[serde(default = "default_true")]
    pub snooze_enabled: bool,
    #[serde(default = "default_snooze_delay")]
    pub snooze_delay_min: u32,
}

/// Interval-generated reminders between wake-up and bed time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartRemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval")]
    pub interval_min: u32,
    #[serde(default = "default_wake_up")]
    pub wake_up: NaiveTime,
    #[serde(default = "default_bed_time")]
    pub bed_time: NaiveTime,
    /// Weekdays on which smart reminders are active.
    #[serde(default = "default_days")]
    pub days: Vec<Weekday>,
}

/// A user-defined reminder with its own active weekdays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomReminder {
    /// Stable id, assigned at creation.
    pub id: String,
    pub time: NaiveTime,
    pub label: String,
    #[serde(default = "default_days")]
    pub days: Vec<Weekday>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl CustomReminder {
    pub fn new(time: NaiveTime, label: impl Into<String>, days: Vec<Weekday>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            time,
            label: label.into(),
            days,
            enabled: true,
        }
    }
}

/// Custom reminder section: a master switch plus the ordered list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRemindersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub items: Vec<CustomReminder>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/waterlog/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub smart_reminders: SmartRemindersConfig,
    #[serde(default)]
    pub custom_reminders: CustomRemindersConfig,
}

// Default functions
fn default_daily_ml() -> u32 {
    2000
}
fn default_threshold() -> f64 {
    1.0
}
fn default_snooze_delay() -> u32 {
    10
}
fn default_interval() -> u32 {
    90
}
fn default_wake_up() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap()
}
fn default_bed_time() -> NaiveTime {
    NaiveTime::from_hms_opt(22, 0, 0).unwrap()
}
fn default_days() -> Vec<Weekday> {
    Weekday::ALL.to_vec()
}
fn default_true() -> bool {
    true
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            daily_ml: default_daily_ml(),
            threshold: default_threshold(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_progress: true,
            snooze_enabled: true,
            snooze_delay_min: default_snooze_delay(),
        }
    }
}

impl Default for SmartRemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_min: default_interval(),
            wake_up: default_wake_up(),
            bed_time: default_bed_time(),
            days: default_days(),
        }
    }
}

impl Default for CustomRemindersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            items: Vec::new(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            goal: GoalConfig::default(),
            notifications: NotificationsConfig::default(),
            smart_reminders: SmartRemindersConfig::default(),
            custom_reminders: CustomRemindersConfig::default(),
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
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| ConfigError::InvalidValue {
                                    key: key.to_string(),
                                    message: format!("cannot represent '{value}' as number"),
                                })?
                        } else {
                            return Err(ConfigError::InvalidValue {
                                key: key.to_string(),
                                message: format!("cannot parse '{value}' as number"),
                            });
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| ConfigError::InvalidValue {
                            key: key.to_string(),
                            message: e.to_string(),
                        })?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/waterlog"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))
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
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning defaults on error. Never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
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

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()?;
        Ok(())
    }

    /// Remove a custom reminder by id. Returns whether one was removed.
    pub fn remove_custom_reminder(&mut self, id: &str) -> bool {
        let before = self.custom_reminders.items.len();
        self.custom_reminders.items.retain(|r| r.id != id);
        self.custom_reminders.items.len() != before
    }
}
