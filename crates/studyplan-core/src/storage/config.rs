//! TOML-based application configuration.
//!
//! Stores user preferences for schedule generation:
//! - Weekly hour budget and the daily per-subject goal
//! - The default plan used when the CLI is given none
//!
//! Configuration is stored at `~/.config/studyplan/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;

/// Schedule-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_weekly_hours")]
    pub weekly_hours: u32,
    #[serde(default = "default_daily_goal_minutes")]
    pub daily_goal_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyplan/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Plan used by `schedule week` when no plan id is given.
    #[serde(default)]
    pub default_plan: Option<String>,
}

fn default_weekly_hours() -> u32 {
    28
}
fn default_daily_goal_minutes() -> u32 {
    60
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weekly_hours: default_weekly_hours(),
            daily_goal_minutes: default_daily_goal_minutes(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule: ScheduleConfig::default(),
            default_plan: None,
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
        Self::load_from(&Self::path()?)
    }

    fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
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
        self.save_to(&Self::path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Weekly budget in minutes.
    pub fn weekly_minutes(&self) -> i64 {
        i64::from(self.schedule.weekly_hours) * 60
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist. Returns error if the key is
    /// unknown or the value cannot be parsed as the existing type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut parts = key.split('.').peekable();
    if parts.peek().is_none() {
        return Err("config key is empty".into());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        let is_leaf = parts.peek().is_none();
        if is_leaf {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            let existing = obj
                .get(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        return Err(format!("cannot parse '{value}' as number").into());
                    }
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        current = current
            .get_mut(part)
            .ok_or_else(|| format!("unknown config key: {key}"))?;
    }

    Err(format!("unknown config key: {key}").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.schedule.weekly_hours, 28);
        assert_eq!(parsed.schedule.daily_goal_minutes, 60);
        assert!(parsed.default_plan.is_none());
    }

    #[test]
    fn weekly_minutes_from_hours() {
        let cfg = Config::default();
        assert_eq!(cfg.weekly_minutes(), 1680);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("schedule.weekly_hours").as_deref(), Some("28"));
        assert_eq!(
            cfg.get("schedule.daily_goal_minutes").as_deref(),
            Some("60")
        );
        assert!(cfg.get("schedule.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        set_json_value_by_path(&mut json, "schedule.weekly_hours", "40").unwrap();
        assert_eq!(
            json["schedule"]["weekly_hours"],
            serde_json::Value::Number(40.into())
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(set_json_value_by_path(&mut json, "schedule.nope", "1").is_err());
        assert!(set_json_value_by_path(&mut json, "", "1").is_err());
    }

    #[test]
    fn set_json_value_by_path_rejects_invalid_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = set_json_value_by_path(&mut json, "schedule.weekly_hours", "lots");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.schedule.weekly_hours, 28);
        assert!(path.exists());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.schedule.weekly_hours = 35;
        cfg.default_plan = Some("plan-1".to_string());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.schedule.weekly_hours, 35);
        assert_eq!(loaded.default_plan.as_deref(), Some("plan-1"));
    }
}
