//! Flat JSON application configuration.
//!
//! Stores the medication regimen, the interval between doses, the daily
//! session goal, the sound preference and today's completion record.
//! Keys are camelCase to match the persisted file:
//!
//! ```json
//! {
//!   "medicines": ["..."],
//!   "intervalMinutes": 5,
//!   "dailySessions": 4,
//!   "soundEnabled": true,
//!   "todayRecord": { "date": "2026-08-24", "completedSessions": 0 }
//! }
//! ```
//!
//! Stored at `~/.config/instill/config.json`. A missing or unparsable
//! file falls back to defaults; the failure is logged and never reaches
//! the session state machine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::data_dir;
use crate::daily::DailyRecord;
use crate::error::{ConfigError, CoreError, Result};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Dose names, in administration order. Always persisted with at
    /// least one entry.
    pub medicines: Vec<String>,
    /// Wait between confirming one dose and the next alert, in minutes.
    pub interval_minutes: u32,
    /// Daily session goal shown alongside the completion count.
    pub daily_sessions: u32,
    pub sound_enabled: bool,
    pub today_record: DailyRecord,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            medicines: vec![
                "Sodium Hyaluronate".into(),
                "Loteprednol Etabonate".into(),
                "Polyethylene Glycol".into(),
                "Cyclosporine".into(),
            ],
            interval_minutes: 5,
            daily_sessions: 4,
            sound_enabled: true,
            today_record: DailyRecord::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.json"))
    }

    /// Load from disk, falling back to defaults. Never fails: a missing
    /// file is first-run, a broken one is logged and replaced by the
    /// default object.
    pub fn load() -> Self {
        match Self::path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!(error = %e, "config directory unavailable, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    /// Callers treat save failure as non-fatal and log it.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.sanitized())?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Copy with empty-string medicines filtered out. The persisted list
    /// must keep length >= 1, so a list with no usable entries falls back
    /// to the defaults.
    fn sanitized(&self) -> Self {
        let mut cfg = self.clone();
        cfg.medicines = cfg
            .medicines
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if cfg.medicines.is_empty() {
            warn!("no usable medicine names, persisting defaults");
            cfg.medicines = Self::default().medicines;
        }
        cfg
    }

    /// Interval between doses in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        (self.interval_minutes as u64).saturating_mul(60_000)
    }

    /// Get a config value as string by its flat JSON key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match json.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by its flat JSON key. The value is parsed
    /// according to the existing field's type; lists and objects take
    /// JSON literals.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown key or an unparsable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        let serde_json::Value::Object(ref mut obj) = json else {
            return Err(CoreError::Custom("config is not a JSON object".into()));
        };
        let existing = obj
            .get(key)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(value.parse::<bool>().map_err(|_| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as bool"),
                    }
                })?)
            }
            serde_json::Value::Number(_) => {
                serde_json::Value::Number(value.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("cannot parse '{value}' as number"),
                    }
                })?.into())
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: e.to_string(),
                })?
            }
            _ => serde_json::Value::String(value.to_string()),
        };

        obj.insert(key.to_string(), new_value);
        *self = serde_json::from_value(json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let json = serde_json::to_string_pretty(&cfg).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.medicines.len(), 4);
        assert_eq!(parsed.interval_minutes, 5);
        assert_eq!(parsed.daily_sessions, 4);
        assert!(parsed.sound_enabled);
    }

    #[test]
    fn keys_are_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json.get("intervalMinutes").is_some());
        assert!(json.get("todayRecord").unwrap().get("completedSessions").is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = serde_json::from_str(r#"{"intervalMinutes": 15}"#).unwrap();
        assert_eq!(cfg.interval_minutes, 15);
        assert_eq!(cfg.medicines, Config::default().medicines);
        assert_eq!(cfg.today_record, DailyRecord::default());
    }

    #[test]
    fn unparsable_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let cfg = Config::load_from(&path);
        assert_eq!(cfg.interval_minutes, 5);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("config.json"));
        assert_eq!(cfg.medicines.len(), 4);
    }

    #[test]
    fn save_filters_empty_medicine_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config {
            medicines: vec!["  ".into(), "Timolol".into(), String::new()],
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();
        let saved = Config::load_from(&path);
        assert_eq!(saved.medicines, vec!["Timolol".to_string()]);
    }

    #[test]
    fn save_never_persists_an_empty_medicine_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let cfg = Config {
            medicines: vec!["".into()],
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();
        let saved = Config::load_from(&path);
        assert!(!saved.medicines.is_empty());
    }

    #[test]
    fn save_to_unwritable_path_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("config.json");
        let err = Config::default().save_to(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Failed to save configuration"));
        assert!(msg.contains("no-such-dir"));
    }

    #[test]
    fn get_returns_string_for_all_types() {
        let cfg = Config::default();
        assert_eq!(cfg.get("intervalMinutes").as_deref(), Some("5"));
        assert_eq!(cfg.get("soundEnabled").as_deref(), Some("true"));
        assert!(cfg.get("medicines").unwrap().contains("Cyclosporine"));
        assert!(cfg.get("missing").is_none());
    }

    #[test]
    fn set_parses_by_existing_type() {
        let mut cfg = Config::default();
        cfg.set("intervalMinutes", "30").unwrap();
        assert_eq!(cfg.interval_minutes, 30);
        cfg.set("soundEnabled", "false").unwrap();
        assert!(!cfg.sound_enabled);
        cfg.set("medicines", r#"["A","B"]"#).unwrap();
        assert_eq!(cfg.medicines, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_value() {
        let mut cfg = Config::default();
        assert!(cfg.set("nope", "1").is_err());
        assert!(cfg.set("intervalMinutes", "soon").is_err());
        assert!(cfg.set("soundEnabled", "yes").is_err());
    }
}
