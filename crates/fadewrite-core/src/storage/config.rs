//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Decay timeout and easing curve
//! - Terminal appearance
//! - History archival threshold
//!
//! Configuration is stored at `~/.config/fadewrite/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::data_dir;
use crate::decay::{Easing, TimeoutSeconds};
use crate::error::ConfigError;

const TIMEOUT_KEY: &str = "decay.timeout_seconds";

/// Decay behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayConfig {
    /// Seconds of Decaying allowed before the text is wiped (1..=30).
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u32,
    #[serde(default)]
    pub easing: Easing,
}

/// Terminal appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Text colour while fresh, as `#rrggbb`.
    #[serde(default = "default_ink_color")]
    pub ink_color: String,
    /// Background the text fades into, as `#rrggbb`.
    #[serde(default = "default_paper_color")]
    pub paper_color: String,
    #[serde(default = "default_true")]
    pub show_status: bool,
}

/// History archival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Destroyed buffers with at least this many words are archived.
    #[serde(default = "default_min_words")]
    pub min_words: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/fadewrite/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub decay: DecayConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

// Default functions
fn default_timeout_seconds() -> u32 {
    TimeoutSeconds::DEFAULT.get()
}
fn default_ink_color() -> String {
    "#e4e4e7".into()
}
fn default_paper_color() -> String {
    "#18181b".into()
}
fn default_true() -> bool {
    true
}
fn default_min_words() -> usize {
    3
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            easing: Easing::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            ink_color: default_ink_color(),
            paper_color: default_paper_color(),
            show_status: true,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            decay: DecayConfig::default(),
            ui: UiConfig::default(),
            history: HistoryConfig::default(),
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
        if parts.peek().is_none() {
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
                            .map_err(|_| invalid(format!("'{value}' is not true/false")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/fadewrite"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing the default there if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Config = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                cfg.normalize();
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
            other => Some(other.to_string()),
        }
    }

    /// Validate and apply a value by key without saving.
    ///
    /// On error `self` is left untouched.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        if key == TIMEOUT_KEY {
            TimeoutSeconds::parse(value)?;
        }
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown
    /// or the value is invalid; the prior value is retained in that case.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Timeout as a validated value. Out-of-range file contents are clamped.
    pub fn timeout(&self) -> TimeoutSeconds {
        TimeoutSeconds::clamped(i64::from(self.decay.timeout_seconds))
    }

    pub fn easing(&self) -> Easing {
        self.decay.easing
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    fn normalize(&mut self) {
        let clamped = self.timeout().get();
        if clamped != self.decay.timeout_seconds {
            warn!(
                stored = self.decay.timeout_seconds,
                clamped, "timeout_seconds out of range in config file; clamping"
            );
            self.decay.timeout_seconds = clamped;
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
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
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.decay.timeout_seconds, 5);
        assert_eq!(parsed.history.min_words, 3);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("decay.timeout_seconds").as_deref(), Some("5"));
        assert_eq!(cfg.get("decay.easing").as_deref(), Some("quadratic"));
        assert_eq!(cfg.get("ui.show_status").as_deref(), Some("true"));
        assert!(cfg.get("ui.missing_key").is_none());
    }

    #[test]
    fn apply_updates_timeout() {
        let mut cfg = Config::default();
        cfg.apply("decay.timeout_seconds", "12").unwrap();
        assert_eq!(cfg.timeout().get(), 12);
    }

    #[test]
    fn apply_rejects_out_of_range_timeout_and_keeps_prior() {
        let mut cfg = Config::default();
        cfg.apply("decay.timeout_seconds", "2").unwrap();

        for bad in ["0", "31", "-1"] {
            let err = cfg.apply("decay.timeout_seconds", bad).unwrap_err();
            assert!(matches!(err, ConfigError::OutOfRange { .. }), "{bad}: {err}");
        }
        assert_eq!(cfg.decay.timeout_seconds, 2);
    }

    #[test]
    fn apply_parses_easing() {
        let mut cfg = Config::default();
        cfg.apply("decay.easing", "cubic").unwrap();
        assert_eq!(cfg.easing(), Easing::Cubic);
        assert!(cfg.apply("decay.easing", "wobbly").is_err());
        assert_eq!(cfg.easing(), Easing::Cubic);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("ui.nonexistent_key", "value"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn apply_rejects_invalid_bool() {
        let mut cfg = Config::default();
        assert!(cfg.apply("ui.show_status", "not_a_bool").is_err());
        assert!(cfg.ui.show_status);
    }

    #[test]
    fn out_of_range_file_value_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[decay]\ntimeout_seconds = 90\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.decay.timeout_seconds, 30);
        assert_eq!(cfg.ui, UiConfig::default());
    }

    #[test]
    fn missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[decay\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
