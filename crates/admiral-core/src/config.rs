//! Configuration for the ADMIRAL dashboard.
//!
//! Settings are read from `~/.admiral/config.yaml` (or a path given on the
//! command line). Every section is optional; a missing default file means
//! defaults, a malformed file is an error surfaced at startup.
//!
//! ```yaml
//! layout:
//!   compact_below: 120
//! gate:
//!   capacity: 16
//!   question_timeout_secs: 900
//! ui:
//!   tick_rate_ms: 50
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AdmiralError, Result};
use crate::logging::admiral_home;

/// Config file name inside `~/.admiral`.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Terminal width at which the layout switches from compact to standard.
pub const DEFAULT_COMPACT_BELOW: u16 = 120;

/// Default number of unconsumed questions the gate buffers.
pub const DEFAULT_GATE_CAPACITY: usize = 16;

/// Default event poll interval for the UI loop.
pub const DEFAULT_TICK_RATE_MS: u64 = 50;

/// Top-level ADMIRAL configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmiralConfig {
    /// Responsive layout settings
    pub layout: LayoutSettings,
    /// Question gate settings
    pub gate: GateSettings,
    /// Event loop settings
    pub ui: UiSettings,
}

/// Responsive layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Widths below this render the compact (stacked) layout.
    pub compact_below: u16,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            compact_below: DEFAULT_COMPACT_BELOW,
        }
    }
}

/// Question gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Mailbox depth: questions asked but not yet consumed by the UI.
    pub capacity: usize,
    /// Applied to questions asked without their own deadline. None waits forever.
    pub question_timeout_secs: Option<u64>,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_GATE_CAPACITY,
            question_timeout_secs: None,
        }
    }
}

impl GateSettings {
    /// The default question timeout as a [`Duration`].
    pub fn question_timeout(&self) -> Option<Duration> {
        self.question_timeout_secs.map(Duration::from_secs)
    }
}

/// Event loop settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// How long the loop waits for input before redrawing.
    pub tick_rate_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

impl UiSettings {
    /// The tick rate as a [`Duration`].
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

/// Default config file path (`~/.admiral/config.yaml`).
pub fn default_config_path() -> Result<PathBuf> {
    Ok(admiral_home()?.join(CONFIG_FILE_NAME))
}

impl AdmiralConfig {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist. Without one, the default
    /// path is tried and a missing file yields [`AdmiralConfig::default`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    /// Read and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AdmiralError::config_not_found_with_source(path, e)
            } else {
                AdmiralError::io("reading config", path, e)
            }
        })?;

        let config = Self::parse(&content).map_err(|e| match e {
            AdmiralError::ConfigInvalid { message, .. } => {
                AdmiralError::config_invalid(path, message)
            }
            other => other,
        })?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML content.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| AdmiralError::config_invalid("<inline>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the dashboard cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.gate.capacity == 0 {
            return Err(AdmiralError::config_validation(
                "gate.capacity must be at least 1",
            ));
        }
        if self.layout.compact_below == 0 {
            return Err(AdmiralError::config_validation(
                "layout.compact_below must be at least 1",
            ));
        }
        if self.ui.tick_rate_ms == 0 {
            return Err(AdmiralError::config_validation(
                "ui.tick_rate_ms must be at least 1",
            ));
        }
        if self.gate.question_timeout_secs == Some(0) {
            return Err(AdmiralError::config_validation(
                "gate.question_timeout_secs must be omitted or at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AdmiralConfig::default();
        assert_eq!(config.layout.compact_below, 120);
        assert_eq!(config.gate.capacity, 16);
        assert_eq!(config.gate.question_timeout(), None);
        assert_eq!(config.ui.tick_rate(), Duration::from_millis(50));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = AdmiralConfig::parse("gate:\n  capacity: 4\n").unwrap();
        assert_eq!(config.gate.capacity, 4);
        assert_eq!(config.layout.compact_below, DEFAULT_COMPACT_BELOW);
        assert_eq!(config.ui.tick_rate_ms, DEFAULT_TICK_RATE_MS);
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
layout:
  compact_below: 100
gate:
  capacity: 2
  question_timeout_secs: 30
ui:
  tick_rate_ms: 20
"#;
        let config = AdmiralConfig::parse(yaml).unwrap();
        assert_eq!(config.layout.compact_below, 100);
        assert_eq!(config.gate.question_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.ui.tick_rate_ms, 20);
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(AdmiralConfig::parse("  \n").unwrap(), AdmiralConfig::default());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = AdmiralConfig::parse("gate:\n  capacity: 0\n").unwrap_err();
        assert!(matches!(err, AdmiralError::ConfigValidation { .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AdmiralConfig::parse("gate:\n  question_timeout_secs: 0\n").unwrap_err();
        assert!(err.to_string().contains("question_timeout_secs"));
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "gate: [not, a, mapping").unwrap();

        let err = AdmiralConfig::from_file(file.path()).unwrap_err();
        match err {
            AdmiralError::ConfigInvalid { path, .. } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_explicit_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = AdmiralConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, AdmiralError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "layout:\n  compact_below: 90").unwrap();

        let config = AdmiralConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.layout.compact_below, 90);
    }
}
