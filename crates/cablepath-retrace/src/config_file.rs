//! Configuration file support for retrace
//!
//! Loads and validates retrace configuration from TOML files.
//! Default location: /etc/cablepath/retrace.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RetraceError};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "/etc/cablepath/retrace.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of plain text
    #[serde(default)]
    pub json: bool,
}

/// Reconciliation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Print a progress dot every this many endpoints
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Compute changes without writing the snapshot
    #[serde(default)]
    pub dry_run: bool,
}

/// Topology source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// Topology snapshot file
    #[serde(default = "default_topology_path")]
    pub path: PathBuf,
}

/// Complete retrace configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetraceConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub reconcile: ReconcileConfig,

    #[serde(default)]
    pub topology: TopologyConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_progress_interval() -> usize {
    100
}

fn default_topology_path() -> PathBuf {
    PathBuf::from("/var/lib/cablepath/topology.json")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
            dry_run: false,
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            path: default_topology_path(),
        }
    }
}

impl RetraceConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                RetraceError::config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            // Logging is not set up yet when the config is read.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                eprintln!(
                    "retrace: Config file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(RetraceError::io(path, e)),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| RetraceError::config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content).map_err(|e| RetraceError::io(path, e))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(RetraceError::config(format!(
                "logging.level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.logging.level
            )));
        }

        if self.reconcile.progress_interval == 0 {
            return Err(RetraceError::config("reconcile.progress_interval must be > 0"));
        }

        if self.topology.path.as_os_str().is_empty() {
            return Err(RetraceError::config("topology.path must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = RetraceConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert_eq!(config.reconcile.progress_interval, 100);
        assert!(!config.reconcile.dry_run);
        assert_eq!(
            config.topology.path,
            PathBuf::from("/var/lib/cablepath/topology.json")
        );
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(RetraceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = RetraceConfig::default();
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_progress_interval() {
        let mut config = RetraceConfig::default();
        config.reconcile.progress_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[logging]
json = true

[reconcile]
progress_interval = 25

[topology]
path = "/srv/dcim/topology.json"
"#;
        let config: RetraceConfig = toml::from_str(toml_str).unwrap();
        assert!(config.logging.json);
        assert_eq!(config.reconcile.progress_interval, 25);
        assert_eq!(config.topology.path, PathBuf::from("/srv/dcim/topology.json"));
        // Unspecified values should use defaults
        assert_eq!(config.logging.level, "info");
        assert!(!config.reconcile.dry_run);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retrace.toml");

        let mut config = RetraceConfig::default();
        config.reconcile.dry_run = true;
        config.logging.level = "debug".to_string();
        config.save(&path).unwrap();

        assert_eq!(RetraceConfig::load_or_default(&path).unwrap(), config);
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = RetraceConfig::load_or_default("/nonexistent/retrace.toml").unwrap();
        assert_eq!(config, RetraceConfig::default());
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retrace.toml");
        fs::write(&path, "[reconcile\nprogress_interval = ").unwrap();

        let err = RetraceConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, RetraceError::Configuration(_)));
    }
}
