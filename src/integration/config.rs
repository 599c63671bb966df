//! Configuration for the integration layer
//!
//! Loaded from a TOML file; every field is optional.

use crate::service::PermissionOutcome;
use crate::simulator::{SimulationMode, SimulatorTimings};
use crate::storage::FileStorage;
use crate::{Result, WhispererError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for the complete application
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhispererConfig {
    /// Where saved state lives (defaults to the platform data directory)
    pub storage_path: Option<PathBuf>,

    /// Keep nothing across restarts
    pub in_memory: bool,

    /// Call workflow variant
    pub mode: SimulationMode,

    /// Mock delays
    pub timings: SimulatorTimings,

    /// What the call permission check reports
    pub permission: PermissionOutcome,

    /// Whether the microphone prompt is accepted
    pub microphone_granted: bool,

    /// Log filter directives, `RUST_LOG` syntax
    pub log_filter: Option<String>,
}

impl Default for WhispererConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            in_memory: false,
            mode: SimulationMode::default(),
            timings: SimulatorTimings::default(),
            permission: PermissionOutcome::Granted,
            microphone_granted: true,
            log_filter: None,
        }
    }
}

impl WhispererConfig {
    /// Load a configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            WhispererError::ConfigError(format!("failed reading {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| WhispererError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| WhispererError::ConfigError(e.to_string()))
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timings(mut self, timings: SimulatorTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self.in_memory = false;
        self
    }

    pub fn with_permission(mut self, permission: PermissionOutcome) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_microphone(mut self, granted: bool) -> Self {
        self.microphone_granted = granted;
        self
    }

    /// Disable durable storage
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self.storage_path = None;
        self
    }

    /// Effective storage file, `None` when running in memory
    pub fn resolved_storage_path(&self) -> Option<PathBuf> {
        if self.in_memory {
            return None;
        }
        self.storage_path.clone().or_else(FileStorage::default_path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.timings.validate()?;

        if let Some(path) = &self.storage_path {
            if path.as_os_str().is_empty() {
                return Err("storage path is empty".to_string());
            }
            if path.is_dir() {
                return Err(format!("storage path {:?} is a directory", path));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WhispererConfig::default();
        assert_eq!(config.mode, SimulationMode::Realtime);
        assert_eq!(config.permission, PermissionOutcome::Granted);
        assert!(config.microphone_granted);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = WhispererConfig::default()
            .with_mode(SimulationMode::Direct)
            .with_timings(SimulatorTimings::instant())
            .in_memory();

        assert_eq!(config.mode, SimulationMode::Direct);
        assert_eq!(config.timings.ring_ms, 0);
        assert!(config.resolved_storage_path().is_none());
    }

    #[test]
    fn test_parse_toml() {
        let config = WhispererConfig::from_toml_str(
            r#"
            mode = "direct"
            permission = "denied"
            storage_path = "/tmp/call-whisperer/state.json"

            [timings]
            ring_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, SimulationMode::Direct);
        assert_eq!(config.permission, PermissionOutcome::Denied);
        assert_eq!(config.timings.ring_ms, 500);
        assert_eq!(config.timings.realtime_hold_ms, 10000);
        assert_eq!(
            config.resolved_storage_path(),
            Some(PathBuf::from("/tmp/call-whisperer/state.json"))
        );
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let err = WhispererConfig::from_toml_str("mode = \"telepathy\"").unwrap_err();
        assert!(matches!(err, WhispererError::ConfigError(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("call-whisperer.toml");
        std::fs::write(&path, "in_memory = true\nmicrophone_granted = false\n").unwrap();

        let config = WhispererConfig::load(&path).unwrap();
        assert!(config.in_memory);
        assert!(!config.microphone_granted);
        assert!(WhispererConfig::load(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_directory_storage_path_invalid() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config = WhispererConfig::default().with_storage_path(dir.path());
        assert!(config.validate().is_err());
    }
}
