use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, RegistryResult};

/// Flush/sync strategy for the record log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every record (safest, highest latency).
    EveryWrite,
    /// Flush to the OS and rely on page-cache buffering.
    #[default]
    OsDefault,
}

/// Configuration for a [`DurableRegistry`](crate::DurableRegistry).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path of the record log file.
    pub path: PathBuf,
    pub sync_mode: SyncMode,
    /// Capacity of per-subscriber broadcast channels.
    pub channel_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hashlog.log"),
            sync_mode: SyncMode::default(),
            channel_capacity: 1024,
        }
    }
}

impl RegistryConfig {
    /// Default configuration pointing at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> RegistryResult<Self> {
        toml::from_str(s).map_err(|e| RegistryError::Config(e.to_string()))
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> RegistryResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RegistryConfig::default();
        assert_eq!(c.path, PathBuf::from("hashlog.log"));
        assert_eq!(c.sync_mode, SyncMode::OsDefault);
        assert_eq!(c.channel_capacity, 1024);
    }

    #[test]
    fn parse_full_toml() {
        let c = RegistryConfig::from_toml_str(
            r#"
            path = "/var/lib/hashlog/entries.log"
            sync_mode = "every_write"
            channel_capacity = 16
            "#,
        )
        .unwrap();
        assert_eq!(c.path, PathBuf::from("/var/lib/hashlog/entries.log"));
        assert_eq!(c.sync_mode, SyncMode::EveryWrite);
        assert_eq!(c.channel_capacity, 16);
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let c = RegistryConfig::from_toml_str("sync_mode = \"every_write\"").unwrap();
        assert_eq!(c.path, PathBuf::from("hashlog.log"));
        assert_eq!(c.channel_capacity, 1024);
    }

    #[test]
    fn rejects_unknown_sync_mode() {
        let err = RegistryConfig::from_toml_str("sync_mode = \"sometimes\"").unwrap_err();
        assert!(matches!(err, RegistryError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hashlog.toml");
        fs::write(&path, "channel_capacity = 8\n").unwrap();
        assert_eq!(RegistryConfig::load(&path).unwrap().channel_capacity, 8);
    }
}
