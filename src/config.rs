//! Configuration
//!
//! Layered settings for the live filesystem: defaults, then an optional
//! `vfstub.toml`, then `VFSTUB__*` environment variables.

pub mod facade;
pub mod merge;
pub mod sources;

pub use facade::ConfigLoader;

use crate::error::VfsError;
use crate::logging::LoggingConfig;
use crate::tree::TreeOptions;
use crate::types::Platform;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "vfstub.toml";

/// Environment prefix; nested keys use `__`, e.g. `VFSTUB__PERSISTENCE__DEBOUNCE_MS`
pub const ENV_PREFIX: &str = "VFSTUB";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VfsConfig {
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl VfsConfig {
    /// Config persisting to `layout_file` with every other setting defaulted
    pub fn for_layout(layout_file: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.persistence.layout_file = Some(layout_file.into());
        config
    }

    pub fn validate(&self) -> Result<(), VfsError> {
        self.persistence.validate()
    }
}

/// Layout document persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Layout document path; required to open a live filesystem
    #[serde(default)]
    pub layout_file: Option<PathBuf>,

    /// Quiet period after an external change before reloading
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Wait between attempts to read a document held by another writer
    #[serde(default = "default_lock_retry_ms")]
    pub lock_retry_ms: u64,

    /// Attempts before giving up with `Locked`; unset retries forever
    #[serde(default)]
    pub lock_retry_limit: Option<u32>,

    /// Indent the document when saving
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Reload when the document changes on disk
    #[serde(default = "default_true")]
    pub watch: bool,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_lock_retry_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            layout_file: None,
            debounce_ms: default_debounce_ms(),
            lock_retry_ms: default_lock_retry_ms(),
            lock_retry_limit: None,
            pretty: default_true(),
            watch: default_true(),
        }
    }
}

impl PersistenceConfig {
    pub fn validate(&self) -> Result<(), VfsError> {
        if self.lock_retry_ms == 0 {
            return Err(VfsError::ConfigError(
                "persistence.lock_retry_ms must be greater than zero".to_string(),
            ));
        }
        if let Some(path) = &self.layout_file {
            if path.as_os_str().is_empty() {
                return Err(VfsError::ConfigError(
                    "persistence.layout_file must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Platform conventions for the tree; unset fields follow the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub case_sensitive: Option<bool>,
}

impl TreeConfig {
    pub fn options(&self) -> TreeOptions {
        TreeOptions {
            platform: self.platform.unwrap_or_else(Platform::current),
            case_sensitive: self.case_sensitive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VfsConfig::default();
        assert_eq!(config.persistence.debounce_ms, 100);
        assert_eq!(config.persistence.lock_retry_ms, 100);
        assert_eq!(config.persistence.lock_retry_limit, None);
        assert!(config.persistence.pretty);
        assert!(config.persistence.watch);
        assert!(config.validate().is_ok());
        assert_eq!(config.tree.options().platform, Platform::current());
    }

    #[test]
    fn test_zero_retry_interval_rejected() {
        let mut config = VfsConfig::for_layout("layout.json");
        config.persistence.lock_retry_ms = 0;
        assert!(matches!(config.validate(), Err(VfsError::ConfigError(_))));
    }

    #[test]
    fn test_tree_config_options() {
        let tree = TreeConfig {
            platform: Some(Platform::Windows),
            case_sensitive: Some(true),
        };
        let options = tree.options();
        assert_eq!(options.separator(), '\\');
        assert!(options.default_comparer().is_case_sensitive());
    }
}
