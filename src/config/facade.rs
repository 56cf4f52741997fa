//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::VfsConfig;
use crate::error::VfsError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from `vfstub.toml` in `dir` (if present) and the environment.
    pub fn load(dir: &Path) -> Result<VfsConfig, VfsError> {
        let config = MergeService::load(dir)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file with environment overlay; the file must exist.
    pub fn load_from_file(path: &Path) -> Result<VfsConfig, VfsError> {
        let config = MergeService::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> VfsConfig {
        VfsConfig::default()
    }
}
