//! MergeService: orchestrates sources, applies merge policy, deserializes to VfsConfig.

use crate::config::sources::{environment, file};
use crate::config::VfsConfig;
use config::ConfigError;
use std::path::Path;

use super::merge_policy;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from `dir` and the environment.
    /// Precedence: defaults (lowest) -> `dir/vfstub.toml` -> environment (highest).
    pub fn load(dir: &Path) -> Result<VfsConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = file::add_to_builder(builder, dir)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    pub fn load_from_file(path: &Path) -> Result<VfsConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = file::add_explicit_to_builder(builder, path)?;
        let builder = environment::add_to_builder(builder)?;

        let config = builder.build()?;
        config.try_deserialize()
    }
}
