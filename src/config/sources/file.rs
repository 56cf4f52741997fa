//! TOML file sources: the working-directory `vfstub.toml` or an explicit path.

use crate::config::CONFIG_FILE_NAME;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::Path;

/// Add `dir/vfstub.toml` when it exists.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    dir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Ok(builder);
    }
    add_explicit_to_builder(builder, &path)
}

/// Add a required TOML file.
pub fn add_explicit_to_builder(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let name = path
        .to_str()
        .ok_or_else(|| ConfigError::Message(format!("Non UTF-8 config path: {:?}", path)))?;
    Ok(builder.add_source(File::new(name, FileFormat::Toml).required(true)))
}
