//! Baseline values every merged configuration starts from.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};

/// Builder seeded with the persistence and logging defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("persistence.debounce_ms", 100)?
        .set_default("persistence.lock_retry_ms", 100)?
        .set_default("persistence.pretty", true)?
        .set_default("persistence.watch", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stderr")
}
