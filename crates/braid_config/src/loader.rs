//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::BraidConfig;
use std::path::Path;

/// Name of the configuration file looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "braid.toml";

/// Loads and validates `<dir>/braid.toml`.
pub fn load_config(dir: &Path) -> Result<BraidConfig, ConfigError> {
    let path = dir.join(CONFIG_FILE_NAME);
    let content =
        std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<BraidConfig, ConfigError> {
    let config: BraidConfig = toml::from_str(content)?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &BraidConfig) -> Result<(), ConfigError> {
    if config.propagation.max_pass_nodes == 0 {
        return Err(ConfigError::OutOfRange {
            key: "propagation.max_pass_nodes",
            min: 1,
            value: config.propagation.max_pass_nodes,
        });
    }
    Ok(())
}
