//! Parsing and validation of `braid.toml` configuration files.
//!
//! Every section is optional; a missing file section falls back to defaults
//! that match hardware-simulator conventions.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
