//! Failures while reading `braid.toml`.

use std::path::PathBuf;

/// Why a `braid.toml` could not be turned into a [`BraidConfig`](crate::BraidConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or is missing.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was opened.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The body is not valid TOML or names an unknown table, key or policy.
    #[error("invalid braid.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// A numeric setting is below its minimum.
    #[error("{key} must be at least {min}, got {value}")]
    OutOfRange {
        /// Dotted key of the setting, e.g. `propagation.max_pass_nodes`.
        key: &'static str,
        /// Smallest accepted value.
        min: usize,
        /// The configured value.
        value: usize,
    },
}
