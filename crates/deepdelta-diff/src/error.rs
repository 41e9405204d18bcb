//! Error types for the diff crate.
//!
//! Comparing values never fails; these errors come from loading and
//! interpreting diff configuration.

use std::path::PathBuf;

/// Errors that can occur while preparing a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// The configuration file could not be read.
    #[error("cannot read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`DiffConfig`](crate::DiffConfig).
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    /// An ignore pattern has an empty segment.
    #[error("invalid ignore pattern: {0:?}")]
    InvalidIgnorePattern(String),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
