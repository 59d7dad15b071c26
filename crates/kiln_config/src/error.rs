//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `kiln.toml`
/// configuration.
///
/// Configuration errors fail a build fast, before any pipeline stage runs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a configuration file.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// A referenced target name does not exist in the configuration.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// An OS, architecture, or variant string failed to parse.
    #[error("invalid target value: {0}")]
    InvalidTarget(String),

    /// A configured classpath entry does not exist on disk.
    #[error("unresolvable classpath entry: {}", .0.display())]
    UnresolvableClasspathEntry(PathBuf),
}
