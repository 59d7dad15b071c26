//! Project configuration for Kiln builds.
//!
//! Loads `kiln.toml` (with an optional `kiln.local.toml` overlay for
//! per-machine settings), validates it, and resolves the concrete build
//! target for a session.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use resolve::{resolve_target, ResolvedTarget};
pub use types::{
    BuildSettings, LaunchSettings, PackageSettings, PathSettings, ProjectConfig, ProjectMeta,
    TargetConfig,
};
