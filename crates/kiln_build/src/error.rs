//! Error types for session orchestration.

use std::path::PathBuf;

/// Errors raised while driving a build session.
///
/// Stage failures and per-unit compile errors are reported as diagnostics
/// in the session result, not as `BuildError`: this type covers the
/// problems that prevent a stage from running at all.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A toolchain invocation failed at the invocation level.
    #[error(transparent)]
    Toolchain(#[from] kiln_toolchain::ToolchainError),

    /// The artifact cache could not update an object file.
    #[error(transparent)]
    Cache(#[from] kiln_cache::CacheError),

    /// Session directories could not be prepared.
    #[error("build I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Linking was requested but no main entry point is configured.
    #[error("no main entry point configured; set project.main")]
    MissingEntryPoint,
}
