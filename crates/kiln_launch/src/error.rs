//! Error types for process launch and supervision.

use std::path::PathBuf;

/// Errors from launching or supervising a process.
///
/// Deliberately distinct from build errors: a launch failure can happen
/// after the binary built successfully, and callers report the two
/// differently.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// The process could not be started.
    #[error("failed to launch {}: {source}", program.display())]
    Spawn {
        /// The binary that failed to start.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A named I/O channel could not be created or opened.
    #[error("failed to set up I/O channel at {}: {source}", path.display())]
    ChannelSetup {
        /// The channel path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Waiting on or signaling the process failed.
    #[error("process control failed: {0}")]
    Control(#[source] std::io::Error),
}
