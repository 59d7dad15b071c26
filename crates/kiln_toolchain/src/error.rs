//! Error types for toolchain resolution and invocation.

use kiln_common::Variant;
use std::path::PathBuf;

/// Errors from toolchain resolution and stage invocation.
///
/// `CapabilityUnavailable` is a first-class variant, not a message pattern:
/// the session controller matches on the error kind to decide whether to
/// fall back from a debug to a release attempt. Message text is not a
/// stable contract and is never inspected.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// The toolchain rejected the requested variant for licensing or
    /// permission reasons. Recoverable: the session retries once with the
    /// release variant.
    #[error("toolchain capability unavailable for {variant} builds: {reason}")]
    CapabilityUnavailable {
        /// The variant that was rejected.
        variant: Variant,
        /// The toolchain's stated reason, for display only.
        reason: String,
    },

    /// No toolchain distribution could be located.
    #[error("no toolchain distribution found (searched: {searched:?}); set KILN_HOME or KILN_DEV_ROOT")]
    HomeNotFound {
        /// The locations that were searched.
        searched: Vec<PathBuf>,
    },

    /// A directory does not have the layout of a toolchain distribution.
    #[error("{} is not a toolchain distribution: {reason}", path.display())]
    InvalidHome {
        /// The rejected directory.
        path: PathBuf,
        /// What was missing.
        reason: String,
    },

    /// A toolchain executable could not be spawned.
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        /// The executable that failed to start.
        program: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A link or package stage failed.
    #[error("{stage} failed: {message}")]
    StageFailed {
        /// The stage name ("link" or "package").
        stage: &'static str,
        /// The toolchain's error output.
        message: String,
    },

    /// An I/O error occurred while preparing stage inputs or outputs.
    #[error("toolchain I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl ToolchainError {
    /// Returns `true` for the capability-unavailable case.
    ///
    /// This is the only error kind the debug-to-release fallback responds
    /// to; no other kind is inferred to be recoverable.
    pub fn is_capability_unavailable(&self) -> bool {
        matches!(self, ToolchainError::CapabilityUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_unavailable_is_typed() {
        let err = ToolchainError::CapabilityUnavailable {
            variant: Variant::Debug,
            reason: "no license".to_string(),
        };
        assert!(err.is_capability_unavailable());

        let other = ToolchainError::StageFailed {
            stage: "link",
            message: "undefined symbol".to_string(),
        };
        assert!(!other.is_capability_unavailable());
    }

    #[test]
    fn capability_display() {
        let err = ToolchainError::CapabilityUnavailable {
            variant: Variant::Debug,
            reason: "no license".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "toolchain capability unavailable for debug builds: no license"
        );
    }

    #[test]
    fn stage_failed_display() {
        let err = ToolchainError::StageFailed {
            stage: "package",
            message: "signing identity not found".to_string(),
        };
        assert_eq!(format!("{err}"), "package failed: signing identity not found");
    }
}
