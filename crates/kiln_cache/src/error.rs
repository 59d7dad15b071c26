//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur during cache operations.
///
/// Freshness checks are fail-safe (an unreadable artifact is treated as
/// stale), so this enum covers only the operations that must not fail
/// silently, such as advancing artifact timestamps after a compile batch.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while touching or scanning artifacts.
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
