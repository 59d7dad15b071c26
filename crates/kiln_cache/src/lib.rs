//! Incremental-build state for the Kiln orchestrator.
//!
//! Tracks which native object artifacts are fresh for which compilation
//! units and targets, and resolves the minimal change-set of units to
//! rebuild from changed-artifact notifications. The cache is an in-memory
//! index over filesystem timestamps: it is rebuildable from disk state
//! alone and is never persisted as a durable format.

#![warn(missing_docs)]

pub mod cache;
pub mod changeset;
pub mod error;
pub mod fingerprint;

pub use cache::{ArtifactCache, ArtifactEntry};
pub use changeset::{BuildRequest, ChangeSet, ChangeSetResolver, ChangedUnit};
pub use error::CacheError;
pub use fingerprint::SourceFingerprint;
