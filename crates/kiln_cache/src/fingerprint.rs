//! Source fingerprints for compilation units.

use kiln_common::ContentHash;
use std::path::Path;
use std::time::SystemTime;

/// The identity of a compilation unit's managed source artifact at a point
/// in time.
///
/// Combines the artifact's modification time with its content hash. The
/// freshness rule compares cached timestamps against `mtime`; the hash lets
/// the resolver distinguish a genuine edit from a rewrite with identical
/// bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFingerprint {
    /// Last-modified time of the source artifact.
    pub mtime: SystemTime,
    /// Content hash of the source artifact.
    pub hash: ContentHash,
}

impl SourceFingerprint {
    /// Reads the fingerprint of the artifact at `path`.
    ///
    /// Returns `None` if the file doesn't exist or can't be read; callers
    /// treat a missing source artifact as a deleted unit.
    pub fn of(path: &Path) -> Option<Self> {
        let metadata = std::fs::metadata(path).ok()?;
        let mtime = metadata.modified().ok()?;
        let hash = ContentHash::from_file(path)?;
        Some(Self { mtime, hash })
    }
}
