//! In-memory index of native object artifacts by unit and target.

use crate::changeset::collect_artifacts;
use crate::error::CacheError;
use crate::fingerprint::SourceFingerprint;
use kiln_common::{BuildTarget, ContentHash, UnitName};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::SystemTime;

/// A cached record of one compiled object artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Location of the native object file on disk.
    pub object_path: PathBuf,
    /// The last time this artifact was known fresh.
    pub timestamp: SystemTime,
    /// Hash of the source artifact the object was compiled from. `None`
    /// for entries rebuilt from disk state, where only the mtime survives.
    pub source_hash: Option<ContentHash>,
}

/// Maps (compilation unit, build target) to object artifacts and their
/// last-known-fresh timestamps.
///
/// Shared across concurrently-building scopes, so reads take a shared lock.
/// Timestamps only advance: recording an older timestamp for an existing
/// entry is a no-op, so interleaved writers can never regress an entry.
/// Stale entries are replaced whole, never mutated in place.
pub struct ArtifactCache {
    entries: RwLock<HashMap<(UnitName, BuildTarget), ArtifactEntry>>,
}

impl ArtifactCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Looks up the cached artifact for a unit and target.
    pub fn lookup(&self, unit: &UnitName, target: BuildTarget) -> Option<ArtifactEntry> {
        let entries = self.entries.read().unwrap();
        entries.get(&(unit.clone(), target)).cloned()
    }

    /// Records a compiled artifact for a unit and target.
    ///
    /// If an entry already exists with a newer timestamp, the record is
    /// dropped: timestamps never regress.
    pub fn record(
        &self,
        unit: &UnitName,
        target: BuildTarget,
        object_path: PathBuf,
        timestamp: SystemTime,
        source_hash: Option<ContentHash>,
    ) {
        let mut entries = self.entries.write().unwrap();
        let key = (unit.clone(), target);
        match entries.get(&key) {
            Some(existing) if existing.timestamp > timestamp => {}
            _ => {
                entries.insert(
                    key,
                    ArtifactEntry {
                        object_path,
                        timestamp,
                        source_hash,
                    },
                );
            }
        }
    }

    /// Rebuilds index entries from object files already on disk.
    ///
    /// A new process starts with an empty index, but objects produced by
    /// earlier runs are still valid and carry the batch timestamp as
    /// their on-disk mtime. Each object under `object_dir` is recorded
    /// against its unit at that mtime, with no source hash. Units the
    /// index already holds are left untouched: the in-memory entry knows
    /// at least as much as the disk does, including the source hash.
    /// Unreadable files are skipped.
    pub fn seed_from_disk(&self, object_dir: &Path, target: BuildTarget) {
        let mut objects = Vec::new();
        collect_artifacts(object_dir, "o", &mut objects);
        for path in objects {
            let Some(unit) = UnitName::from_artifact_path(object_dir, &path, "o") else {
                continue;
            };
            if self.lookup(&unit, target).is_some() {
                continue;
            }
            let Ok(mtime) = std::fs::metadata(&path).and_then(|m| m.modified()) else {
                continue;
            };
            self.record(&unit, target, path, mtime, None);
        }
    }

    /// Returns `true` if a cached entry is fresh against the current source
    /// fingerprint.
    ///
    /// An entry is fresh iff the object file still exists on disk AND
    /// either its recorded timestamp is at or after the source's
    /// modification time, or the recorded source hash matches the
    /// fingerprint's. The hash case covers a rewrite with identical bytes:
    /// the mtime advanced but nothing the compiler sees changed.
    pub fn is_fresh(entry: &ArtifactEntry, fingerprint: &SourceFingerprint) -> bool {
        if !entry.object_path.exists() {
            return false;
        }
        entry.timestamp >= fingerprint.mtime || entry.source_hash == Some(fingerprint.hash)
    }

    /// Removes the entry for a unit and target, if present.
    ///
    /// Called when a unit's source artifact has been deleted.
    pub fn evict(&self, unit: &UnitName, target: BuildTarget) {
        let mut entries = self.entries.write().unwrap();
        entries.remove(&(unit.clone(), target));
    }

    /// Removes every entry. Used on full clean.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap();
        entries.clear();
    }

    /// Returns the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().unwrap().is_empty()
    }

    /// Advances all artifacts compiled together in one invocation to a
    /// single "now" timestamp, on disk and in the index, recording each
    /// unit's source hash alongside.
    ///
    /// Units are not compiled in dependency order, so within one batch an
    /// artifact can end up older on disk than artifacts it depends on.
    /// Without this step the next incremental resolution would conclude
    /// "needs rebuild" purely from intra-batch compile-order skew.
    /// Returns the timestamp applied.
    pub fn advance_batch(
        &self,
        compiled: &[(UnitName, PathBuf, ContentHash)],
        target: BuildTarget,
    ) -> Result<SystemTime, CacheError> {
        let now = SystemTime::now();
        for (unit, object_path, source_hash) in compiled {
            if object_path.exists() {
                set_mtime(object_path, now)?;
            }
            self.record(unit, target, object_path.clone(), now, Some(*source_hash));
        }
        Ok(now)
    }
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Sets a file's modification time.
fn set_mtime(path: &Path, time: SystemTime) -> Result<(), CacheError> {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .map_err(|e| CacheError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
    file.set_modified(time).map_err(|e| CacheError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
