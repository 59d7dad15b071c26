//! Change-set resolution: which units must be rebuilt.

use crate::cache::ArtifactCache;
use crate::fingerprint::SourceFingerprint;
use kiln_common::{BuildTarget, UnitName};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// What triggered a build: everything, or a delta of changed artifact paths
/// reported by an external change-notification source.
#[derive(Debug, Clone)]
pub enum BuildRequest {
    /// Rebuild every known unit.
    Full,
    /// Rebuild only units whose output artifacts are in the delta.
    Incremental(Vec<PathBuf>),
}

/// A unit scheduled for recompilation, with the managed artifact that
/// triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedUnit {
    /// The unit's qualified name.
    pub unit: UnitName,
    /// The managed output artifact the unit was mapped from.
    pub artifact: PathBuf,
    /// The fingerprint the staleness decision was made against. Recorded
    /// into the cache after the unit compiles.
    pub fingerprint: SourceFingerprint,
}

/// The resolved minimal set of units requiring rebuild.
///
/// Order is insertion order of discovery; it matters only for progress
/// reporting, not correctness.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    /// Units to recompile.
    pub units: Vec<ChangedUnit>,
    /// Units whose source artifacts were deleted; evicted, not rebuilt.
    pub deleted: Vec<UnitName>,
}

impl ChangeSet {
    /// Returns `true` if no units need recompiling.
    ///
    /// An empty change-set means "no work": the session controller
    /// short-circuits without invoking the toolchain at all.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the number of units to recompile.
    pub fn len(&self) -> usize {
        self.units.len()
    }
}

/// Computes the minimal change-set for a build request.
///
/// Maps changed output-artifact paths back to their owning units via the
/// configured output roots, deduplicates by unit identity, and drops units
/// whose cached artifact is still fresh against the on-disk fingerprint.
pub struct ChangeSetResolver {
    output_roots: Vec<PathBuf>,
    artifact_ext: String,
}

impl ChangeSetResolver {
    /// Creates a resolver over the given output roots and managed artifact
    /// extension.
    pub fn new(output_roots: Vec<PathBuf>, artifact_ext: impl Into<String>) -> Self {
        Self {
            output_roots,
            artifact_ext: artifact_ext.into(),
        }
    }

    /// Resolves the set of units requiring rebuild for `target`.
    ///
    /// For a full build (or when the notification source has no prior
    /// state), every artifact found under the output roots is treated as
    /// changed. Changed paths that match no configured root are silently
    /// ignored: they cannot be attributed to a unit. Freshness is always
    /// judged against the fingerprint read from disk, never against any
    /// timestamp carried by the notification itself.
    pub fn resolve(
        &self,
        request: &BuildRequest,
        cache: &ArtifactCache,
        target: BuildTarget,
    ) -> ChangeSet {
        let changed_paths = match request {
            BuildRequest::Full => self.scan_output_roots(),
            BuildRequest::Incremental(paths) => paths.clone(),
        };

        let mut seen: HashSet<UnitName> = HashSet::new();
        let mut changeset = ChangeSet::default();

        for path in changed_paths {
            let Some(unit) = self.map_to_unit(&path) else {
                continue;
            };
            if !seen.insert(unit.clone()) {
                continue;
            }

            let Some(fingerprint) = SourceFingerprint::of(&path) else {
                // Source artifact is gone; drop the stale cache entry but
                // don't schedule a rebuild for it.
                cache.evict(&unit, target);
                changeset.deleted.push(unit);
                continue;
            };

            let fresh = cache
                .lookup(&unit, target)
                .is_some_and(|entry| ArtifactCache::is_fresh(&entry, &fingerprint));
            if !fresh {
                changeset.units.push(ChangedUnit {
                    unit,
                    artifact: path,
                    fingerprint,
                });
            }
        }

        changeset
    }

    /// Maps a changed artifact path to its owning unit, trying each
    /// configured output root in order.
    fn map_to_unit(&self, path: &Path) -> Option<UnitName> {
        self.output_roots
            .iter()
            .find_map(|root| UnitName::from_artifact_path(root, path, &self.artifact_ext))
    }

    /// Collects every managed artifact under the output roots, in
    /// deterministic (sorted) order per root.
    fn scan_output_roots(&self) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for root in &self.output_roots {
            let mut found = Vec::new();
            collect_artifacts(root, &self.artifact_ext, &mut found);
            found.sort();
            paths.extend(found);
        }
        paths
    }
}

/// Recursively collects files with the given extension under `dir`.
pub(crate) fn collect_artifacts(dir: &Path, ext: &str, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_artifacts(&path, ext, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_common::{Arch, Os, Variant};
    use std::time::{Duration, SystemTime};

    fn target() -> BuildTarget {
        BuildTarget::new(Os::Linux, Arch::X86_64, Variant::Debug)
    }

    fn write_class(root: &Path, rel: &str) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, rel.as_bytes()).unwrap();
        path
    }

    #[test]
    fn maps_changed_path_to_unit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        let foo = write_class(&root, "com/acme/Foo.class");

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cache = ArtifactCache::new();
        let cs = resolver.resolve(
            &BuildRequest::Incremental(vec![foo.clone()]),
            &cache,
            target(),
        );

        assert_eq!(cs.len(), 1);
        assert_eq!(cs.units[0].unit.as_str(), "com.acme.Foo");
        assert_eq!(cs.units[0].artifact, foo);
    }

    #[test]
    fn unmapped_path_silently_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        std::fs::create_dir_all(&root).unwrap();
        let stray = write_class(dir.path(), "elsewhere/Foo.class");

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cache = ArtifactCache::new();
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![stray]), &cache, target());
        assert!(cs.is_empty());
    }

    #[test]
    fn deduplicates_by_unit_identity() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        let foo = write_class(&root, "com/acme/Foo.class");

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cache = ArtifactCache::new();
        let cs = resolver.resolve(
            &BuildRequest::Incremental(vec![foo.clone(), foo]),
            &cache,
            target(),
        );
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn full_build_discovers_all_units() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        write_class(&root, "com/acme/Foo.class");
        write_class(&root, "com/acme/Bar.class");
        write_class(&root, "notes.txt");

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cache = ArtifactCache::new();
        let cs = resolver.resolve(&BuildRequest::Full, &cache, target());

        let names: Vec<&str> = cs.units.iter().map(|u| u.unit.as_str()).collect();
        assert_eq!(names, vec!["com.acme.Bar", "com.acme.Foo"]);
    }

    #[test]
    fn fresh_units_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        let foo = write_class(&root, "com/acme/Foo.class");
        let object = dir.path().join("Foo.o");
        std::fs::write(&object, b"obj").unwrap();

        let cache = ArtifactCache::new();
        // Recorded after the source's mtime: fresh
        cache.record(
            &UnitName::new("com.acme.Foo"),
            target(),
            object,
            SystemTime::now() + Duration::from_secs(5),
            None,
        );

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![foo]), &cache, target());
        assert!(cs.is_empty());
    }

    #[test]
    fn notification_for_unchanged_artifact_is_no_work() {
        // A notification reporting the same path with no real change:
        // the fingerprint on disk hasn't advanced past the recorded
        // timestamp, so the resolver returns zero units.
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("out");
        let main = write_class(&root, "app/Main.class");
        let object = dir.path().join("Main.o");
        std::fs::write(&object, b"obj").unwrap();

        let source_mtime = std::fs::metadata(&main).unwrap().modified().unwrap();
        let cache = ArtifactCache::new();
        cache.record(&UnitName::new("app.Main"), target(), object, source_mtime, None);

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![main]), &cache, target());
        assert!(cs.is_empty());
    }

    #[test]
    fn newer_source_fingerprint_forces_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        let foo = write_class(&root, "com/acme/Foo.class");
        let object = dir.path().join("Foo.o");
        std::fs::write(&object, b"obj").unwrap();

        let cache = ArtifactCache::new();
        // Recorded well before the source's mtime: stale
        cache.record(
            &UnitName::new("com.acme.Foo"),
            target(),
            object,
            SystemTime::now() - Duration::from_secs(3600),
            None,
        );

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![foo]), &cache, target());
        assert_eq!(cs.len(), 1);
    }

    #[test]
    fn seeded_disk_state_satisfies_freshness() {
        // A new process starts with an empty index. An object on disk
        // newer than its source must still count as fresh once the index
        // is seeded, not be scheduled for rebuild.
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        let foo = write_class(&root, "com/acme/Foo.class");

        let object_dir = dir.path().join("objects");
        let object = object_dir.join("com/acme/Foo.o");
        std::fs::create_dir_all(object.parent().unwrap()).unwrap();
        std::fs::write(&object, b"obj").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&object)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(60))
            .unwrap();

        let cache = ArtifactCache::new();
        cache.seed_from_disk(&object_dir, target());

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![foo]), &cache, target());
        assert!(cs.is_empty());
    }

    #[test]
    fn rewrite_with_identical_bytes_is_fresh() {
        use kiln_common::ContentHash;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        let foo = write_class(&root, "com/acme/Foo.class");
        let object = dir.path().join("Foo.o");
        std::fs::write(&object, b"obj").unwrap();

        let cache = ArtifactCache::new();
        // Recorded well before the rewrite, with the hash of the bytes
        // that were compiled
        cache.record(
            &UnitName::new("com.acme.Foo"),
            target(),
            object,
            SystemTime::now() - Duration::from_secs(3600),
            Some(ContentHash::from_file(&foo).unwrap()),
        );

        // Rewrite the artifact with identical bytes; only the mtime moves
        std::fs::File::options()
            .write(true)
            .open(&foo)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![foo]), &cache, target());
        assert!(cs.is_empty());
    }

    #[test]
    fn deleted_source_evicts_without_rebuilding() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("classes");
        std::fs::create_dir_all(root.join("com/acme")).unwrap();
        let gone = root.join("com/acme/Gone.class");

        let cache = ArtifactCache::new();
        cache.record(
            &UnitName::new("com.acme.Gone"),
            target(),
            dir.path().join("Gone.o"),
            SystemTime::now(),
            None,
        );

        let resolver = ChangeSetResolver::new(vec![root], "class");
        let cs = resolver.resolve(&BuildRequest::Incremental(vec![gone]), &cache, target());

        assert!(cs.is_empty());
        assert_eq!(cs.deleted.len(), 1);
        assert!(cache
            .lookup(&UnitName::new("com.acme.Gone"), target())
            .is_none());
    }
}
