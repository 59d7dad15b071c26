//! Qualified compilation-unit names and their path translations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// The fully-qualified name of a compilation unit, e.g. `com.acme.Foo`.
///
/// A unit is the smallest independently recompilable source entity tracked
/// by the artifact cache. Names use `.` as the package separator and map to
/// slash-separated relative paths in output directories.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct UnitName(String);

impl UnitName {
    /// Creates a unit name from a dot-separated qualified name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the qualified name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Maps a changed output-artifact path back to its owning unit.
    ///
    /// Succeeds when `root` is a prefix of `path` and the file carries the
    /// expected artifact extension: the root is stripped, the extension is
    /// stripped, and path separators are translated to `.`. Returns `None`
    /// for paths outside the root or with a different extension; such paths
    /// cannot be attributed to a unit and are ignored by the resolver.
    pub fn from_artifact_path(root: &Path, path: &Path, ext: &str) -> Option<Self> {
        let rel = path.strip_prefix(root).ok()?;
        if rel.extension().and_then(|e| e.to_str()) != Some(ext) {
            return None;
        }
        let stem = rel.with_extension("");
        let mut name = String::new();
        for component in stem.components() {
            if !name.is_empty() {
                name.push('.');
            }
            name.push_str(component.as_os_str().to_str()?);
        }
        if name.is_empty() {
            return None;
        }
        Some(Self(name))
    }

    /// Returns the unit's relative path with the given extension,
    /// e.g. `com.acme.Foo` with `"o"` becomes `com/acme/Foo.o`.
    pub fn to_rel_path(&self, ext: &str) -> PathBuf {
        let mut path: PathBuf = self.0.split('.').collect();
        path.set_extension(ext);
        path
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
