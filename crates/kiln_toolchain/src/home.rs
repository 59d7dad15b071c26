//! Toolchain distribution discovery.

use crate::error::ToolchainError;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

/// Environment variable pointing at a development tree of the toolchain.
pub const DEV_ROOT_ENV: &str = "KILN_DEV_ROOT";

/// Environment variable pointing at an installed distribution.
pub const HOME_ENV: &str = "KILN_HOME";

/// Installed locations searched when neither environment variable is set.
const INSTALL_CANDIDATES: &[&str] = &["/usr/local/lib/kiln", "/opt/kiln"];

/// The root of an installed toolchain distribution.
///
/// Identifies where the compiler, linker, and packager executables and the
/// runtime libraries live. Immutable once resolved. A development tree
/// (selected via `KILN_DEV_ROOT`) enables debug libraries and intermediate
/// dumps in sessions built against it.
#[derive(Debug, Clone)]
pub struct Home {
    root: PathBuf,
    dev_mode: bool,
}

static SHARED: OnceLock<Home> = OnceLock::new();
static RESOLVE_LOCK: Mutex<()> = Mutex::new(());

impl Home {
    /// Validates `root` as a toolchain distribution.
    ///
    /// A distribution must contain a `bin/` directory with the compiler
    /// executable.
    pub fn new(root: PathBuf, dev_mode: bool) -> Result<Self, ToolchainError> {
        let bin = root.join("bin");
        if !bin.is_dir() {
            return Err(ToolchainError::InvalidHome {
                path: root,
                reason: "missing bin/ directory".to_string(),
            });
        }
        if !bin.join("kilnc").exists() {
            return Err(ToolchainError::InvalidHome {
                path: root,
                reason: "missing bin/kilnc".to_string(),
            });
        }
        Ok(Self { root, dev_mode })
    }

    /// Returns the process-wide shared distribution, resolving it on first
    /// call.
    ///
    /// Resolution runs at most once per process: concurrent first callers
    /// serialize on an internal lock and all observe the same `Home`.
    /// Sessions take the result by reference at construction time rather
    /// than re-resolving.
    pub fn shared() -> Result<&'static Home, ToolchainError> {
        if let Some(home) = SHARED.get() {
            return Ok(home);
        }
        let _guard = RESOLVE_LOCK.lock().unwrap();
        if let Some(home) = SHARED.get() {
            return Ok(home);
        }
        let home = Self::find()?;
        Ok(SHARED.get_or_init(|| home))
    }

    /// Locates a distribution without caching.
    ///
    /// Search order: `KILN_DEV_ROOT` (development tree, dev mode on),
    /// `KILN_HOME`, then the conventional install locations.
    pub fn find() -> Result<Self, ToolchainError> {
        if let Some(dev_root) = std::env::var_os(DEV_ROOT_ENV) {
            return Self::new(PathBuf::from(dev_root), true);
        }
        if let Some(home) = std::env::var_os(HOME_ENV) {
            return Self::new(PathBuf::from(home), false);
        }

        let mut searched = Vec::new();
        for candidate in INSTALL_CANDIDATES {
            let path = PathBuf::from(candidate);
            if path.is_dir() {
                if let Ok(home) = Self::new(path.clone(), false) {
                    return Ok(home);
                }
            }
            searched.push(path);
        }
        Err(ToolchainError::HomeNotFound { searched })
    }

    /// Returns the distribution root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` when this is a development tree.
    pub fn is_dev_mode(&self) -> bool {
        self.dev_mode
    }

    /// Path to the unit compiler executable.
    pub fn compiler(&self) -> PathBuf {
        self.root.join("bin").join("kilnc")
    }

    /// Path to the linker executable.
    pub fn linker(&self) -> PathBuf {
        self.root.join("bin").join("kilnld")
    }

    /// Path to the packager executable.
    pub fn packager(&self) -> PathBuf {
        self.root.join("bin").join("kilnpkg")
    }

    /// Path to the bundled runtime library directory.
    pub fn runtime_lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_dist(dir: &Path) {
        std::fs::create_dir_all(dir.join("bin")).unwrap();
        std::fs::write(dir.join("bin/kilnc"), b"").unwrap();
    }

    #[test]
    fn valid_layout_accepted() {
        let dir = tempfile::tempdir().unwrap();
        make_dist(dir.path());
        let home = Home::new(dir.path().to_path_buf(), false).unwrap();
        assert_eq!(home.root(), dir.path());
        assert!(!home.is_dev_mode());
        assert!(home.compiler().ends_with("bin/kilnc"));
    }

    #[test]
    fn missing_bin_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = Home::new(dir.path().to_path_buf(), false).unwrap_err();
        assert!(matches!(err, ToolchainError::InvalidHome { .. }));
    }

    #[test]
    fn missing_compiler_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("bin")).unwrap();
        let err = Home::new(dir.path().to_path_buf(), false).unwrap_err();
        assert!(matches!(err, ToolchainError::InvalidHome { .. }));
    }

    #[test]
    fn dev_mode_flag_carried() {
        let dir = tempfile::tempdir().unwrap();
        make_dist(dir.path());
        let home = Home::new(dir.path().to_path_buf(), true).unwrap();
        assert!(home.is_dev_mode());
    }

    #[test]
    fn tool_paths_under_root() {
        let dir = tempfile::tempdir().unwrap();
        make_dist(dir.path());
        let home = Home::new(dir.path().to_path_buf(), false).unwrap();
        assert_eq!(home.linker(), dir.path().join("bin/kilnld"));
        assert_eq!(home.packager(), dir.path().join("bin/kilnpkg"));
        assert_eq!(home.runtime_lib_dir(), dir.path().join("lib"));
    }
}
