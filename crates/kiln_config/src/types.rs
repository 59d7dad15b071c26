//! Configuration types deserialized from `kiln.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The top-level project configuration parsed from `kiln.toml`.
///
/// Contains project metadata, classpath and output locations, build target
/// settings, named target configurations, launch settings, and packaging
/// settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata (name, version, main entry point).
    pub project: ProjectMeta,
    /// Classpath entries and output roots.
    #[serde(default)]
    pub paths: PathSettings,
    /// Default build settings (OS, architecture, variant).
    #[serde(default)]
    pub build: BuildSettings,
    /// Named target configurations overriding the defaults.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
    /// Settings for launching the produced binary.
    #[serde(default)]
    pub launch: LaunchSettings,
    /// Settings for `kiln package`.
    #[serde(default)]
    pub package: PackageSettings,
}

/// Core project metadata required in every `kiln.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name. Scopes build directories and session serialization.
    pub name: String,
    /// The project version string.
    #[serde(default)]
    pub version: String,
    /// Fully-qualified main entry point (e.g. `com.acme.Main`).
    ///
    /// Optional: incremental class builds don't need one, launches do.
    #[serde(default)]
    pub main: Option<String>,
}

/// Classpath entries and compiled-output locations.
#[derive(Debug, Clone, Deserialize)]
pub struct PathSettings {
    /// Classpath entries (jars or class directories), relative to the
    /// project root.
    #[serde(default)]
    pub classpath: Vec<PathBuf>,
    /// Boot classpath entries. When non-empty, the bundled runtime library
    /// is skipped.
    #[serde(default)]
    pub bootclasspath: Vec<PathBuf>,
    /// Roots under which the managed compiler writes its output artifacts.
    ///
    /// Changed-artifact notifications are mapped back to units by matching
    /// against these roots.
    #[serde(default)]
    pub output_roots: Vec<PathBuf>,
    /// Extension of managed output artifacts under the output roots.
    #[serde(default = "default_artifact_ext")]
    pub artifact_ext: String,
}

fn default_artifact_ext() -> String {
    "class".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            classpath: Vec::new(),
            bootclasspath: Vec::new(),
            output_roots: Vec::new(),
            artifact_ext: default_artifact_ext(),
        }
    }
}

/// Default build settings, overridable per named target.
///
/// OS and architecture accept `"auto"`, resolved to the host at session
/// configure time.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSettings {
    /// Target operating system, or `"auto"`.
    #[serde(default = "default_auto")]
    pub os: String,
    /// Target CPU architecture, or `"auto"`.
    #[serde(default = "default_auto")]
    pub arch: String,
    /// Default build variant (`"debug"` or `"release"`).
    #[serde(default = "default_variant")]
    pub variant: String,
    /// Root directory for session build output, relative to the project
    /// root.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
}

fn default_auto() -> String {
    "auto".to_string()
}

fn default_variant() -> String {
    "debug".to_string()
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build/kiln")
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            os: default_auto(),
            arch: default_auto(),
            variant: default_variant(),
            build_dir: default_build_dir(),
        }
    }
}

/// A named target configuration (e.g. `device`, `simulator`).
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Target operating system, or `"auto"`.
    #[serde(default = "default_auto")]
    pub os: String,
    /// Target CPU architecture, or `"auto"`.
    #[serde(default = "default_auto")]
    pub arch: String,
}

/// Settings for launching the produced binary.
#[derive(Debug, Clone, Deserialize)]
pub struct LaunchSettings {
    /// Extra program arguments, split shell-style.
    #[serde(default)]
    pub args: String,
    /// Extra VM arguments, split shell-style and passed before program
    /// arguments.
    #[serde(default)]
    pub vm_args: String,
    /// Environment variables for the launched process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Working directory for the launched process, relative to the project
    /// root.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
    /// Capture stdout/stderr through named pipes rather than OS pipe
    /// buffering.
    #[serde(default = "default_true")]
    pub capture_output: bool,
}

fn default_true() -> bool {
    true
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            args: String::new(),
            vm_args: String::new(),
            env: BTreeMap::new(),
            working_dir: None,
            capture_output: true,
        }
    }
}

/// Settings for `kiln package`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSettings {
    /// Directory the package is installed into, relative to the project
    /// root.
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    /// Code-signing identity name, matched against the signing store.
    #[serde(default)]
    pub signing_identity: Option<String>,
    /// Provisioning profile name.
    #[serde(default)]
    pub provisioning_profile: Option<String>,
}
