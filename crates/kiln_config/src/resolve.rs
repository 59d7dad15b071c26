//! Resolution of the concrete build target for one session.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use kiln_common::{Arch, BuildTarget, Os, Variant};
use std::path::{Path, PathBuf};

/// The fully-resolved build scope for one session.
///
/// Collapses the configuration's defaults, an optional named target, and
/// CLI overrides into one concrete [`BuildTarget`], and carries the absolute
/// paths a session needs. Exactly one `ResolvedTarget` exists per session.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Project name from configuration.
    pub project: String,
    /// The configuration name this session runs under: a named target or
    /// `"default"`. Sessions for the same (project, config name) serialize.
    pub config_name: String,
    /// The concrete (OS, architecture, variant) to build for.
    pub target: BuildTarget,
    /// Absolute classpath entries, in configuration order.
    pub classpath: Vec<PathBuf>,
    /// Absolute boot classpath entries.
    pub bootclasspath: Vec<PathBuf>,
    /// Absolute output roots for changed-artifact mapping.
    pub output_roots: Vec<PathBuf>,
    /// Managed artifact extension (e.g. `class`).
    pub artifact_ext: String,
    /// Absolute root for session build directories.
    pub build_dir: PathBuf,
    /// Main entry point, if configured.
    pub main: Option<String>,
}

/// Resolves the concrete build target for a session.
///
/// `target_name` selects a named `[targets.*]` entry; `None` uses the
/// `[build]` defaults. `variant_override` (from the CLI) wins over the
/// configured variant. Relative paths are made absolute against
/// `project_dir`. Classpath entries that don't exist on disk fail
/// resolution, before any stage runs.
pub fn resolve_target(
    config: &ProjectConfig,
    project_dir: &Path,
    target_name: Option<&str>,
    variant_override: Option<Variant>,
) -> Result<ResolvedTarget, ConfigError> {
    let (config_name, os_str, arch_str) = match target_name {
        Some(name) => {
            let tc = config
                .targets
                .get(name)
                .ok_or_else(|| ConfigError::UnknownTarget(name.to_string()))?;
            (name.to_string(), tc.os.as_str(), tc.arch.as_str())
        }
        None => (
            "default".to_string(),
            config.build.os.as_str(),
            config.build.arch.as_str(),
        ),
    };

    let os: Os = os_str
        .parse()
        .map_err(|e| ConfigError::InvalidTarget(format!("{e}")))?;
    let arch: Arch = arch_str
        .parse()
        .map_err(|e| ConfigError::InvalidTarget(format!("{e}")))?;

    let variant = match variant_override {
        Some(v) => v,
        None => match config.build.variant.as_str() {
            "debug" => Variant::Debug,
            "release" => Variant::Release,
            other => {
                return Err(ConfigError::InvalidTarget(format!(
                    "unknown variant '{other}'"
                )))
            }
        },
    };

    let absolutize = |p: &PathBuf| {
        if p.is_absolute() {
            p.clone()
        } else {
            project_dir.join(p)
        }
    };

    let classpath: Vec<PathBuf> = config.paths.classpath.iter().map(absolutize).collect();
    for entry in &classpath {
        if !entry.exists() {
            return Err(ConfigError::UnresolvableClasspathEntry(entry.clone()));
        }
    }

    Ok(ResolvedTarget {
        project: config.project.name.clone(),
        config_name,
        target: BuildTarget::new(os, arch, variant),
        classpath,
        bootclasspath: config.paths.bootclasspath.iter().map(absolutize).collect(),
        output_roots: config.paths.output_roots.iter().map(absolutize).collect(),
        artifact_ext: config.paths.artifact_ext.clone(),
        build_dir: absolutize(&config.build.build_dir),
        main: config.project.main.clone(),
    })
}

impl ResolvedTarget {
    /// Returns the session working directory for this scope:
    /// `<build_dir>/<config name>/<os>/<arch>[/<main>]`.
    ///
    /// Deterministic in the scope, so re-invocations for the same scope
    /// reuse (and first clear) the same directory.
    pub fn session_dir(&self) -> PathBuf {
        let mut dir = self
            .build_dir
            .join(&self.config_name)
            .join(self.target.os.to_string())
            .join(self.target.arch.to_string());
        if let Some(main) = &self.main {
            dir = dir.join(main);
        }
        dir
    }
}
