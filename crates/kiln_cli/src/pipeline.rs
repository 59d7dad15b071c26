//! Shared helpers for CLI commands.
//!
//! Project-root discovery, configuration loading, session construction,
//! and diagnostic reporting used by `build`, `run`, and `package`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_build::{BuildResult, BuildSession, BuildStatus, PackagePlan, SessionScheduler};
use kiln_cache::{ArtifactCache, BuildRequest};
use kiln_common::Variant;
use kiln_config::{ProjectConfig, ResolvedTarget};
use kiln_diagnostics::{ProgressSink, Severity, TerminalProgress};
use kiln_toolchain::{CommandToolchain, Home, Toolchain};

use crate::{GlobalArgs, ReportFormat};

/// Walks up from `start` looking for the nearest directory containing
/// `kiln.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(kiln_config::loader::CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find kiln.toml in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir →
/// itself). Otherwise walks up from the current directory.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// The console severity floor implied by the global flags.
pub fn min_severity(global: &GlobalArgs) -> Severity {
    if global.quiet {
        Severity::Error
    } else if global.verbose {
        Severity::Debug
    } else {
        Severity::Info
    }
}

/// Builds the terminal progress sink for this invocation.
pub fn progress_sink(global: &GlobalArgs) -> Arc<dyn ProgressSink> {
    Arc::new(TerminalProgress::new(min_severity(global)))
}

/// Everything a command needs before a session can start.
pub struct PreparedBuild {
    /// The project root directory.
    pub project_dir: PathBuf,
    /// The loaded configuration.
    pub config: ProjectConfig,
    /// The resolved build scope.
    pub scope: ResolvedTarget,
}

/// Loads configuration and resolves the build scope for one command.
pub fn prepare(
    global: &GlobalArgs,
    target_name: Option<&str>,
    release: bool,
) -> Result<PreparedBuild, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = kiln_config::load_config(&project_dir)?;
    let variant_override = release.then_some(Variant::Release);
    let scope = kiln_config::resolve_target(&config, &project_dir, target_name, variant_override)?;
    Ok(PreparedBuild {
        project_dir,
        config,
        scope,
    })
}

/// Runs one build session to completion on a worker thread.
pub fn execute(
    prepared: &PreparedBuild,
    packaging: Option<PackagePlan>,
    global: &GlobalArgs,
    request: BuildRequest,
) -> Result<BuildResult, Box<dyn std::error::Error>> {
    let home = Home::shared()?;
    let toolchain: Arc<dyn Toolchain> = Arc::new(CommandToolchain::new(home.clone()));
    let cache = Arc::new(ArtifactCache::new());

    let mut session = BuildSession::new(
        prepared.scope.clone(),
        toolchain,
        cache,
        progress_sink(global),
    )
    .with_intermediates(home.is_dev_mode());
    if let Some(plan) = packaging {
        session = session.with_packaging(plan);
    }

    let scheduler = SessionScheduler::new();
    Ok(scheduler.spawn(session, request).wait())
}

/// Prints the session's diagnostics and maps its status to an exit code.
pub fn report(result: &BuildResult, format: ReportFormat) -> i32 {
    match format {
        ReportFormat::Text => {
            for diagnostic in &result.diagnostics {
                eprintln!("{diagnostic}");
            }
        }
        ReportFormat::Json => match serde_json::to_string_pretty(&result.diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("error: could not serialize diagnostics: {e}"),
        },
    }
    match result.status {
        BuildStatus::Done => 0,
        BuildStatus::Failed => 1,
        BuildStatus::Canceled => 130,
    }
}

/// The build request implied by a `--changed` list: a full rebuild when
/// empty, an incremental one otherwise. Relative paths are taken against
/// the current directory.
pub fn request_from_changed(
    changed: &[PathBuf],
) -> Result<BuildRequest, Box<dyn std::error::Error>> {
    if changed.is_empty() {
        return Ok(BuildRequest::Full);
    }
    let cwd = std::env::current_dir()?;
    Ok(BuildRequest::Incremental(
        changed
            .iter()
            .map(|p| if p.is_absolute() { p.clone() } else { cwd.join(p) })
            .collect(),
    ))
}
