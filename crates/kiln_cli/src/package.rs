//! `kiln package` — build the project and produce an installable bundle.

use kiln_build::PackagePlan;
use kiln_cache::BuildRequest;

use crate::pipeline::{execute, prepare, report};
use crate::{GlobalArgs, PackageArgs, ReportFormat};

/// Runs the `kiln package` command.
///
/// Builds the project with packaging enabled. The install directory comes
/// from `--install-dir`, then `[package].install_dir` in `kiln.toml`, then
/// `dist/` under the project root.
pub fn run(args: &PackageArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let prepared = prepare(global, args.target.as_deref(), args.release)?;

    let configured = prepared.config.package.install_dir.clone();
    let install_dir = args
        .install_dir
        .clone()
        .or(configured)
        .unwrap_or_else(|| "dist".into());
    let install_dir = if install_dir.is_absolute() {
        install_dir
    } else {
        prepared.project_dir.join(install_dir)
    };

    let plan = PackagePlan {
        install_dir: install_dir.clone(),
        signing_identity: prepared.config.package.signing_identity.clone(),
        provisioning_profile: prepared.config.package.provisioning_profile.clone(),
    };
    let result = execute(&prepared, Some(plan), global, BuildRequest::Full)?;

    if !global.quiet && result.binary.is_some() {
        eprintln!("   Packaged into {}", install_dir.display());
    }
    Ok(report(&result, ReportFormat::Text))
}
