//! `kiln build` — run one incremental build session.

use crate::pipeline::{execute, prepare, report, request_from_changed};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `kiln build` command.
///
/// Resolves the scope, runs a session for it, prints diagnostics, and
/// returns the exit code (0 done, 1 failed, 130 canceled).
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let prepared = prepare(global, args.target.as_deref(), args.release)?;
    if !global.quiet {
        eprintln!(
            "   Building {} for {}",
            prepared.scope.project, prepared.scope.target
        );
    }

    let request = request_from_changed(&args.changed)?;
    let result = execute(&prepared, None, global, request)?;

    if !global.quiet {
        if let Some(binary) = &result.binary {
            eprintln!("   Binary at {}", binary.display());
        }
    }
    Ok(report(&result, args.format))
}
