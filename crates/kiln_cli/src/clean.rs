//! `kiln clean` — remove all build state for the project.

use crate::pipeline::resolve_project_root;
use crate::GlobalArgs;

/// Runs the `kiln clean` command.
///
/// Deletes the configured build directory. The artifact cache is an
/// in-memory index over that directory's contents, so removing the
/// directory is a complete clean.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = kiln_config::load_config(&project_dir)?;

    let build_dir = if config.build.build_dir.is_absolute() {
        config.build.build_dir.clone()
    } else {
        project_dir.join(&config.build.build_dir)
    };

    match std::fs::remove_dir_all(&build_dir) {
        Ok(()) => {
            if !global.quiet {
                eprintln!("   Removed {}", build_dir.display());
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if !global.quiet {
                eprintln!("   Nothing to clean");
            }
        }
        Err(e) => return Err(e.into()),
    }
    Ok(0)
}
