//! Stage invocation against a toolchain distribution.

use crate::error::ToolchainError;
use crate::home::Home;
use kiln_common::{BuildTarget, UnitName};
use rayon::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Exit code by which a toolchain executable reports a capability
/// (license/permission) rejection.
///
/// This is the contract with the toolchain: detection is by exit kind,
/// never by matching stderr text.
pub const EXIT_CAPABILITY_UNAVAILABLE: i32 = 73;

/// One compilation unit handed to the compile stage.
#[derive(Debug, Clone)]
pub struct UnitInput {
    /// The unit's qualified name.
    pub unit: UnitName,
    /// The managed output artifact to compile from.
    pub artifact: PathBuf,
}

/// Per-unit result of one compile invocation.
#[derive(Debug, Clone)]
pub enum UnitOutcome {
    /// The unit compiled; its object file is at `object`.
    Compiled {
        /// The unit's qualified name.
        unit: UnitName,
        /// Location of the produced object file.
        object: PathBuf,
    },
    /// The unit failed to compile. Other units in the batch still ran.
    Failed {
        /// The unit's qualified name.
        unit: UnitName,
        /// The compiler's error output.
        message: String,
    },
}

impl UnitOutcome {
    /// The unit this outcome belongs to.
    pub fn unit(&self) -> &UnitName {
        match self {
            UnitOutcome::Compiled { unit, .. } | UnitOutcome::Failed { unit, .. } => unit,
        }
    }

    /// Returns `true` for a failed unit.
    pub fn is_failure(&self) -> bool {
        matches!(self, UnitOutcome::Failed { .. })
    }
}

/// Inputs to one compile-stage invocation.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Units to compile.
    pub units: Vec<UnitInput>,
    /// The target (including the attempted variant).
    pub target: BuildTarget,
    /// Directory object files are written under, mirroring unit packages.
    pub object_dir: PathBuf,
    /// Classpath entries for symbol resolution.
    pub classpath: Vec<PathBuf>,
    /// Dump intermediate compiler output (development-tree builds).
    pub dump_intermediates: bool,
}

/// Inputs to one link-stage invocation.
#[derive(Debug, Clone)]
pub struct LinkRequest {
    /// Object files to link, in any order.
    pub objects: Vec<PathBuf>,
    /// The target being linked for.
    pub target: BuildTarget,
    /// Path the linked binary is written to.
    pub output: PathBuf,
    /// Main entry point the binary starts from.
    pub main: String,
}

/// Inputs to one package-stage invocation.
#[derive(Debug, Clone)]
pub struct PackageRequest {
    /// The linked binary to package.
    pub binary: PathBuf,
    /// The target being packaged for.
    pub target: BuildTarget,
    /// Directory the bundle is installed into.
    pub install_dir: PathBuf,
    /// Code-signing identity, when signing is requested.
    pub signing_identity: Option<String>,
    /// Provisioning profile name, when required by the target OS.
    pub provisioning_profile: Option<String>,
}

/// Drives one pipeline stage against a toolchain.
///
/// Implemented by [`CommandToolchain`] for real distributions and by fakes
/// in session tests. Compilation is best-effort fan-out: every unit in the
/// batch is attempted and reported independently; only invocation-level
/// problems (spawn failure, capability rejection) surface as `Err`.
pub trait Toolchain: Send + Sync {
    /// Compiles a batch of units for one target.
    fn compile(&self, req: &CompileRequest) -> Result<Vec<UnitOutcome>, ToolchainError>;

    /// Links object files into a binary, returning its path.
    fn link(&self, req: &LinkRequest) -> Result<PathBuf, ToolchainError>;

    /// Packages a binary into an installable bundle, returning its path.
    fn package(&self, req: &PackageRequest) -> Result<PathBuf, ToolchainError>;
}

/// Returns the deterministic object-file location for a unit:
/// `<object_dir>/<package path>/<Name>.o`.
pub fn object_path(object_dir: &Path, unit: &UnitName) -> PathBuf {
    object_dir.join(unit.to_rel_path("o"))
}

/// A [`Toolchain`] that spawns the distribution's executables.
///
/// One compiler process per unit, fanned out with rayon. The linker and
/// packager run as single processes.
pub struct CommandToolchain {
    home: Home,
}

impl CommandToolchain {
    /// Creates a toolchain driver over the given distribution.
    pub fn new(home: Home) -> Self {
        Self { home }
    }

    fn compile_unit(
        &self,
        input: &UnitInput,
        req: &CompileRequest,
    ) -> Result<UnitOutcome, ToolchainError> {
        let object = object_path(&req.object_dir, &input.unit);
        if let Some(parent) = object.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ToolchainError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let program = self.home.compiler();
        let output = Command::new(&program)
            .args(compile_args(input, &object, req))
            .output()
            .map_err(|e| ToolchainError::Spawn {
                program: program.clone(),
                source: e,
            })?;

        if output.status.success() {
            return Ok(UnitOutcome::Compiled {
                unit: input.unit.clone(),
                object,
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.code() == Some(EXIT_CAPABILITY_UNAVAILABLE) {
            return Err(ToolchainError::CapabilityUnavailable {
                variant: req.target.variant,
                reason: stderr,
            });
        }
        Ok(UnitOutcome::Failed {
            unit: input.unit.clone(),
            message: stderr,
        })
    }

    fn run_stage(
        &self,
        stage: &'static str,
        program: PathBuf,
        args: Vec<OsString>,
        produced: PathBuf,
    ) -> Result<PathBuf, ToolchainError> {
        let output = Command::new(&program)
            .args(args)
            .output()
            .map_err(|e| ToolchainError::Spawn {
                program: program.clone(),
                source: e,
            })?;
        if !output.status.success() {
            return Err(ToolchainError::StageFailed {
                stage,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(produced)
    }
}

impl Toolchain for CommandToolchain {
    fn compile(&self, req: &CompileRequest) -> Result<Vec<UnitOutcome>, ToolchainError> {
        let results: Vec<Result<UnitOutcome, ToolchainError>> = req
            .units
            .par_iter()
            .map(|input| self.compile_unit(input, req))
            .collect();

        let mut outcomes = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                // A capability rejection outranks any other invocation error
                Err(e) if e.is_capability_unavailable() => return Err(e),
                Err(e) => {
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(outcomes),
        }
    }

    fn link(&self, req: &LinkRequest) -> Result<PathBuf, ToolchainError> {
        if let Some(parent) = req.output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ToolchainError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        self.run_stage(
            "link",
            self.home.linker(),
            link_args(req),
            req.output.clone(),
        )
    }

    fn package(&self, req: &PackageRequest) -> Result<PathBuf, ToolchainError> {
        std::fs::create_dir_all(&req.install_dir).map_err(|e| ToolchainError::Io {
            path: req.install_dir.clone(),
            source: e,
        })?;
        self.run_stage(
            "package",
            self.home.packager(),
            package_args(req),
            req.install_dir.clone(),
        )
    }
}

/// Builds the argument vector for one unit compilation.
fn compile_args(input: &UnitInput, object: &Path, req: &CompileRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--os".into(),
        req.target.os.to_string().into(),
        "--arch".into(),
        req.target.arch.to_string().into(),
        "--variant".into(),
        req.target.variant.to_string().into(),
    ];
    if req.dump_intermediates {
        args.push("--dump-intermediates".into());
    }
    for entry in &req.classpath {
        args.push("--classpath".into());
        args.push(entry.into());
    }
    args.push("--out".into());
    args.push(object.into());
    args.push(input.artifact.clone().into());
    args
}

/// Builds the argument vector for the link stage.
fn link_args(req: &LinkRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--os".into(),
        req.target.os.to_string().into(),
        "--arch".into(),
        req.target.arch.to_string().into(),
        "--main".into(),
        req.main.clone().into(),
        "--out".into(),
        req.output.clone().into(),
    ];
    for object in &req.objects {
        args.push(object.into());
    }
    args
}

/// Builds the argument vector for the package stage.
fn package_args(req: &PackageRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--os".into(),
        req.target.os.to_string().into(),
        "--install-dir".into(),
        req.install_dir.clone().into(),
    ];
    if let Some(identity) = &req.signing_identity {
        args.push("--sign".into());
        args.push(identity.clone().into());
    }
    if let Some(profile) = &req.provisioning_profile {
        args.push("--provisioning-profile".into());
        args.push(profile.clone().into());
    }
    args.push(req.binary.clone().into());
    args
}
