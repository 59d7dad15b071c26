//! The build session controller.
//!
//! A session drives one incremental build for one scope: resolve the
//! change-set, compile the changed units, link, and optionally package.
//! Stages run strictly in order; cancellation is checked at stage
//! boundaries, never mid-stage.

use crate::error::BuildError;
use kiln_cache::{ArtifactCache, BuildRequest, ChangeSetResolver};
use kiln_common::{ContentHash, UnitName, Variant};
use kiln_config::ResolvedTarget;
use kiln_diagnostics::{Diagnostic, DiagnosticSink, ProgressSink, Severity, Stage};
use kiln_toolchain::{CompileRequest, LinkRequest, PackageRequest, Toolchain, UnitInput, UnitOutcome};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where a session currently is in its lifecycle.
///
/// `CompilingRelease` is only ever entered from `CompilingDebug`, and at
/// most once per session: the debug-to-release fallback does not loop.
/// `Canceled` and `Failed` are absorbing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    /// Scope resolved, nothing run yet.
    Configured,
    /// The change-set of units to rebuild is known.
    ChangesetResolved,
    /// Compiling under the debug variant.
    CompilingDebug,
    /// Compiling under the release variant, after a capability fallback or
    /// because release was requested.
    CompilingRelease,
    /// Object files linked into a binary.
    Linked,
    /// Binary packaged into an installable bundle.
    Packaged,
    /// The session completed.
    Done,
    /// The session was canceled at a stage boundary.
    Canceled,
    /// The session failed; diagnostics carry the details.
    Failed,
}

impl SessionState {
    /// Returns `true` once the session can make no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Done | SessionState::Canceled | SessionState::Failed
        )
    }
}

/// How a session ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuildStatus {
    /// The pipeline ran to completion.
    Done,
    /// A stage failed; see the diagnostics.
    Failed,
    /// The session was canceled before completing.
    Canceled,
}

/// The outcome of one session, returned to the front end.
#[derive(Debug)]
pub struct BuildResult {
    /// How the session ended.
    pub status: BuildStatus,
    /// The produced (or still-current) binary, when one exists.
    pub binary: Option<PathBuf>,
    /// The variant actually built. Differs from the requested variant when
    /// the debug-to-release fallback fired.
    pub variant: Option<Variant>,
    /// Every diagnostic the session accumulated.
    pub diagnostics: Vec<Diagnostic>,
}

/// Packaging settings for sessions that go past the link stage.
#[derive(Debug, Clone)]
pub struct PackagePlan {
    /// Directory the bundle is installed into.
    pub install_dir: PathBuf,
    /// Code-signing identity, when signing is requested.
    pub signing_identity: Option<String>,
    /// Provisioning profile name, when the target OS requires one.
    pub provisioning_profile: Option<String>,
}

/// Internal pipeline outcome, before diagnostics are drained.
enum PipelineEnd {
    Done {
        binary: Option<PathBuf>,
        variant: Variant,
    },
    Failed,
    Canceled,
}

/// One incremental build for one scope.
///
/// The session owns its diagnostic sink and state machine; the shared
/// artifact cache, toolchain, and progress sink are handed in. Exactly one
/// `run` per session: a finished session is not reusable.
pub struct BuildSession {
    scope: ResolvedTarget,
    toolchain: Arc<dyn Toolchain>,
    cache: Arc<ArtifactCache>,
    progress: Arc<dyn ProgressSink>,
    sink: DiagnosticSink,
    cancel: Arc<AtomicBool>,
    state: SessionState,
    current_stage: Stage,
    packaging: Option<PackagePlan>,
    dump_intermediates: bool,
}

impl BuildSession {
    /// Creates a session for one resolved scope.
    pub fn new(
        scope: ResolvedTarget,
        toolchain: Arc<dyn Toolchain>,
        cache: Arc<ArtifactCache>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            scope,
            toolchain,
            cache,
            progress,
            sink: DiagnosticSink::new(),
            cancel: Arc::new(AtomicBool::new(false)),
            state: SessionState::Configured,
            current_stage: Stage::Resolve,
            packaging: None,
            dump_intermediates: false,
        }
    }

    /// Requests packaging after a successful link.
    pub fn with_packaging(mut self, plan: PackagePlan) -> Self {
        self.packaging = Some(plan);
        self
    }

    /// Dumps intermediate compiler output (development-tree toolchains).
    pub fn with_intermediates(mut self, dump: bool) -> Self {
        self.dump_intermediates = dump;
        self
    }

    /// The scope this session builds.
    pub fn scope(&self) -> &ResolvedTarget {
        &self.scope
    }

    /// The session's current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the flag that cancels this session.
    ///
    /// Setting it takes effect at the next stage boundary; a stage already
    /// running is allowed to finish.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    fn canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Runs the session to a terminal state and returns the result.
    pub fn run(&mut self, request: &BuildRequest) -> BuildResult {
        let end = match self.pipeline(request) {
            Ok(end) => end,
            Err(e) => {
                self.sink
                    .emit(Diagnostic::error(self.current_stage, e.to_string()));
                PipelineEnd::Failed
            }
        };
        match end {
            PipelineEnd::Done { binary, variant } => {
                self.state = SessionState::Done;
                BuildResult {
                    status: BuildStatus::Done,
                    binary,
                    variant: Some(variant),
                    diagnostics: self.sink.take_all(),
                }
            }
            PipelineEnd::Failed => {
                self.state = SessionState::Failed;
                BuildResult {
                    status: BuildStatus::Failed,
                    binary: None,
                    variant: None,
                    diagnostics: self.sink.take_all(),
                }
            }
            PipelineEnd::Canceled => {
                self.state = SessionState::Canceled;
                BuildResult {
                    status: BuildStatus::Canceled,
                    binary: None,
                    variant: None,
                    diagnostics: self.sink.take_all(),
                }
            }
        }
    }

    fn pipeline(&mut self, request: &BuildRequest) -> Result<PipelineEnd, BuildError> {
        if self.canceled() {
            return Ok(PipelineEnd::Canceled);
        }

        // Resolve
        self.current_stage = Stage::Resolve;
        self.progress.stage_started(Stage::Resolve, 0);
        let resolver = ChangeSetResolver::new(
            self.scope.output_roots.clone(),
            self.scope.artifact_ext.clone(),
        );
        let mut target = self.scope.target;
        // A fresh process starts with an empty index; objects from earlier
        // runs are still current, so rebuild the index from them first.
        self.cache.seed_from_disk(&self.object_dir(target), target);
        let mut changes = resolver.resolve(request, &self.cache, target);
        self.state = SessionState::ChangesetResolved;
        self.progress.stage_finished(Stage::Resolve);
        for unit in &changes.deleted {
            self.progress.message(
                Severity::Debug,
                &format!("source artifact for {unit} deleted; cache entry evicted"),
            );
        }

        if changes.is_empty() {
            self.progress
                .message(Severity::Info, "nothing to rebuild");
            let binary_path = self.binary_path();
            let binary = binary_path.exists().then_some(binary_path);
            return Ok(PipelineEnd::Done {
                binary,
                variant: target.variant,
            });
        }

        if self.canceled() {
            return Ok(PipelineEnd::Canceled);
        }

        // Compile, with at most one debug-to-release fallback
        self.current_stage = Stage::Compile;
        let mut fell_back = false;
        loop {
            self.state = match target.variant {
                Variant::Debug => SessionState::CompilingDebug,
                Variant::Release => SessionState::CompilingRelease,
            };
            self.progress.stage_started(Stage::Compile, changes.len());

            let units: Vec<UnitInput> = changes
                .units
                .iter()
                .map(|c| UnitInput {
                    unit: c.unit.clone(),
                    artifact: c.artifact.clone(),
                })
                .collect();
            let source_hashes: HashMap<UnitName, ContentHash> = changes
                .units
                .iter()
                .map(|c| (c.unit.clone(), c.fingerprint.hash))
                .collect();
            let compile = CompileRequest {
                units,
                target,
                object_dir: self.object_dir(target),
                classpath: self.scope.classpath.clone(),
                dump_intermediates: self.dump_intermediates,
            };

            match self.toolchain.compile(&compile) {
                Ok(outcomes) => {
                    let total = outcomes.len();
                    let mut compiled: Vec<(UnitName, PathBuf, ContentHash)> = Vec::new();
                    for outcome in outcomes {
                        match outcome {
                            UnitOutcome::Compiled { unit, object } => {
                                let Some(&hash) = source_hashes.get(&unit) else {
                                    continue;
                                };
                                compiled.push((unit, object, hash));
                            }
                            UnitOutcome::Failed { unit, message } => {
                                self.sink.emit(
                                    Diagnostic::error(Stage::Compile, message).with_unit(unit),
                                );
                            }
                        }
                    }
                    self.progress
                        .stage_progress(Stage::Compile, compiled.len(), total);
                    if self.sink.has_errors() {
                        self.progress.stage_finished(Stage::Compile);
                        return Ok(PipelineEnd::Failed);
                    }
                    // One shared timestamp for the whole batch
                    self.cache.advance_batch(&compiled, target)?;
                    self.progress.stage_finished(Stage::Compile);
                    break;
                }
                Err(e) if e.is_capability_unavailable()
                    && target.variant == Variant::Debug
                    && !fell_back =>
                {
                    fell_back = true;
                    let text = format!("{e}; retrying as a release build");
                    self.sink.emit(Diagnostic::warning(Stage::Compile, &text));
                    self.progress.message(Severity::Warning, &text);
                    target = target.with_variant(Variant::Release);
                    self.cache.seed_from_disk(&self.object_dir(target), target);
                    changes = resolver.resolve(request, &self.cache, target);
                }
                Err(e) => return Err(e.into()),
            }
        }

        if self.canceled() {
            return Ok(PipelineEnd::Canceled);
        }

        // Link
        self.current_stage = Stage::Link;
        let main = self
            .scope
            .main
            .clone()
            .ok_or(BuildError::MissingEntryPoint)?;
        self.prepare_session_dir()?;
        self.progress.stage_started(Stage::Link, 1);
        let link = LinkRequest {
            objects: collect_objects(&self.object_dir(target)),
            target,
            output: self.binary_path(),
            main,
        };
        let binary = self.toolchain.link(&link)?;
        self.state = SessionState::Linked;
        self.progress.stage_finished(Stage::Link);

        // Package
        if let Some(plan) = self.packaging.clone() {
            if self.canceled() {
                return Ok(PipelineEnd::Canceled);
            }
            self.current_stage = Stage::Package;
            self.progress.stage_started(Stage::Package, 1);
            let package = PackageRequest {
                binary: binary.clone(),
                target,
                install_dir: plan.install_dir,
                signing_identity: plan.signing_identity,
                provisioning_profile: plan.provisioning_profile,
            };
            self.toolchain.package(&package)?;
            self.state = SessionState::Packaged;
            self.progress.stage_finished(Stage::Package);
        }

        Ok(PipelineEnd::Done {
            binary: Some(binary),
            variant: target.variant,
        })
    }

    /// Per-variant object directory. Persistent across sessions: this is
    /// where incremental reuse comes from.
    fn object_dir(&self, target: kiln_common::BuildTarget) -> PathBuf {
        self.scope
            .build_dir
            .join("cache")
            .join(target.os.to_string())
            .join(target.arch.to_string())
            .join(target.variant.to_string())
    }

    /// Where the linked binary for this scope lands.
    fn binary_path(&self) -> PathBuf {
        self.scope.session_dir().join(&self.scope.project)
    }

    /// Clears and recreates the session working directory.
    ///
    /// The session dir holds link output only; object files live in the
    /// persistent per-variant cache directory and survive this.
    fn prepare_session_dir(&self) -> Result<(), BuildError> {
        let dir = self.scope.session_dir();
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(BuildError::Io {
                    path: dir,
                    source: e,
                })
            }
        }
        std::fs::create_dir_all(&dir).map_err(|e| BuildError::Io {
            path: dir.clone(),
            source: e,
        })
    }
}

/// Collects every object file under `dir`, in deterministic order.
fn collect_objects(dir: &Path) -> Vec<PathBuf> {
    let mut objects = Vec::new();
    collect_into(dir, &mut objects);
    objects.sort();
    objects
}

fn collect_into(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_into(&path, out);
        } else if path.extension().and_then(|e| e.to_str()) == Some("o") {
            out.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_common::{Arch, BuildTarget, Os};
    use kiln_diagnostics::NoopProgress;
    use kiln_toolchain::{object_path, ToolchainError};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    #[derive(Clone, Copy, PartialEq)]
    enum Capability {
        Full,
        ReleaseOnly,
        None,
    }

    struct FakeToolchain {
        capability: Capability,
        fail_units: Vec<&'static str>,
        compile_calls: AtomicUsize,
        compiled_units: Mutex<Vec<String>>,
    }

    impl FakeToolchain {
        fn new(capability: Capability) -> Self {
            Self {
                capability,
                fail_units: Vec::new(),
                compile_calls: AtomicUsize::new(0),
                compiled_units: Mutex::new(Vec::new()),
            }
        }

        fn failing(units: Vec<&'static str>) -> Self {
            let mut t = Self::new(Capability::Full);
            t.fail_units = units;
            t
        }

        fn calls(&self) -> usize {
            self.compile_calls.load(Ordering::Relaxed)
        }

        fn compiled(&self) -> Vec<String> {
            self.compiled_units.lock().unwrap().clone()
        }
    }

    impl Toolchain for FakeToolchain {
        fn compile(&self, req: &CompileRequest) -> Result<Vec<UnitOutcome>, ToolchainError> {
            self.compile_calls.fetch_add(1, Ordering::Relaxed);
            let denied = match self.capability {
                Capability::Full => false,
                Capability::ReleaseOnly => req.target.variant == Variant::Debug,
                Capability::None => true,
            };
            if denied {
                return Err(ToolchainError::CapabilityUnavailable {
                    variant: req.target.variant,
                    reason: "not licensed".to_string(),
                });
            }
            let mut outcomes = Vec::new();
            for input in &req.units {
                if self.fail_units.contains(&input.unit.as_str()) {
                    outcomes.push(UnitOutcome::Failed {
                        unit: input.unit.clone(),
                        message: "synthetic compile error".to_string(),
                    });
                    continue;
                }
                let object = object_path(&req.object_dir, &input.unit);
                std::fs::create_dir_all(object.parent().unwrap()).unwrap();
                std::fs::write(&object, b"obj").unwrap();
                self.compiled_units
                    .lock()
                    .unwrap()
                    .push(input.unit.as_str().to_string());
                outcomes.push(UnitOutcome::Compiled {
                    unit: input.unit.clone(),
                    object,
                });
            }
            Ok(outcomes)
        }

        fn link(&self, req: &LinkRequest) -> Result<PathBuf, ToolchainError> {
            std::fs::write(&req.output, b"binary").unwrap();
            Ok(req.output.clone())
        }

        fn package(&self, req: &PackageRequest) -> Result<PathBuf, ToolchainError> {
            Ok(req.install_dir.clone())
        }
    }

    fn scope(dir: &Path) -> ResolvedTarget {
        ResolvedTarget {
            project: "app".to_string(),
            config_name: "default".to_string(),
            target: BuildTarget::new(Os::Linux, Arch::X86_64, Variant::Debug),
            classpath: Vec::new(),
            bootclasspath: Vec::new(),
            output_roots: vec![dir.join("classes")],
            artifact_ext: "class".to_string(),
            build_dir: dir.join("build"),
            main: Some("com.acme.Main".to_string()),
        }
    }

    fn write_class(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join("classes").join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, rel.as_bytes()).unwrap();
        path
    }

    fn session(dir: &Path, toolchain: &Arc<FakeToolchain>, cache: &Arc<ArtifactCache>) -> BuildSession {
        BuildSession::new(
            scope(dir),
            Arc::clone(toolchain) as Arc<dyn Toolchain>,
            Arc::clone(cache),
            Arc::new(NoopProgress),
        )
    }

    #[test]
    fn full_build_compiles_and_links() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");
        write_class(dir.path(), "com/acme/Util.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        let mut s = session(dir.path(), &toolchain, &cache);
        let result = s.run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Done);
        assert_eq!(result.variant, Some(Variant::Debug));
        assert!(result.binary.unwrap().exists());
        assert_eq!(s.state(), SessionState::Done);
        let mut compiled = toolchain.compiled();
        compiled.sort();
        assert_eq!(compiled, vec!["com.acme.Main", "com.acme.Util"]);
    }

    #[test]
    fn rerun_with_no_changes_is_no_work() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        session(dir.path(), &toolchain, &cache).run(&BuildRequest::Full);
        assert_eq!(toolchain.calls(), 1);

        let result = session(dir.path(), &toolchain, &cache).run(&BuildRequest::Full);
        assert_eq!(result.status, BuildStatus::Done);
        // Short-circuited: the toolchain was never invoked again
        assert_eq!(toolchain.calls(), 1);
        assert!(result.binary.unwrap().exists());
    }

    #[test]
    fn only_edited_unit_recompiles() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");
        let util = write_class(dir.path(), "com/acme/Util.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        session(dir.path(), &toolchain, &cache).run(&BuildRequest::Full);

        // Rewrite one artifact with new content, past the batch timestamp
        std::fs::write(&util, b"edited bytecode").unwrap();
        std::fs::File::options()
            .write(true)
            .open(&util)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();

        let result = session(dir.path(), &toolchain, &cache)
            .run(&BuildRequest::Incremental(vec![util]));
        assert_eq!(result.status, BuildStatus::Done);
        assert_eq!(
            toolchain.compiled(),
            vec!["com.acme.Main", "com.acme.Util", "com.acme.Util"]
        );
    }

    #[test]
    fn touch_without_edit_is_no_work() {
        // An mtime bump with identical bytes is not an edit: the recorded
        // source hash still matches, so nothing recompiles.
        let dir = tempfile::tempdir().unwrap();
        let main = write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        session(dir.path(), &toolchain, &cache).run(&BuildRequest::Full);
        assert_eq!(toolchain.calls(), 1);

        std::fs::File::options()
            .write(true)
            .open(&main)
            .unwrap()
            .set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();

        let result = session(dir.path(), &toolchain, &cache)
            .run(&BuildRequest::Incremental(vec![main]));
        assert_eq!(result.status, BuildStatus::Done);
        assert_eq!(toolchain.calls(), 1);
    }

    #[test]
    fn new_process_reuses_on_disk_objects() {
        // A second orchestrator process starts with an empty index but
        // finds the previous run's objects on disk; nothing recompiles.
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");
        write_class(dir.path(), "com/acme/Util.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let first = Arc::new(ArtifactCache::new());
        session(dir.path(), &toolchain, &first).run(&BuildRequest::Full);
        assert_eq!(toolchain.calls(), 1);

        let second = Arc::new(ArtifactCache::new());
        let result = session(dir.path(), &toolchain, &second).run(&BuildRequest::Full);
        assert_eq!(result.status, BuildStatus::Done);
        assert_eq!(toolchain.calls(), 1);
        assert!(result.binary.unwrap().exists());
    }

    #[test]
    fn capability_fallback_retries_release_once() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::ReleaseOnly));
        let cache = Arc::new(ArtifactCache::new());
        let mut s = session(dir.path(), &toolchain, &cache);
        let result = s.run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Done);
        assert_eq!(result.variant, Some(Variant::Release));
        // One debug attempt, one release attempt
        assert_eq!(toolchain.calls(), 2);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning));
    }

    #[test]
    fn capability_denied_for_both_variants_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::None));
        let cache = Arc::new(ArtifactCache::new());
        let mut s = session(dir.path(), &toolchain, &cache);
        let result = s.run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Failed);
        assert_eq!(s.state(), SessionState::Failed);
        // Fallback fires exactly once; the release rejection is final
        assert_eq!(toolchain.calls(), 2);
    }

    #[test]
    fn failed_units_aggregate_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");
        write_class(dir.path(), "com/acme/Util.class");

        let toolchain = Arc::new(FakeToolchain::failing(vec![
            "com.acme.Main",
            "com.acme.Util",
        ]));
        let cache = Arc::new(ArtifactCache::new());
        let result = session(dir.path(), &toolchain, &cache).run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Failed);
        let errors: Vec<_> = result
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|d| d.unit.is_some()));
    }

    #[test]
    fn cancel_before_start_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        let mut s = session(dir.path(), &toolchain, &cache);
        s.cancel_flag().store(true, Ordering::Relaxed);
        let result = s.run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Canceled);
        assert_eq!(s.state(), SessionState::Canceled);
        assert_eq!(toolchain.calls(), 0);
    }

    #[test]
    fn missing_entry_point_fails_before_link() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        let mut scope = scope(dir.path());
        scope.main = None;
        let mut s = BuildSession::new(
            scope,
            Arc::clone(&toolchain) as Arc<dyn Toolchain>,
            Arc::clone(&cache),
            Arc::new(NoopProgress),
        );
        let result = s.run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Failed);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.message.contains("main")));
    }

    #[test]
    fn packaging_runs_after_link() {
        let dir = tempfile::tempdir().unwrap();
        write_class(dir.path(), "com/acme/Main.class");

        let toolchain = Arc::new(FakeToolchain::new(Capability::Full));
        let cache = Arc::new(ArtifactCache::new());
        let mut s = session(dir.path(), &toolchain, &cache).with_packaging(PackagePlan {
            install_dir: dir.path().join("dist"),
            signing_identity: None,
            provisioning_profile: None,
        });
        let result = s.run(&BuildRequest::Full);

        assert_eq!(result.status, BuildStatus::Done);
        assert_eq!(s.state(), SessionState::Done);
    }
}
