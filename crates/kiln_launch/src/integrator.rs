//! Helper-daemon lifecycle keyed by project scope.
//!
//! Some targets want a long-lived companion process per open project (for
//! interface-design tooling round-trips). Whether the companion is usable
//! at all is decided once at startup by an explicit capability probe;
//! callers depend on the probe result, never on runtime discovery.

use crate::error::LaunchError;
use crate::process::ProcessHandle;
use kiln_diagnostics::{ProgressSink, Severity};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Whether the helper daemon can run on this installation.
#[derive(Debug, Clone)]
pub enum IntegratorCapability {
    /// The helper is present and may be started.
    Available,
    /// The helper cannot run; `reason` is reported once, as a warning.
    Unavailable {
        /// Why the helper is unusable.
        reason: String,
    },
}

/// Probes for the helper executable once, at startup.
pub fn probe(helper: &Path) -> IntegratorCapability {
    if helper.is_file() {
        IntegratorCapability::Available
    } else {
        IntegratorCapability::Unavailable {
            reason: format!("helper executable not found at {}", helper.display()),
        }
    }
}

/// A project lifecycle transition the registry reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectEvent {
    /// The project was opened; its daemon should run.
    Opened,
    /// The project was closed; its daemon stops.
    Closed,
    /// The project's configuration changed; a running daemon restarts.
    ConfigChanged,
}

/// Starts one helper daemon for a project.
pub trait DaemonSpawner: Send + Sync {
    /// Spawns the daemon for `project`.
    fn start(&self, project: &str) -> Result<ProcessHandle, LaunchError>;
}

/// Tracks one helper daemon per open project.
///
/// Transitions are driven by explicit [`ProjectEvent`]s from the front
/// end. When the capability probe said unavailable, every event is a no-op
/// apart from a single warning on first use.
pub struct DaemonRegistry {
    capability: IntegratorCapability,
    spawner: Arc<dyn DaemonSpawner>,
    progress: Arc<dyn ProgressSink>,
    daemons: Mutex<HashMap<String, ProcessHandle>>,
    warned: AtomicBool,
}

impl DaemonRegistry {
    /// Creates a registry with the given probe result and spawner.
    pub fn new(
        capability: IntegratorCapability,
        spawner: Arc<dyn DaemonSpawner>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            capability,
            spawner,
            progress,
            daemons: Mutex::new(HashMap::new()),
            warned: AtomicBool::new(false),
        }
    }

    /// Applies a project lifecycle event.
    pub fn handle_event(&self, project: &str, event: ProjectEvent) -> Result<(), LaunchError> {
        if let IntegratorCapability::Unavailable { reason } = &self.capability {
            if !self.warned.swap(true, Ordering::Relaxed) {
                self.progress.message(
                    Severity::Warning,
                    &format!("helper daemon disabled: {reason}"),
                );
            }
            return Ok(());
        }
        match event {
            ProjectEvent::Opened => self.start(project),
            ProjectEvent::Closed => {
                self.stop(project);
                Ok(())
            }
            ProjectEvent::ConfigChanged => {
                if self.stop(project) {
                    self.start(project)
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Returns `true` if a daemon is running for `project`.
    pub fn is_running(&self, project: &str) -> bool {
        self.daemons.lock().unwrap().contains_key(project)
    }

    /// Stops every daemon. Called at process shutdown.
    pub fn shutdown(&self) {
        let mut daemons = self.daemons.lock().unwrap();
        for (_, mut handle) in daemons.drain() {
            let _ = handle.kill();
        }
    }

    fn start(&self, project: &str) -> Result<(), LaunchError> {
        let mut daemons = self.daemons.lock().unwrap();
        if daemons.contains_key(project) {
            return Ok(());
        }
        let handle = self.spawner.start(project)?;
        self.progress.message(
            Severity::Debug,
            &format!("helper daemon started for {project}"),
        );
        daemons.insert(project.to_string(), handle);
        Ok(())
    }

    fn stop(&self, project: &str) -> bool {
        let mut daemons = self.daemons.lock().unwrap();
        match daemons.remove(project) {
            Some(mut handle) => {
                let _ = handle.kill();
                true
            }
            None => false,
        }
    }
}
