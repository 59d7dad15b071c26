//! Stage-level progress reporting and leveled console messages.
//!
//! The orchestrator reports coarse-grained progress (stage boundaries and
//! unit counts, not per-instruction detail) plus leveled text messages to
//! whatever front end drives the build. Front ends implement
//! [`ProgressSink`]; [`NoopProgress`] stands in when none is attached.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// A stage of the build/launch pipeline, used for progress and diagnostics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Resolving the change-set of units to rebuild.
    Resolve,
    /// Compiling units to native object files.
    Compile,
    /// Linking object files into a binary.
    Link,
    /// Packaging the binary into an installable bundle.
    Package,
    /// Launching the produced binary.
    Launch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Resolve => write!(f, "resolve"),
            Stage::Compile => write!(f, "compile"),
            Stage::Link => write!(f, "link"),
            Stage::Package => write!(f, "package"),
            Stage::Launch => write!(f, "launch"),
        }
    }
}

/// Receiver for stage-level progress events and console messages.
///
/// Implementations must tolerate being called from the session worker
/// thread. Every method has a default no-op body, so sinks implement only
/// what they care about.
pub trait ProgressSink: Send + Sync {
    /// A pipeline stage has started. `units` is the number of work items
    /// the stage will process, when known.
    fn stage_started(&self, _stage: Stage, _units: usize) {}

    /// `done` of `total` work items in the current stage have completed.
    fn stage_progress(&self, _stage: Stage, _done: usize, _total: usize) {}

    /// A pipeline stage has finished.
    fn stage_finished(&self, _stage: Stage) {}

    /// A leveled console message.
    fn message(&self, _severity: Severity, _text: &str) {}
}

/// A progress sink that discards everything.
///
/// Used when no front end is attached; the orchestrator never needs to
/// check for sink availability.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// A progress sink that writes leveled messages and stage events to stderr.
pub struct TerminalProgress {
    /// Minimum severity to print. Messages below this are dropped.
    min_severity: Severity,
    // Serializes writes so stage lines and messages don't interleave.
    lock: Mutex<()>,
}

impl TerminalProgress {
    /// Creates a terminal sink printing messages at or above `min_severity`.
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            lock: Mutex::new(()),
        }
    }
}

impl ProgressSink for TerminalProgress {
    fn stage_started(&self, stage: Stage, units: usize) {
        let _guard = self.lock.lock().unwrap();
        if units > 0 {
            eprintln!("  {stage}: {units} units");
        } else {
            eprintln!("  {stage}");
        }
    }

    fn stage_finished(&self, stage: Stage) {
        if self.min_severity <= Severity::Debug {
            let _guard = self.lock.lock().unwrap();
            eprintln!("  {stage} done");
        }
    }

    fn message(&self, severity: Severity, text: &str) {
        if severity >= self.min_severity {
            let _guard = self.lock.lock().unwrap();
            eprintln!("[{severity}] {text}");
        }
    }
}
