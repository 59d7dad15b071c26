//! Session scheduling: worker threads with per-scope serialization.
//!
//! Sessions for the same (project, configuration name) scope must not
//! interleave, because they share a session directory and would race on
//! its contents. Sessions for different scopes run concurrently.

use crate::session::{BuildResult, BuildSession};
use kiln_cache::BuildRequest;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Runs sessions on worker threads, serializing per scope.
///
/// Holds one lock per (project, config name) scope; a session takes its
/// scope lock for its whole run. Locks are created on first use and never
/// discarded: the set of scopes in one process stays small.
pub struct SessionScheduler {
    scopes: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl SessionScheduler {
    /// Creates a scheduler with no known scopes.
    pub fn new() -> Self {
        Self {
            scopes: Mutex::new(HashMap::new()),
        }
    }

    fn scope_lock(&self, project: &str, config_name: &str) -> Arc<Mutex<()>> {
        let mut scopes = self.scopes.lock().unwrap();
        Arc::clone(
            scopes
                .entry((project.to_string(), config_name.to_string()))
                .or_default(),
        )
    }

    /// Spawns a session on a worker thread and returns its handle.
    ///
    /// The worker takes the scope lock before the first stage runs, so a
    /// spawned session may block behind an earlier one for the same scope.
    pub fn spawn(&self, mut session: BuildSession, request: BuildRequest) -> SessionHandle {
        let lock = self.scope_lock(&session.scope().project, &session.scope().config_name);
        let cancel = session.cancel_flag();
        let thread = std::thread::spawn(move || {
            let _guard = lock.lock().unwrap();
            session.run(&request)
        });
        SessionHandle { cancel, thread }
    }
}

impl Default for SessionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle to one running session.
pub struct SessionHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<BuildResult>,
}

impl SessionHandle {
    /// Requests cancellation. Takes effect at the session's next stage
    /// boundary; the result still arrives through [`wait`](Self::wait).
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Blocks until the session reaches a terminal state.
    pub fn wait(self) -> BuildResult {
        self.thread.join().expect("session worker panicked")
    }
}
