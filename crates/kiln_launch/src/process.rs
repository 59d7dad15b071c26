//! The process-handle facade over a launched child.

use crate::error::LaunchError;
use std::io::Read;
use std::process::{Child, ChildStdin, ExitStatus};
use std::sync::{Arc, Mutex};

/// A resource-release callback guaranteed to fire at most once.
///
/// Cleanup can be triggered from a normal exit, a forced kill, a failed
/// wait, or an explicit call, and those can race from different threads.
/// The callback is taken out of the slot under a mutex, so exactly one
/// trigger runs it.
pub struct CleanupGuard {
    callback: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl CleanupGuard {
    /// Creates a guard around the release callback.
    pub fn new(callback: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            callback: Mutex::new(Some(callback)),
        }
    }

    /// Creates a guard with nothing to release.
    pub fn noop() -> Self {
        Self {
            callback: Mutex::new(None),
        }
    }

    /// Fires the callback if it has not fired yet. Returns `true` for the
    /// trigger that actually ran it.
    pub fn fire(&self) -> bool {
        let taken = self.callback.lock().unwrap().take();
        match taken {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

/// A facade over a launched OS process.
///
/// Forwards the standard operations (wait, kill, exit status, stream
/// access) to the underlying child, except that when the launch routed
/// stdout/stderr through named pipes, the substituted readers are returned
/// instead of the OS pipe handles. Every termination path fires the
/// cleanup guard; the guard makes repeated firing harmless.
pub struct ProcessHandle {
    child: Child,
    stdout: Option<Box<dyn Read + Send>>,
    stderr: Option<Box<dyn Read + Send>>,
    cleanup: Arc<CleanupGuard>,
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("child", &self.child)
            .field("stdout", &self.stdout.as_ref().map(|_| "..."))
            .field("stderr", &self.stderr.as_ref().map(|_| "..."))
            .finish_non_exhaustive()
    }
}

impl ProcessHandle {
    pub(crate) fn new(
        child: Child,
        stdout: Option<Box<dyn Read + Send>>,
        stderr: Option<Box<dyn Read + Send>>,
        cleanup: Arc<CleanupGuard>,
    ) -> Self {
        Self {
            child,
            stdout,
            stderr,
            cleanup,
        }
    }

    /// The OS process id.
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Takes the stdout reader, if the launch captured it.
    pub fn take_stdout(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stdout.take()
    }

    /// Takes the stderr reader, if the launch captured it.
    pub fn take_stderr(&mut self) -> Option<Box<dyn Read + Send>> {
        self.stderr.take()
    }

    /// Takes the child's stdin handle, if piped.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Blocks until the process exits. Fires cleanup whether the wait
    /// succeeds or fails.
    pub fn wait(&mut self) -> Result<ExitStatus, LaunchError> {
        let result = self.child.wait();
        self.cleanup.fire();
        result.map_err(LaunchError::Control)
    }

    /// Returns the exit status if the process has already exited, without
    /// blocking. Fires cleanup once an exit is observed.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>, LaunchError> {
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.cleanup.fire();
                Ok(Some(status))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.cleanup.fire();
                Err(LaunchError::Control(e))
            }
        }
    }

    /// Forcibly terminates the process, reaps it, and fires cleanup.
    pub fn kill(&mut self) -> Result<(), LaunchError> {
        let killed = self.child.kill();
        // Reap regardless, so no zombie outlives the handle
        let _ = self.child.wait();
        self.cleanup.fire();
        killed.map_err(LaunchError::Control)
    }

    /// Returns the shared cleanup guard, for callers that need to trigger
    /// release independently of the handle (e.g. an external watchdog).
    pub fn cleanup_guard(&self) -> Arc<CleanupGuard> {
        Arc::clone(&self.cleanup)
    }
}
