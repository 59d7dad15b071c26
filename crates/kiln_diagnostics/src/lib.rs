//! Diagnostics and progress reporting for the Kiln build orchestrator.
//!
//! Provides leveled severities, structured build diagnostics, a thread-safe
//! diagnostic accumulator, and the [`ProgressSink`] trait that carries
//! stage-level progress and console messages to whatever front end is
//! driving a build. All sinks tolerate being absent: the no-op
//! implementation discards everything.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod progress;
pub mod severity;
pub mod sink;

pub use diagnostic::Diagnostic;
pub use progress::{NoopProgress, ProgressSink, Stage, TerminalProgress};
pub use severity::Severity;
pub use sink::DiagnosticSink;
