//! Build session orchestration for Kiln.
//!
//! A [`BuildSession`] drives one incremental build for one scope through
//! resolve, compile, link, and package, with a single debug-to-release
//! fallback when the toolchain reports a capability rejection. The
//! [`SessionScheduler`] runs sessions on worker threads and guarantees
//! that sessions for the same (project, configuration) scope never
//! interleave.

#![warn(missing_docs)]

pub mod error;
pub mod scheduler;
pub mod session;

pub use error::BuildError;
pub use scheduler::{SessionHandle, SessionScheduler};
pub use session::{BuildResult, BuildSession, BuildStatus, PackagePlan, SessionState};
