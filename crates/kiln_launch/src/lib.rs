//! Process launch and supervision for Kiln-built binaries.
//!
//! Consumes the [`LaunchDescriptor`] a successful build session produces:
//! starts the binary, optionally routes stdout/stderr through named pipes
//! so output can be consumed incrementally, and guarantees the companion
//! resource-release callback runs at most once no matter how termination
//! is observed. Also hosts the per-project helper-daemon registry.

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod fifo;
pub mod integrator;
pub mod process;
pub mod supervisor;

pub use descriptor::{split_args, IoChannels, LaunchDescriptor};
pub use error::LaunchError;
pub use integrator::{
    probe, DaemonRegistry, DaemonSpawner, IntegratorCapability, ProjectEvent,
};
pub use process::{CleanupGuard, ProcessHandle};
pub use supervisor::launch;
