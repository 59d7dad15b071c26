//! Toolchain distribution discovery and stage invocation.
//!
//! Resolves the installed toolchain distribution ([`Home`]) once per
//! process, and drives individual pipeline stages (compile, link, package)
//! against it through the [`Toolchain`] trait. Per-unit compilation is
//! best-effort fan-out: one failing unit does not abort the rest of the
//! batch, but a capability-unavailable rejection aborts the whole
//! invocation with a typed error so the session controller can fall back.

#![warn(missing_docs)]

pub mod error;
pub mod home;
pub mod invoker;

pub use error::ToolchainError;
pub use home::Home;
pub use invoker::{
    object_path, CommandToolchain, CompileRequest, LinkRequest, PackageRequest, Toolchain,
    UnitInput, UnitOutcome, EXIT_CAPABILITY_UNAVAILABLE,
};
