//! Shared foundational types used across the Kiln build orchestrator.
//!
//! This crate provides core types including content hashing for source
//! fingerprints, build target descriptions (OS, architecture, variant),
//! and qualified compilation-unit names.

#![warn(missing_docs)]

pub mod hash;
pub mod target;
pub mod unit;

pub use hash::ContentHash;
pub use target::{Arch, BuildTarget, Os, Variant};
pub use unit::UnitName;
