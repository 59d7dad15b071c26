//! Build target descriptions: operating system, CPU architecture, and variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The operating system a native binary is produced for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Desktop Linux.
    Linux,
    /// Desktop macOS.
    Macos,
    /// iOS devices and simulators.
    Ios,
}

impl Os {
    /// Returns the OS Kiln itself is running on.
    ///
    /// Used when a project configures its incremental-build OS as `"auto"`.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Os::Macos
        } else {
            Os::Linux
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Os::Linux => write!(f, "linux"),
            Os::Macos => write!(f, "macos"),
            Os::Ios => write!(f, "ios"),
        }
    }
}

impl FromStr for Os {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Os::host()),
            "linux" => Ok(Os::Linux),
            "macos" => Ok(Os::Macos),
            "ios" => Ok(Os::Ios),
            other => Err(ParseTargetError {
                kind: "OS",
                value: other.to_string(),
            }),
        }
    }
}

/// The CPU architecture a native binary is produced for.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// 64-bit x86.
    X86_64,
    /// 64-bit ARM.
    Arm64,
    /// 32-bit ARM with Thumb-2 (iOS devices).
    Thumbv7,
}

impl Arch {
    /// Returns the architecture Kiln itself is running on.
    pub fn host() -> Self {
        if cfg!(target_arch = "aarch64") {
            Arch::Arm64
        } else {
            Arch::X86_64
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86_64 => write!(f, "x86_64"),
            Arch::Arm64 => write!(f, "arm64"),
            Arch::Thumbv7 => write!(f, "thumbv7"),
        }
    }
}

impl FromStr for Arch {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Arch::host()),
            "x86_64" => Ok(Arch::X86_64),
            "arm64" | "aarch64" => Ok(Arch::Arm64),
            "thumbv7" => Ok(Arch::Thumbv7),
            other => Err(ParseTargetError {
                kind: "architecture",
                value: other.to_string(),
            }),
        }
    }
}

/// A build flavor affecting instrumentation and licensing, not output semantics.
///
/// Debug builds carry debug metadata and may require a privileged toolchain
/// capability; release builds are always permitted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Instrumented build with debug metadata.
    Debug,
    /// Uninstrumented build.
    Release,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Debug => write!(f, "debug"),
            Variant::Release => write!(f, "release"),
        }
    }
}

/// The concrete (OS, architecture, variant) tuple one build session targets.
///
/// Exactly one `BuildTarget` is resolved per session; there are no
/// multi-target matrix builds within a single session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BuildTarget {
    /// Target operating system.
    pub os: Os,
    /// Target CPU architecture.
    pub arch: Arch,
    /// Build variant.
    pub variant: Variant,
}

impl BuildTarget {
    /// Creates a build target.
    pub fn new(os: Os, arch: Arch, variant: Variant) -> Self {
        Self { os, arch, variant }
    }

    /// Returns the same target with a different variant.
    ///
    /// Used by the session controller when retrying a debug attempt as a
    /// release build.
    pub fn with_variant(self, variant: Variant) -> Self {
        Self { variant, ..self }
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.os, self.arch, self.variant)
    }
}

/// Error returned when an OS or architecture string cannot be parsed.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseTargetError {
    /// What kind of value failed to parse ("OS" or "architecture").
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}
