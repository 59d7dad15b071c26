//! Structured build diagnostics attributed to pipeline stages and units.

use crate::progress::Stage;
use crate::severity::Severity;
use kiln_common::UnitName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A structured diagnostic produced during a build or launch.
///
/// Each diagnostic records the severity, the pipeline stage it originated
/// from, the compilation unit it concerns (when attributable to one), and a
/// human-readable message. The session aggregates diagnostics from all
/// failed units rather than stopping at the first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The pipeline stage that produced this diagnostic.
    pub stage: Stage,
    /// The compilation unit this diagnostic concerns, if any.
    pub unit: Option<UnitName>,
    /// The diagnostic message.
    pub message: String,
}

impl Diagnostic {
    /// Creates an error diagnostic for a stage.
    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            stage,
            unit: None,
            message: message.into(),
        }
    }

    /// Creates a warning diagnostic for a stage.
    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            stage,
            unit: None,
            message: message.into(),
        }
    }

    /// Attributes this diagnostic to a compilation unit.
    pub fn with_unit(mut self, unit: UnitName) -> Self {
        self.unit = Some(unit);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(
                f,
                "{}[{}] {}: {}",
                self.severity, self.stage, unit, self.message
            ),
            None => write!(f, "{}[{}]: {}", self.severity, self.stage, self.message),
        }
    }
}
