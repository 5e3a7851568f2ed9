//! Non-fatal findings produced while validating and loading a container
//!
//! Diagnostics accumulate instead of aborting: a load always returns the best
//! graph it could build together with every diagnostic raised on the way. The
//! core never formats or displays them beyond `Display`.

use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, e.g. an identifier was assigned during load
    Info,
    /// Content was kept but does not conform
    Warning,
    /// Content was dropped or could not be used
    Error,
}

/// What produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// The part does not conform to its schema
    SchemaViolation,
    /// A node could not be mapped and was dropped from the entity
    ParseDegraded,
    /// A reference does not resolve within the project
    DanglingReference,
    /// `bcf.version` is missing or names a version that is not supported
    UnsupportedVersion,
}

/// A single diagnostic record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Name of the container part the diagnostic refers to
    pub part_name: String,
    /// Location inside the part (element path, optionally with line/column)
    pub location: String,
    /// Human readable description
    pub message: String,
    /// Severity of the finding
    pub severity: Severity,
    /// Category of the finding
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        part_name: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            part_name: part_name.into(),
            location: location.into(),
            message: message.into(),
            severity,
            kind,
        }
    }

    /// A node was dropped while mapping a part into entities
    pub fn degraded(
        part_name: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            DiagnosticKind::ParseDegraded,
            Severity::Error,
            part_name,
            location,
            message,
        )
    }

    /// A reference could not be resolved
    pub fn dangling(
        part_name: impl Into<String>,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            DiagnosticKind::DanglingReference,
            Severity::Warning,
            part_name,
            location,
            message,
        )
    }

    /// True if the diagnostic concerns the part or anything below the folder
    pub fn concerns(&self, part_or_folder: &str) -> bool {
        self.part_name == part_or_folder
            || self
                .part_name
                .strip_prefix(part_or_folder)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}: {}", severity, self.part_name)?;
        if !self.location.is_empty() {
            write!(f, " at {}", self.location)?;
        }
        write!(f, ": {}", self.message)
    }
}
