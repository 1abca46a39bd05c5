//! Findings reported by pipeline phases and lints.

use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// The manifest cannot be planned.
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The manifest declaration a finding points at.
///
/// Displays as a dotted path, e.g. `resource.HistoryTable` or
/// `grant.ApiHandler`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// A `[[resource]]` entry, by id.
    Resource(String),
    /// The `[resource.config]` table of a resource.
    Config(String),
    /// The `[[grant]]` entries of a principal.
    Grant(String),
    /// The `[[route]]` entries of an api.
    Route(String),
    /// The `[[notification]]` entries of a bucket.
    Notification(String),
}

impl Location {
    /// The resource id this location is keyed by.
    pub fn id(&self) -> &str {
        match self {
            Location::Resource(id)
            | Location::Config(id)
            | Location::Grant(id)
            | Location::Route(id)
            | Location::Notification(id) => id,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Resource(id) => write!(f, "resource.{id}"),
            Location::Config(id) => write!(f, "resource.{id}.config"),
            Location::Grant(principal) => write!(f, "grant.{principal}"),
            Location::Route(api) => write!(f, "route.{api}"),
            Location::Notification(bucket) => write!(f, "notification.{bucket}"),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One finding from a phase or lint.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Name of the phase that reported it.
    pub phase: String,
    pub message: String,
    pub location: Option<Location>,
}

impl Diagnostic {
    fn new(severity: Severity, phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            phase: phase.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn error(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, phase, message)
    }

    pub fn warning(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, phase, message)
    }

    pub fn info(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, phase, message)
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        match &self.location {
            Some(location) => write!(f, " (at {location})"),
            None => Ok(()),
        }
    }
}
