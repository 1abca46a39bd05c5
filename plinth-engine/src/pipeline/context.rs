//! Compilation context passed through pipeline phases.

use eyre::{Result, eyre};
use plinth_manifest::Manifest;

use super::diagnostic::{Diagnostic, Severity};
use crate::{graph::Graph, plan::Plan};

/// Context passed through all pipeline phases.
///
/// This struct carries the state of compilation through each phase,
/// accumulating results and diagnostics along the way.
#[derive(Debug)]
pub struct CompilationContext {
    /// The original manifest being compiled.
    pub manifest: Manifest,
    /// The relationship graph (populated by LowerPhase).
    pub graph: Option<Graph>,
    /// The materialization order (populated by PlanPhase).
    pub plan: Option<Plan>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a new compilation context from a manifest.
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            graph: None,
            plan: None,
            diagnostics: Vec::new(),
        }
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    /// Add an info diagnostic.
    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    /// Add a diagnostic with a location.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }

    /// The lowered graph.
    ///
    /// # Errors
    ///
    /// Fails if LowerPhase has not run.
    pub fn graph(&self) -> Result<&Graph> {
        self.graph
            .as_ref()
            .ok_or_else(|| eyre!("graph not set - did LowerPhase run?"))
    }

    /// The computed plan.
    ///
    /// # Errors
    ///
    /// Fails if PlanPhase has not run.
    pub fn plan(&self) -> Result<&Plan> {
        self.plan
            .as_ref()
            .ok_or_else(|| eyre!("plan not set - did PlanPhase run?"))
    }

    /// Take the graph and plan out of the context, consuming them.
    pub fn take_output(&mut self) -> Result<(Graph, Plan)> {
        let graph = self
            .graph
            .take()
            .ok_or_else(|| eyre!("graph not set - did LowerPhase run?"))?;
        let plan = self
            .plan
            .take()
            .ok_or_else(|| eyre!("plan not set - did PlanPhase run?"))?;
        Ok((graph, plan))
    }
}
