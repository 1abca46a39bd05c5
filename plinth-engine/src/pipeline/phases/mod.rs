//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`ValidatePhase`] - lints the manifest and collects diagnostics
//! - [`LowerPhase`] - builds the relationship graph from the manifest
//! - [`PlanPhase`] - orders the graph and reports cycles
//! - [`AuditPhase`] - reports policy conflicts and retained resources

mod audit;
mod lower;
mod plan;
mod validate;

pub use audit::AuditPhase;
pub use lower::{LowerPhase, lower_manifest};
pub use plan::PlanPhase;
pub use validate::{
    AdminScopeLint, FunctionHandlerLint, Lint, LintInfo, ResourceNamingLint, ValidatePhase,
};
