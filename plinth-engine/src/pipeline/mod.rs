//! Compilation pipeline from manifest to plan.
//!
//! This module provides a [`Pipeline`] orchestrator that manages the phases
//! between a parsed manifest and an ordered, permission-resolved plan:
//!
//! - Explicit phase boundaries (validate → lower → plan → audit)
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection
//! - Shared state via [`CompilationContext`]
//!
//! # Example
//!
//! ```ignore
//! use plinth_engine::pipeline::{Pipeline, Severity};
//!
//! let pipeline = Pipeline::new();
//! let ctx = pipeline.run(manifest)?;
//!
//! for diag in &ctx.diagnostics {
//!     if matches!(diag.severity, Severity::Warning) {
//!         eprintln!("warning: {}", diag.message);
//!     }
//! }
//!
//! let plan = ctx.plan()?;
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;
mod snapshot;
mod trace;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Location, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
pub use snapshot::{PhaseSnapshot, SnapshotPlugin};
pub use trace::TracingPlugin;
