//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod apply;
mod check;
mod explain;
mod output;
mod plan;

pub use apply::{ApplyReport, Failure, MaterializedResource, TeardownReport};
pub use check::CheckReport;
pub use explain::{AnalysisResult, ExplainReport, LintInfo, ManifestInfo, PhaseInfo};
#[cfg(test)]
pub(crate) use output::render_to_string;
pub use output::{Report, TerminalOutput};
pub use plan::{PlanReport, PlannedResource, PolicySummary};
