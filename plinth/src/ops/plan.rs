//! Plan operation - ordering and grant summary.

use std::path::Path;

use eyre::Result;
use plinth_engine::pipeline::Severity;
use plinth_manifest::Manifest;

use super::compile;
use crate::reports::{PlanReport, PlannedResource, PolicySummary};

/// Options for the plan operation.
pub struct PlanOptions<'a> {
    /// Directory to write per-phase snapshots to.
    pub snapshots: Option<&'a Path>,
}

/// Execute the plan operation.
pub fn plan(manifest: &Manifest, opts: PlanOptions) -> Result<PlanReport> {
    let compiled = compile(manifest, opts.snapshots)?;
    let graph = &compiled.graph;

    let levels = compiled
        .plan
        .levels()
        .iter()
        .map(|level| {
            level
                .iter()
                .filter_map(|id| graph.descriptor(id))
                .map(|descriptor| PlannedResource {
                    id: descriptor.id().to_string(),
                    kind: descriptor.kind(),
                    removal: descriptor.removal_policy(),
                    depends_on: graph
                        .dependencies_of(descriptor.id())
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                })
                .collect()
        })
        .collect();

    let policies = graph
        .policies()
        .map(|(principal, policy)| PolicySummary {
            principal: principal.to_string(),
            statements: policy.len(),
            resources: policy.resources().map(str::to_string).collect(),
        })
        .collect();

    let warnings = compiled
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .map(|d| d.message.clone())
        .collect();

    Ok(PlanReport {
        stack: graph.name().to_string(),
        levels,
        policies,
        warnings,
    })
}
