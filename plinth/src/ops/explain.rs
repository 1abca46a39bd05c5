//! Explain operation - pipeline explanation.

use std::path::Path;

use eyre::Result;
use plinth_engine::pipeline::{Pipeline, phases::ValidatePhase};
use plinth_manifest::Manifest;

use super::compile;
use crate::reports::{AnalysisResult, ExplainReport, LintInfo, ManifestInfo, PhaseInfo};

/// Execute the explain operation.
///
/// Runs the pipeline and returns information about what it does.
pub fn explain(manifest: &Manifest, config_path: &Path) -> Result<ExplainReport> {
    let phases: Vec<PhaseInfo> = Pipeline::new()
        .phase_info()
        .into_iter()
        .map(|p| PhaseInfo {
            name: p.name.to_string(),
            description: p.description.to_string(),
        })
        .collect();

    let lints: Vec<LintInfo> = ValidatePhase::new()
        .lint_info()
        .into_iter()
        .map(|l| LintInfo {
            name: l.name.to_string(),
            description: l.description.to_string(),
        })
        .collect();

    let compiled = compile(manifest, None)?;
    let graph = &compiled.graph;

    Ok(ExplainReport {
        config_path: config_path.to_path_buf(),
        manifest: ManifestInfo {
            name: manifest.stack.name.clone(),
            region: manifest.stack.region.clone(),
            account: manifest.stack.account.clone(),
        },
        phases,
        lints,
        analysis: AnalysisResult {
            declared: manifest.resources.len(),
            synthesized: graph.len() - manifest.resources.len(),
            dependencies: graph.dependencies().count(),
            grants: graph.grants().len(),
            principals: graph.policies().count(),
            levels: compiled.plan.levels().len(),
            widest_level: compiled.plan.levels().iter().map(Vec::len).max().unwrap_or(0),
        },
    })
}
