//! Check operation - manifest validation.

use std::path::Path;

use plinth_engine::pipeline::{CompilationContext, Pipeline, Severity, TracingPlugin};
use plinth_manifest::Manifest;

use crate::reports::CheckReport;

/// Execute the check operation.
///
/// Runs the pipeline to validate the manifest and returns diagnostics. A
/// failing phase is not an error here; its diagnostics end up in the report.
pub fn check(manifest: &Manifest, config_path: &Path) -> CheckReport {
    let mut ctx = CompilationContext::new(manifest.clone());
    let failure = Pipeline::new()
        .plugin(TracingPlugin::new())
        .run_with(&mut ctx)
        .err();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    for diag in &ctx.diagnostics {
        let msg = if let Some(loc) = &diag.location {
            format!("{}\n  --> {}", diag.message, loc)
        } else {
            diag.message.clone()
        };

        match diag.severity {
            Severity::Error => errors.push(msg),
            Severity::Warning => warnings.push(msg),
            Severity::Info => infos.push(msg),
        }
    }

    // A phase can fail without leaving a diagnostic behind.
    if let Some(err) = failure.filter(|_| errors.is_empty()) {
        errors.push(format!("{err:#}"));
    }

    CheckReport {
        config_path: config_path.to_path_buf(),
        stack: manifest.stack.name.clone(),
        resources: ctx.graph.as_ref().map(|g| g.len()),
        levels: ctx.plan.as_ref().map(|p| p.levels().len()),
        errors,
        warnings,
        infos,
    }
}
