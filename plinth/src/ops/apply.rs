//! Apply and teardown operations against the dry-run provisioner.

use eyre::Result;
use plinth_engine::{
    apply::{Deployment, TeardownSummary},
    graph::Graph,
    provision::{DryRunProvisioner, Provisioner},
};
use plinth_manifest::Manifest;

use super::compile;
use crate::reports::{ApplyReport, Failure, MaterializedResource, TeardownReport};

fn provisioner(manifest: &Manifest) -> DryRunProvisioner {
    DryRunProvisioner::new(&manifest.stack.region, &manifest.stack.account)
}

/// Materialize every resource and report the generated outputs.
///
/// A failed apply is not an error: the report carries what was
/// materialized and what never started.
pub fn apply(manifest: &Manifest) -> Result<ApplyReport> {
    apply_with(manifest, &mut provisioner(manifest))
}

/// [`apply`] against any provisioner. The manifest is fully compiled
/// before the provisioner sees a single call.
pub fn apply_with(manifest: &Manifest, provisioner: &mut dyn Provisioner) -> Result<ApplyReport> {
    let compiled = compile(manifest, None)?;
    let mut deployment = Deployment::new(&compiled.graph, &compiled.plan)?;

    let (ids, failure) = match deployment.apply(provisioner) {
        Ok(summary) => (summary.materialized, None),
        Err(err) => {
            let failure = Failure {
                resource: err.failed.clone(),
                cause: err.cause.to_string(),
                pending: err.pending.clone(),
            };
            (err.materialized, Some(failure))
        }
    };

    let resources = ids
        .iter()
        .filter_map(|id| materialized(&compiled.graph, &deployment, id))
        .collect();

    Ok(ApplyReport {
        stack: compiled.graph.name().to_string(),
        engine: provisioner.name(),
        levels: compiled.plan.levels().len(),
        resources,
        failure,
    })
}

/// Materialize every resource, then tear the stack down again.
pub fn teardown(manifest: &Manifest) -> Result<TeardownReport> {
    let compiled = compile(manifest, None)?;
    let mut provisioner = provisioner(manifest);
    let mut deployment = Deployment::new(&compiled.graph, &compiled.plan)?;
    deployment.apply(&mut provisioner)?;

    let (summary, failure) = match deployment.teardown(&mut provisioner) {
        Ok(summary) => (summary, None),
        Err(err) => {
            let failure = Failure {
                resource: err.failed.clone(),
                cause: err.cause.to_string(),
                pending: err.remaining.clone(),
            };
            let summary = TeardownSummary {
                destroyed: err.destroyed,
                retained: err.retained,
            };
            (summary, Some(failure))
        }
    };

    Ok(TeardownReport {
        stack: compiled.graph.name().to_string(),
        engine: provisioner.name(),
        destroyed: summary.destroyed,
        retained: summary.retained,
        failure,
    })
}

fn materialized(graph: &Graph, deployment: &Deployment<'_>, id: &str) -> Option<MaterializedResource> {
    let descriptor = graph.descriptor(id)?;
    Some(MaterializedResource {
        id: id.to_string(),
        kind: descriptor.kind(),
        outputs: deployment
            .outputs()
            .outputs_of(id)
            .cloned()
            .unwrap_or_default(),
        environment: deployment
            .resolved(id)
            .map(|resolved| resolved.environment())
            .unwrap_or_default(),
    })
}
