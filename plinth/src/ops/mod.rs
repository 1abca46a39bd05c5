//! Core operations.
//!
//! This module contains the business logic for plinth commands,
//! separated from CLI argument parsing and output rendering.

pub mod apply;
pub mod check;
pub mod explain;
pub mod plan;

use std::path::Path;

pub use apply::{apply, teardown};
pub use check::check;
use eyre::Result;
pub use explain::explain;
pub use plan::plan;
use plinth_engine::{
    graph::Graph,
    pipeline::{CompilationContext, Diagnostic, Pipeline, SnapshotPlugin, TracingPlugin},
    plan::Plan,
};
use plinth_manifest::Manifest;

/// A manifest that made it through every pipeline phase.
pub struct Compiled {
    pub graph: Graph,
    pub plan: Plan,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the full pipeline, optionally writing per-phase snapshots to `snapshots`.
pub fn compile(manifest: &Manifest, snapshots: Option<&Path>) -> Result<Compiled> {
    let mut pipeline = Pipeline::new().plugin(TracingPlugin::new());
    if let Some(dir) = snapshots {
        pipeline = pipeline.plugin(SnapshotPlugin::with_output_dir(dir));
    }

    let mut ctx = CompilationContext::new(manifest.clone());
    if let Err(err) = pipeline.run_with(&mut ctx) {
        for diagnostic in ctx.errors() {
            tracing::error!(phase = %diagnostic.phase, "{}", diagnostic.message);
        }
        return Err(err.wrap_err("Pipeline failed"));
    }

    let (graph, plan) = ctx.take_output()?;
    Ok(Compiled {
        graph,
        plan,
        diagnostics: ctx.diagnostics,
    })
}


#[cfg(test)]
mod tests {
    use super::{fixtures::*, *};

    #[test]
    fn test_compile() {
        let compiled = compile(&manifest(STACK), None).unwrap();
        assert_eq!(compiled.graph.len(), 4);
        assert_eq!(
            compiled.plan.order(),
            ["UploadBucket", "History", "Processor", "UploadBucket-object-created-Processor"]
        );
    }

    #[test]
    fn test_compile_writes_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        compile(&manifest(STACK), Some(dir.path())).unwrap();
        for phase in ["validate", "lower", "plan", "audit"] {
            assert!(dir.path().join(format!("{phase}.json")).exists());
        }
    }

    #[test]
    fn test_compile_fails_on_cycle() {
        let err = compile(
            &manifest(
                r#"
                [stack]
                name = "loop"

                [[resource]]
                id = "A"
                kind = "bucket"
                depends_on = ["B"]

                [[resource]]
                id = "B"
                kind = "bucket"
                depends_on = ["A"]
            "#,
            ),
            None,
        )
        .err()
        .unwrap();
        assert!(format!("{err:?}").contains("A -> B -> A"));
    }
}
