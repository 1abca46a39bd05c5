//! Plan phase - orders the graph for materialization.

use eyre::{Result, bail};

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// Phase that computes the materialization order and levels.
pub struct PlanPhase;

impl Phase for PlanPhase {
    fn name(&self) -> &'static str {
        "plan"
    }

    fn description(&self) -> &'static str {
        "Order resources by dependency and detect cycles"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let graph = ctx.graph()?;
        match graph.plan() {
            Ok(plan) => {
                ctx.plan = Some(plan);
                Ok(())
            }
            Err(err) => {
                let mut diagnostic = Diagnostic::error(self.name(), err.to_string());
                if let Some(location) = err.location() {
                    diagnostic = diagnostic.at(location);
                }
                ctx.add_diagnostic(diagnostic);
                bail!("Planning failed: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use plinth_manifest::Manifest;

    use super::*;
    use crate::pipeline::phases::LowerPhase;

    fn context(content: &str) -> CompilationContext {
        let manifest = Manifest::from_str(content).expect("Failed to parse test manifest");
        let mut ctx = CompilationContext::new(manifest);
        LowerPhase.run(&mut ctx).expect("lowering should succeed");
        ctx
    }

    #[test]
    fn test_plan_is_set() {
        let mut ctx = context(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "Cdn"
            kind = "distribution"

            [resource.config]
            origin = "${Assets.bucketDomainName}"

            [[resource]]
            id = "Assets"
            kind = "bucket"
        "#,
        );

        PlanPhase.run(&mut ctx).unwrap();
        assert_eq!(ctx.plan().unwrap().order(), ["Assets", "Cdn"]);
    }

    #[test]
    fn test_cycle_is_an_error_diagnostic() {
        let mut ctx = context(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "First"
            kind = "bucket"
            depends_on = ["Second"]

            [[resource]]
            id = "Second"
            kind = "bucket"
            depends_on = ["First"]
        "#,
        );

        let err = PlanPhase.run(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("First -> Second -> First"));
        assert_eq!(ctx.error_count(), 1);
        assert!(ctx.plan.is_none());
    }

    #[test]
    fn test_requires_graph() {
        let manifest = Manifest::from_str("[stack]\nname = \"demo\"\n").unwrap();
        let mut ctx = CompilationContext::new(manifest);
        assert!(PlanPhase.run(&mut ctx).is_err());
    }
}
