//! Audit phase - reports findings that are not fatal.

use eyre::Result;
use plinth_ir::RemovalPolicy;

use crate::pipeline::{CompilationContext, Diagnostic, Location, Phase};

/// Phase that checks resolved policies and removal behavior.
///
/// Everything reported here is a warning or info; the audit never fails a
/// pipeline.
pub struct AuditPhase;

impl Phase for AuditPhase {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn description(&self) -> &'static str {
        "Report conflicting grants and retained resources"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut findings = Vec::new();
        let graph = ctx.graph()?;

        for (principal, policy) in graph.policies() {
            for conflict in policy.conflicts() {
                tracing::warn!(principal, %conflict, "conflicting grant");
                findings.push(
                    Diagnostic::warning(
                        self.name(),
                        format!("'{}': {}", principal, conflict),
                    )
                    .at(Location::Grant(principal.to_string())),
                );
            }
        }

        for descriptor in graph.descriptors() {
            if descriptor.removal_policy() == RemovalPolicy::Retain {
                findings.push(
                    Diagnostic::info(
                        self.name(),
                        format!("'{}' is retained on teardown", descriptor.id()),
                    )
                    .at(Location::Resource(descriptor.id().to_string())),
                );
            }
        }

        ctx.diagnostics.extend(findings);
        Ok(())
    }
}
