//! Plan command report data structures.

use plinth_ir::{RemovalPolicy, ResourceKind};
use serde::Serialize;

use super::output::{Output, Report};

/// The materialization plan for a stack.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub stack: String,
    /// Resources grouped into levels; each level depends only on earlier ones.
    pub levels: Vec<Vec<PlannedResource>>,
    pub policies: Vec<PolicySummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PlannedResource {
    pub id: String,
    pub kind: ResourceKind,
    pub removal: RemovalPolicy,
    pub depends_on: Vec<String>,
}

/// Resolved permissions of one principal.
#[derive(Debug, Serialize)]
pub struct PolicySummary {
    pub principal: String,
    pub statements: usize,
    /// Unbound resource patterns, e.g. `${History.tableArn}`.
    pub resources: Vec<String>,
}

impl Report for PlanReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        let total: usize = self.levels.iter().map(Vec::len).sum();
        out.title(&format!("Plan for {}", self.stack));
        out.preformatted(&format!(
            "{} resources in {} levels",
            total,
            self.levels.len()
        ));
        out.newline();

        let mut index = 0;
        for (depth, level) in self.levels.iter().enumerate() {
            out.divider(&format!("level {}", depth));
            for resource in level {
                index += 1;
                let mut line = format!("{} ({})", resource.id, resource.kind);
                if resource.removal == RemovalPolicy::Retain {
                    line.push_str(" [retain]");
                }
                if !resource.depends_on.is_empty() {
                    line.push_str(&format!(" <- {}", resource.depends_on.join(", ")));
                }
                out.numbered_item(index, &line);
            }
        }

        if !self.policies.is_empty() {
            out.newline();
            out.section("Policies");
            for policy in &self.policies {
                out.list_item(&format!(
                    "{}: {} statement{}",
                    policy.principal,
                    policy.statements,
                    if policy.statements == 1 { "" } else { "s" }
                ));
                for resource in &policy.resources {
                    out.key_value_indented("on", resource);
                }
            }
        }
    }
}
