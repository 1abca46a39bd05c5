//! Apply and teardown report data structures.

use indexmap::IndexMap;
use plinth_ir::ResourceKind;
use serde::Serialize;

use super::output::{Output, Report};

/// Where an apply or teardown stopped.
#[derive(Debug, Serialize)]
pub struct Failure {
    pub resource: String,
    pub cause: String,
    /// Resources never reached (apply) or still materialized (teardown).
    pub pending: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MaterializedResource {
    pub id: String,
    pub kind: ResourceKind,
    pub outputs: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub environment: IndexMap<String, String>,
}

/// Result of applying a plan.
#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub stack: String,
    pub engine: &'static str,
    pub levels: usize,
    /// Materialized resources, in plan order.
    pub resources: Vec<MaterializedResource>,
    pub failure: Option<Failure>,
}

/// Result of tearing a stack down.
#[derive(Debug, Serialize)]
pub struct TeardownReport {
    pub stack: String,
    pub engine: &'static str,
    /// Destroyed resources, in teardown order.
    pub destroyed: Vec<String>,
    pub retained: Vec<String>,
    pub failure: Option<Failure>,
}

fn render_failure(failure: &Failure, pending_label: &str, out: &mut dyn Output) {
    out.newline();
    out.warning(&format!("failed at '{}': {}", failure.resource, failure.cause));
    if !failure.pending.is_empty() {
        out.section(pending_label);
        for id in &failure.pending {
            out.list_item(id);
        }
    }
}

impl Report for ApplyReport {
    fn render(&self, out: &mut dyn Output) {
        out.title(&format!("Apply {} ({})", self.stack, self.engine));
        for resource in &self.resources {
            out.added_item(&format!("{} ({})", resource.id, resource.kind));
            for (key, value) in &resource.outputs {
                out.key_value_indented(&format!("  {}", key), value);
            }
            for (key, value) in &resource.environment {
                out.key_value_indented(&format!("  env.{}", key), value);
            }
        }

        match &self.failure {
            Some(failure) => render_failure(failure, "Not attempted", out),
            None => {
                out.newline();
                out.preformatted(&format!(
                    "✓ {} resources materialized in {} levels",
                    self.resources.len(),
                    self.levels
                ));
            }
        }
    }
}

impl Report for TeardownReport {
    fn render(&self, out: &mut dyn Output) {
        out.title(&format!("Teardown {} ({})", self.stack, self.engine));
        for id in &self.destroyed {
            out.removed_item(id);
        }
        if !self.retained.is_empty() {
            out.section("Retained");
            for id in &self.retained {
                out.list_item(id);
            }
        }

        match &self.failure {
            Some(failure) => render_failure(failure, "Still materialized", out),
            None => {
                out.newline();
                out.preformatted(&format!(
                    "✓ {} destroyed, {} retained",
                    self.destroyed.len(),
                    self.retained.len()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::render_to_string;

    #[test]
    fn test_render_apply() {
        let report = ApplyReport {
            stack: "uploads".into(),
            engine: "dry-run",
            levels: 2,
            resources: vec![
                MaterializedResource {
                    id: "History".into(),
                    kind: ResourceKind::Table,
                    outputs: IndexMap::from([("tableName".to_string(), "history".to_string())]),
                    environment: IndexMap::new(),
                },
                MaterializedResource {
                    id: "Processor".into(),
                    kind: ResourceKind::Function,
                    outputs: IndexMap::new(),
                    environment: IndexMap::from([(
                        "TABLE_NAME".to_string(),
                        "history".to_string(),
                    )]),
                },
            ],
            failure: None,
        };

        insta::assert_snapshot!(render_to_string(&report), @r"
        Apply uploads (dry-run)
        =======================
          + History (table)
            tableName: history
          + Processor (function)
            env.TABLE_NAME: history

        ✓ 2 resources materialized in 2 levels
        ");
    }

    #[test]
    fn test_render_teardown_failure() {
        let report = TeardownReport {
            stack: "uploads".into(),
            engine: "dry-run",
            destroyed: vec!["Processor".into()],
            retained: vec!["History".into()],
            failure: Some(Failure {
                resource: "UploadBucket".into(),
                cause: "bucket is not empty".into(),
                pending: vec!["UploadBucket".into()],
            }),
        };

        insta::assert_snapshot!(render_to_string(&report), @r"
        Teardown uploads (dry-run)
        ==========================
          - Processor
        Retained:
          - History

        Still materialized:
          - UploadBucket
        ");
    }
}
