use indexmap::IndexMap;
use miette::SourceSpan;
use plinth_ir::{RemovalPolicy, ResourceKind};
use serde::Deserialize;
use toml::Spanned;

use crate::{ParseContext, Result};

/// A declared resource
///
/// ```toml
/// [[resource]]
/// id = "HistoryTable"
/// kind = "table"
/// removal = "destroy"
///
/// [resource.config]
/// tableName = "history"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceDecl {
    /// Unique id within the stack
    /// Wrapped in Spanned to preserve source location for error reporting
    pub id: Spanned<String>,

    /// Resource kind
    pub kind: ResourceKind,

    /// What happens to the resource on teardown
    #[serde(default)]
    pub removal: RemovalPolicy,

    /// Explicit prerequisites (by id)
    #[serde(default)]
    pub depends_on: Vec<String>,

    /// Kind-specific configuration; strings may contain `${Id.outputKey}` references
    #[serde(default)]
    pub config: IndexMap<String, toml::Value>,

    /// Function environment; values may contain `${Id.outputKey}` references
    #[serde(default)]
    pub environment: IndexMap<String, String>,
}

impl ResourceDecl {
    /// Get the resource id.
    pub fn id(&self) -> &str {
        self.id.get_ref()
    }

    /// Get the source span of the id.
    pub fn id_span(&self) -> SourceSpan {
        self.id.span().into()
    }

    pub(crate) fn validate(&self, ctx: &ParseContext) -> Result<()> {
        ctx.validate_id(self.id(), "resource id", Some(self.id_span()))?;

        let ctx = ctx.push(self.id());

        for dep in &self.depends_on {
            ctx.validate_id(dep, "dependency", ctx.find_span(dep))?;
        }

        if !self.environment.is_empty() && self.kind != ResourceKind::Function {
            return Err(ctx.source_context().validation_error(
                format!(
                    "'{}' is a {}; only functions take an environment",
                    self.id(),
                    self.kind
                ),
                Some(self.id_span()),
            ));
        }

        if self.config.contains_key("environment") {
            return Err(ctx.source_context().validation_error(
                format!(
                    "'{}' sets 'environment' under config; use [resource.environment] instead",
                    self.id()
                ),
                Some(self.id_span()),
            ));
        }

        Ok(())
    }
}
