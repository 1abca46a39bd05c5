use plinth_ir::{Access, Effect, GrantIntent};
use serde::Deserialize;

use crate::{ParseContext, Result};

/// A declared permission grant
///
/// Either a named access level on a resource:
///
/// ```toml
/// [[grant]]
/// principal = "ApiHandler"
/// resource = "HistoryTable"
/// access = "read-write"
/// ```
///
/// or an explicit action list, scoped to a resource or explicitly global:
///
/// ```toml
/// [[grant]]
/// principal = "ApiHandler"
/// resource = "UserPool"
/// actions = ["cognito-idp:AdminGetUser"]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantDecl {
    /// Resource receiving the permissions
    pub principal: String,

    /// Resource the permissions apply to
    pub resource: Option<String>,

    /// Named access level
    pub access: Option<Access>,

    /// Explicit actions
    #[serde(default)]
    pub actions: Vec<String>,

    /// Effect of explicit actions
    #[serde(default)]
    pub effect: Effect,

    /// Apply explicit actions to every resource
    #[serde(default)]
    pub global: bool,
}

impl GrantDecl {
    /// The intent this grant declares.
    ///
    /// Only meaningful after validation, which guarantees exactly one of
    /// `access` and `actions` is set.
    pub fn intent(&self) -> GrantIntent {
        match self.access {
            Some(access) => GrantIntent::Access(access),
            None => GrantIntent::Custom {
                effect: self.effect,
                actions: self.actions.iter().cloned().collect(),
            },
        }
    }

    pub(crate) fn validate(&self, ctx: &ParseContext) -> Result<()> {
        ctx.validate_id(&self.principal, "principal", ctx.find_span(&self.principal))?;
        if let Some(resource) = &self.resource {
            ctx.validate_id(resource, "grant resource", ctx.find_span(resource))?;
        }

        let source = ctx.source_context();
        let span = ctx.find_span(&self.principal);
        let describe = || match &self.resource {
            Some(r) => format!("grant from '{}' to '{}'", self.principal, r),
            None => format!("grant to '{}'", self.principal),
        };

        match (self.access, self.actions.is_empty()) {
            (Some(_), false) => Err(source.validation_error(
                format!("{} sets both 'access' and 'actions'", describe()),
                span,
            )),
            (None, true) => Err(source.validation_error(
                format!("{} needs either 'access' or 'actions'", describe()),
                span,
            )),
            (Some(_), true) if self.resource.is_none() => Err(source.validation_error(
                format!("{} names an access level but no 'resource'", describe()),
                span,
            )),
            (Some(_), true) if self.global || self.effect == Effect::Deny => {
                Err(source.validation_error(
                    format!(
                        "{}: 'global' and 'effect' only apply to explicit 'actions'",
                        describe()
                    ),
                    span,
                ))
            }
            _ => Ok(()),
        }
    }
}
