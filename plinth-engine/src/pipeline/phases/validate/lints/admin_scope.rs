//! Lint for administrative identity actions.

use plinth_ir::ResourceKind;
use plinth_manifest::Manifest;

use super::super::Lint;
use crate::pipeline::{Diagnostic, Location};

/// Lint that flags administrative user-pool actions granted on a whole pool.
///
/// Such grants are emitted exactly as declared, scoped to the pool's ARN.
/// This lint only makes the breadth visible.
pub struct AdminScopeLint;

impl Lint for AdminScopeLint {
    fn name(&self) -> &'static str {
        "admin-scope"
    }

    fn description(&self) -> &'static str {
        "Flag administrative actions granted over a whole user pool"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for grant in &manifest.grants {
            let Some(target) = grant.resource.as_deref() else {
                continue;
            };
            let is_pool = manifest
                .resource(target)
                .is_some_and(|r| r.kind == ResourceKind::UserPool);
            if !is_pool {
                continue;
            }

            let admin: Vec<&str> = grant
                .actions
                .iter()
                .map(String::as_str)
                .filter(|a| is_admin_action(a))
                .collect();
            if !admin.is_empty() {
                diagnostics.push(
                    Diagnostic::info(
                        "validate",
                        format!(
                            "'{}' is granted {} on every user in '{}'",
                            grant.principal,
                            admin.join(", "),
                            target
                        ),
                    )
                    .at(Location::Grant(grant.principal.clone())),
                );
            }
        }
    }
}

fn is_admin_action(action: &str) -> bool {
    action
        .split_once(':')
        .is_some_and(|(_, name)| name.starts_with("Admin") || name == "*")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_is_admin_action() {
        assert!(is_admin_action("cognito-idp:AdminAddUserToGroup"));
        assert!(is_admin_action("cognito-idp:*"));
        assert!(!is_admin_action("cognito-idp:ListUsers"));
        assert!(!is_admin_action("AdminGetUser"));
    }

    #[test]
    fn test_flags_admin_grant_on_pool() {
        let manifest = Manifest::from_str(
            r#"
            [stack]
            name = "test"

            [[resource]]
            id = "Users"
            kind = "user-pool"

            [[resource]]
            id = "Handler"
            kind = "function"

            [[grant]]
            principal = "Handler"
            resource = "Users"
            actions = ["cognito-idp:AdminAddUserToGroup", "cognito-idp:ListUsers"]
        "#,
        )
        .unwrap();

        let mut diagnostics = Vec::new();
        AdminScopeLint.check(&manifest, &mut diagnostics);

        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].severity.is_warning());
        assert_eq!(
            diagnostics[0].location,
            Some(Location::Grant("Handler".into()))
        );
        assert_eq!(
            diagnostics[0].message,
            "'Handler' is granted cognito-idp:AdminAddUserToGroup on every user in 'Users'"
        );
    }
}
