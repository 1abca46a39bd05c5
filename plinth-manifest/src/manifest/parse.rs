//! Manifest parsing from files and strings.

use std::{collections::HashMap, path::Path, str::FromStr};

use super::{Manifest, validate::ParseContext};
use crate::{Error, MANIFEST_FILE, Result, error::SourceContext};

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        parse_manifest(s, MANIFEST_FILE)
    }
}

impl Manifest {
    /// Parse a plinth.toml file from the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        parse_manifest(&content, &path.display().to_string())
    }

    /// Parse a plinth.toml from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        parse_manifest(content, filename)
    }
}

/// Parse a manifest from content with the given filename for error reporting.
pub fn parse_manifest(content: &str, filename: &str) -> Result<Manifest> {
    let source_ctx = SourceContext::new(content, filename);
    let manifest: Manifest = toml::from_str(content).map_err(|e| source_ctx.parse_error(e))?;
    validate_manifest(&manifest, content, filename)?;
    Ok(manifest)
}

/// Validate the manifest after parsing.
fn validate_manifest(manifest: &Manifest, src: &str, filename: &str) -> Result<()> {
    let ctx = ParseContext::new(src, filename);

    let mut seen = HashMap::new();
    for resource in &manifest.resources {
        resource.validate(&ctx)?;

        if let Some(first) = seen.insert(resource.id(), resource.id_span()) {
            return Err(ctx.source_context().duplicate_id_error(
                resource.id(),
                first,
                resource.id_span(),
            ));
        }
    }

    for grant in &manifest.grants {
        grant.validate(&ctx)?;
    }
    for route in &manifest.routes {
        route.validate(&ctx)?;
    }
    for notification in &manifest.notifications {
        notification.validate(&ctx)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use plinth_ir::{Access, Effect, GrantIntent, HttpMethod, RemovalPolicy, ResourceKind};

    use super::*;

    const MINIMAL: &str = r#"
        [stack]
        name = "demo"
    "#;

    #[test]
    fn test_minimal_manifest() {
        let manifest = Manifest::from_str(MINIMAL).unwrap();
        assert_eq!(manifest.stack.name, "demo");
        assert_eq!(manifest.stack.region, "us-east-1");
        assert!(manifest.resources.is_empty());
    }

    #[test]
    fn test_resources_keep_declaration_order() {
        let manifest = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "Zeta"
            kind = "bucket"

            [[resource]]
            id = "Alpha"
            kind = "table"
            removal = "retain"

            [resource.config]
            tableName = "history"
            billingMode = "PAY_PER_REQUEST"
        "#,
        )
        .unwrap();

        let ids: Vec<&str> = manifest.resources.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["Zeta", "Alpha"]);

        let table = manifest.resource("Alpha").unwrap();
        assert_eq!(table.kind, ResourceKind::Table);
        assert_eq!(table.removal, RemovalPolicy::Retain);
        let keys: Vec<&String> = table.config.keys().collect();
        assert_eq!(keys, vec!["tableName", "billingMode"]);
    }

    #[test]
    fn test_function_environment() {
        let manifest = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "Handler"
            kind = "function"

            [resource.environment]
            TABLE_NAME = "${History.tableName}"
        "#,
        )
        .unwrap();

        let handler = manifest.resource("Handler").unwrap();
        assert_eq!(
            handler.environment.get("TABLE_NAME").map(String::as_str),
            Some("${History.tableName}")
        );
    }

    #[test]
    fn test_environment_rejected_on_non_function() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "History"
            kind = "table"

            [resource.environment]
            X = "y"
        "#,
        )
        .unwrap_err();
        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_duplicate_id() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "Bucket"
            kind = "bucket"

            [[resource]]
            id = "Bucket"
            kind = "table"
        "#,
        )
        .unwrap_err();

        match *err {
            Error::DuplicateId {
                id,
                first_span,
                second_span,
                ..
            } => {
                assert_eq!(id, "Bucket");
                assert!(first_span.offset() < second_span.offset());
            }
            other => panic!("expected DuplicateId, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "Queue"
            kind = "queue"
        "#,
        )
        .unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_invalid_id() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[resource]]
            id = "my.table"
            kind = "table"
        "#,
        )
        .unwrap_err();

        match *err {
            Error::InvalidIdentifier { name, span, .. } => {
                assert_eq!(name, "my.table");
                assert!(span.is_some());
            }
            other => panic!("expected InvalidIdentifier, got {:?}", other),
        }
    }

    #[test]
    fn test_grants() {
        let manifest = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[grant]]
            principal = "Handler"
            resource = "History"
            access = "read-write"

            [[grant]]
            principal = "Handler"
            resource = "Pool"
            actions = ["cognito-idp:AdminGetUser"]
            effect = "deny"
        "#,
        )
        .unwrap();

        assert_eq!(
            manifest.grants[0].intent(),
            GrantIntent::Access(Access::ReadWrite)
        );
        match manifest.grants[1].intent() {
            GrantIntent::Custom { effect, actions } => {
                assert_eq!(effect, Effect::Deny);
                assert!(actions.contains("cognito-idp:AdminGetUser"));
            }
            other => panic!("expected custom intent, got {:?}", other),
        }
    }

    #[test]
    fn test_grant_needs_access_or_actions() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[grant]]
            principal = "Handler"
            resource = "History"
        "#,
        )
        .unwrap_err();
        assert!(matches!(*err, Error::Validation { .. }));
    }

    #[test]
    fn test_grant_rejects_both_access_and_actions() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[grant]]
            principal = "Handler"
            resource = "History"
            access = "read"
            actions = ["dynamodb:GetItem"]
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("both"));
    }

    #[test]
    fn test_routes_and_notifications() {
        let manifest = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[route]]
            api = "Gateway"
            path = "/users"
            method = "POST"
            function = "Handler"
            authorizer = "Auth"

            [[notification]]
            bucket = "Uploads"
            function = "Processor"
        "#,
        )
        .unwrap();

        assert_eq!(manifest.routes[0].method, HttpMethod::Post);
        assert_eq!(manifest.routes[0].authorizer.as_deref(), Some("Auth"));
        assert_eq!(
            manifest.notifications[0].event,
            plinth_ir::EventType::ObjectCreated
        );
    }

    #[test]
    fn test_route_method_ignores_case() {
        let route = |method: &str| {
            Manifest::from_str(&format!(
                r#"
                [stack]
                name = "demo"

                [[route]]
                api = "Gateway"
                path = "/users"
                method = "{method}"
                function = "Handler"
            "#
            ))
        };

        assert_eq!(route("post").unwrap().routes[0].method, HttpMethod::Post);
        assert_eq!(route("Delete").unwrap().routes[0].method, HttpMethod::Delete);
        let err = route("fetch").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_route_path_must_be_absolute() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"

            [[route]]
            api = "Gateway"
            path = "users"
            method = "GET"
            function = "Handler"
        "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = Manifest::from_str(
            r#"
            [stack]
            name = "demo"
            colour = "blue"
        "#,
        )
        .unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }
}
