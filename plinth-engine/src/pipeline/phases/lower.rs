//! Lower phase - transforms the manifest into a relationship graph.
//!
//! Every manifest declaration maps onto one [`GraphBuilder`] call; the
//! builder then derives implicit edges and resolves grants.

use eyre::{Result, bail};
use indexmap::IndexMap;
use plinth_ir::{ConfigValue, Grant, Notification, ResourceDescriptor, Route};
use plinth_manifest::{GrantDecl, Manifest, NotificationDecl, ResourceDecl, RouteDecl};

use crate::{
    GraphError,
    graph::{Graph, GraphBuilder},
    pipeline::{CompilationContext, Diagnostic, Phase},
};

/// Phase that transforms the manifest into a [`Graph`].
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Build the relationship graph and resolve grants"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        match lower_manifest(&ctx.manifest) {
            Ok(graph) => {
                tracing::debug!(
                    resources = graph.len(),
                    edges = graph.edges().len(),
                    "lowered manifest"
                );
                ctx.graph = Some(graph);
                Ok(())
            }
            Err(err) => {
                let mut diagnostic = Diagnostic::error(self.name(), err.to_string());
                if let Some(location) = err.location() {
                    diagnostic = diagnostic.at(location);
                }
                ctx.add_diagnostic(diagnostic);
                bail!("Lowering failed: {}", err);
            }
        }
    }
}

/// Lower a manifest into a relationship graph.
pub fn lower_manifest(manifest: &Manifest) -> Result<Graph, GraphError> {
    let mut builder = GraphBuilder::new(&manifest.stack.name);

    for resource in &manifest.resources {
        builder.add_resource(lower_resource(resource));
        for prerequisite in &resource.depends_on {
            builder.add_dependency(resource.id(), prerequisite);
        }
    }
    for grant in &manifest.grants {
        builder.add_grant(lower_grant(grant));
    }
    for route in &manifest.routes {
        builder.add_route(lower_route(route));
    }
    for notification in &manifest.notifications {
        builder.add_notification(lower_notification(notification));
    }

    builder.build()
}

fn lower_resource(resource: &ResourceDecl) -> ResourceDescriptor {
    let mut descriptor = ResourceDescriptor::new(resource.id(), resource.kind)
        .with_removal_policy(resource.removal);
    for (key, value) in &resource.config {
        descriptor = descriptor.with_config(key, lower_value(value));
    }
    for (key, value) in &resource.environment {
        descriptor = descriptor.with_env(key, value);
    }
    descriptor
}

fn lower_value(value: &toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s.clone()),
        toml::Value::Integer(i) => ConfigValue::Integer(*i),
        toml::Value::Float(f) => ConfigValue::Float(*f),
        toml::Value::Boolean(b) => ConfigValue::Boolean(*b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => ConfigValue::List(items.iter().map(lower_value).collect()),
        toml::Value::Table(table) => ConfigValue::Map(
            table
                .iter()
                .map(|(k, v)| (k.clone(), lower_value(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}

fn lower_grant(grant: &GrantDecl) -> Grant {
    Grant {
        principal: grant.principal.clone(),
        target: grant.resource.clone(),
        intent: grant.intent(),
        global: grant.global,
    }
}

fn lower_route(route: &RouteDecl) -> Route {
    Route {
        api: route.api.clone(),
        path: route.path.clone(),
        method: route.method,
        function: route.function.clone(),
        authorizer: route.authorizer.clone(),
    }
}

fn lower_notification(notification: &NotificationDecl) -> Notification {
    Notification {
        bucket: notification.bucket.clone(),
        event: notification.event,
        function: notification.function.clone(),
        prefix: notification.prefix.clone(),
        suffix: notification.suffix.clone(),
    }
}
