use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use plinth_ir::{
    ConfigValue, Grant, Notification, OutputRef, Policy, RelationshipEdge, ResourceDescriptor,
    ResourceKind, Route,
};

use super::Graph;
use crate::{
    GraphError,
    grants::{GrantResolver, INVOKE_FUNCTION},
};

/// Collects declarations and validates them into a [`Graph`].
///
/// Nothing is checked until [`GraphBuilder::build`], so declarations can be
/// made in any order; only the order of descriptors matters, as it breaks
/// ties when planning.
///
/// # Example
///
/// ```ignore
/// let graph = Graph::builder("site")
///     .resource(ResourceDescriptor::new("Assets", ResourceKind::Bucket))
///     .resource(
///         ResourceDescriptor::new("Cdn", ResourceKind::Distribution)
///             .with_config("origin", "${Assets.bucketDomainName}"),
///     )
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    name: String,
    descriptors: Vec<ResourceDescriptor>,
    /// (dependent, prerequisite) pairs declared explicitly.
    dependencies: Vec<(String, String)>,
    grants: Vec<Grant>,
    routes: Vec<Route>,
    notifications: Vec<Notification>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Declare a resource.
    pub fn resource(mut self, descriptor: ResourceDescriptor) -> Self {
        self.add_resource(descriptor);
        self
    }

    pub fn add_resource(&mut self, descriptor: ResourceDescriptor) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Declare that `dependent` cannot be materialized before `prerequisite`.
    pub fn depends_on(mut self, dependent: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        self.add_dependency(dependent, prerequisite);
        self
    }

    pub fn add_dependency(
        &mut self,
        dependent: impl Into<String>,
        prerequisite: impl Into<String>,
    ) -> &mut Self {
        self.dependencies.push((dependent.into(), prerequisite.into()));
        self
    }

    /// Declare a grant of permissions to a principal.
    pub fn grant(mut self, grant: Grant) -> Self {
        self.add_grant(grant);
        self
    }

    pub fn add_grant(&mut self, grant: Grant) -> &mut Self {
        self.grants.push(grant);
        self
    }

    /// Bind a gateway route to a function.
    pub fn route(mut self, route: Route) -> Self {
        self.add_route(route);
        self
    }

    pub fn add_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Bind a bucket event to a function.
    pub fn notification(mut self, notification: Notification) -> Self {
        self.add_notification(notification);
        self
    }

    pub fn add_notification(&mut self, notification: Notification) -> &mut Self {
        self.notifications.push(notification);
        self
    }

    /// Validate every declaration and derive the full edge set.
    pub fn build(self) -> Result<Graph, GraphError> {
        let mut descriptors: IndexMap<String, ResourceDescriptor> = IndexMap::new();
        for descriptor in self.descriptors {
            insert(&mut descriptors, descriptor)?;
        }

        let mut edges: IndexSet<RelationshipEdge> = IndexSet::new();

        let mut seen_routes = HashSet::new();
        for route in &self.routes {
            let path = route.normalized_path();
            if !seen_routes.insert((route.api.as_str(), path.clone(), route.method)) {
                return Err(GraphError::DuplicateRoute {
                    api: route.api.clone(),
                    method: route.method,
                    path,
                });
            }
            let method = lower_route(&descriptors, route)?;
            insert(&mut descriptors, method)?;
            edges.insert(RelationshipEdge::grants(
                &route.api,
                &route.function,
                [INVOKE_FUNCTION],
            ));
        }

        let mut seen_notifications = HashSet::new();
        for notification in &self.notifications {
            if !seen_notifications.insert(notification) {
                return Err(GraphError::DuplicateNotification {
                    bucket: notification.bucket.clone(),
                    event: notification.event,
                    function: notification.function.clone(),
                });
            }
            let wiring = lower_notification(&descriptors, notification)?;
            insert(&mut descriptors, wiring)?;
            edges.insert(RelationshipEdge::grants(
                &notification.bucket,
                &notification.function,
                [INVOKE_FUNCTION],
            ));
        }

        for (dependent, prerequisite) in &self.dependencies {
            for id in [dependent, prerequisite] {
                if !descriptors.contains_key(id) {
                    return Err(GraphError::UnknownResource {
                        referrer: dependent.clone(),
                        id: id.clone(),
                    });
                }
            }
            edges.insert(RelationshipEdge::depends_on(dependent, prerequisite));
        }

        let mut policies: IndexMap<String, Policy> = IndexMap::new();
        let mut grant_edges = Vec::new();
        {
            let resolver = GrantResolver::new(|id| descriptors.get(id));
            for grant in &self.grants {
                let statements = resolver.statements(grant)?;
                let policy = policies.entry(grant.principal.clone()).or_default();
                let mut actions = Vec::new();
                for statement in statements {
                    actions.extend(statement.actions.iter().cloned());
                    policy.add(statement);
                }
                if let Some(target) = &grant.target {
                    grant_edges.push(RelationshipEdge::grants(&grant.principal, target, actions));
                }
            }
        }

        for descriptor in descriptors.values() {
            let mut refs = Vec::new();
            for value in descriptor.config().values() {
                refs.extend(value.references().map_err(|source| {
                    GraphError::MalformedReference {
                        referrer: descriptor.id().to_string(),
                        source,
                    }
                })?);
            }
            if let Some(policy) = policies.get(descriptor.id()) {
                for pattern in policy.resources() {
                    refs.extend(plinth_ir::scan(pattern).map_err(|source| {
                        GraphError::MalformedReference {
                            referrer: descriptor.id().to_string(),
                            source,
                        }
                    })?);
                }
            }

            if descriptor.kind() == ResourceKind::Authorizer
                && !refs.iter().any(|r| {
                    descriptors
                        .get(&r.resource)
                        .is_some_and(|d| d.kind() == ResourceKind::UserPool)
                })
            {
                return Err(GraphError::UnboundAuthorizer {
                    id: descriptor.id().to_string(),
                });
            }

            for reference in refs {
                check_reference(&descriptors, descriptor.id(), &reference)?;
                edges.insert(RelationshipEdge::depends_on(descriptor.id(), &reference.resource));
            }
        }

        edges.extend(grant_edges);

        Ok(Graph {
            name: self.name,
            descriptors,
            edges: edges.into_iter().collect(),
            policies,
            grants: self.grants,
            routes: self.routes,
            notifications: self.notifications,
        })
    }
}

fn insert(
    descriptors: &mut IndexMap<String, ResourceDescriptor>,
    descriptor: ResourceDescriptor,
) -> Result<(), GraphError> {
    if descriptors.contains_key(descriptor.id()) {
        return Err(GraphError::DuplicateId {
            id: descriptor.id().to_string(),
        });
    }
    descriptors.insert(descriptor.id().to_string(), descriptor);
    Ok(())
}

/// Check that `id` exists and is of the expected kind.
fn expect_kind(
    descriptors: &IndexMap<String, ResourceDescriptor>,
    referrer: &str,
    id: &str,
    expected: ResourceKind,
) -> Result<(), GraphError> {
    let descriptor = descriptors
        .get(id)
        .ok_or_else(|| GraphError::UnknownResource {
            referrer: referrer.to_string(),
            id: id.to_string(),
        })?;
    if descriptor.kind() != expected {
        return Err(GraphError::WrongKind {
            referrer: referrer.to_string(),
            id: id.to_string(),
            expected,
            found: descriptor.kind(),
        });
    }
    Ok(())
}

fn check_reference(
    descriptors: &IndexMap<String, ResourceDescriptor>,
    referrer: &str,
    reference: &OutputRef,
) -> Result<(), GraphError> {
    match descriptors.get(&reference.resource) {
        Some(target) if target.kind().produces(&reference.key) => Ok(()),
        found => Err(GraphError::UnresolvedOutput {
            referrer: referrer.to_string(),
            reference: reference.clone(),
            known_kind: found.map(ResourceDescriptor::kind),
        }),
    }
}

/// Synthesize the `Method` descriptor for a route.
fn lower_route(
    descriptors: &IndexMap<String, ResourceDescriptor>,
    route: &Route,
) -> Result<ResourceDescriptor, GraphError> {
    let id = route.descriptor_id();
    expect_kind(descriptors, &id, &route.api, ResourceKind::Api)?;
    expect_kind(descriptors, &id, &route.function, ResourceKind::Function)?;

    let mut method = ResourceDescriptor::new(&id, ResourceKind::Method)
        .with_config("restApiId", OutputRef::new(&route.api, "restApiId").token())
        .with_config("path", route.normalized_path())
        .with_config("httpMethod", route.method.as_str())
        .with_config(
            "integrationUri",
            OutputRef::new(&route.function, "functionArn").token(),
        );

    method = match &route.authorizer {
        Some(authorizer) => {
            expect_kind(descriptors, &id, authorizer, ResourceKind::Authorizer)?;
            method
                .with_config("authorizationType", "COGNITO_USER_POOLS")
                .with_config(
                    "authorizerId",
                    OutputRef::new(authorizer, "authorizerId").token(),
                )
        }
        None => method.with_config("authorizationType", "NONE"),
    };
    Ok(method)
}

/// Synthesize the `BucketNotification` descriptor for a notification.
fn lower_notification(
    descriptors: &IndexMap<String, ResourceDescriptor>,
    notification: &Notification,
) -> Result<ResourceDescriptor, GraphError> {
    let id = notification.descriptor_id();
    expect_kind(descriptors, &id, &notification.bucket, ResourceKind::Bucket)?;
    expect_kind(descriptors, &id, &notification.function, ResourceKind::Function)?;

    let mut wiring = ResourceDescriptor::new(&id, ResourceKind::BucketNotification)
        .with_config(
            "bucket",
            OutputRef::new(&notification.bucket, "bucketName").token(),
        )
        .with_config(
            "events",
            ConfigValue::List(vec![notification.event.event_name().into()]),
        )
        .with_config(
            "destination",
            OutputRef::new(&notification.function, "functionArn").token(),
        );
    if let Some(prefix) = &notification.prefix {
        wiring = wiring.with_config("prefix", prefix.as_str());
    }
    if let Some(suffix) = &notification.suffix {
        wiring = wiring.with_config("suffix", suffix.as_str());
    }
    Ok(wiring)
}

#[cfg(test)]
mod tests {
    use plinth_ir::{Access, EdgeKind, EventType, HttpMethod};

    use super::*;

    fn api_stack() -> GraphBuilder {
        Graph::builder("api")
            .resource(ResourceDescriptor::new("Pool", ResourceKind::UserPool))
            .resource(
                ResourceDescriptor::new("Auth", ResourceKind::Authorizer)
                    .with_config("providerArns", ConfigValue::List(vec!["${Pool.userPoolArn}".into()])),
            )
            .resource(ResourceDescriptor::new("Gateway", ResourceKind::Api))
            .resource(ResourceDescriptor::new("Handler", ResourceKind::Function))
    }

    fn post_users(authorizer: Option<&str>) -> Route {
        Route {
            api: "Gateway".into(),
            path: "/users".into(),
            method: HttpMethod::Post,
            function: "Handler".into(),
            authorizer: authorizer.map(String::from),
        }
    }

    #[test]
    fn test_duplicate_id() {
        let err = Graph::builder("dup")
            .resource(ResourceDescriptor::new("Assets", ResourceKind::Bucket))
            .resource(ResourceDescriptor::new("Assets", ResourceKind::Table))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId { id } if id == "Assets"));
    }

    #[test]
    fn test_reference_creates_dependency() {
        let graph = Graph::builder("site")
            .resource(
                ResourceDescriptor::new("Cdn", ResourceKind::Distribution)
                    .with_config("origin", "${Assets.bucketDomainName}"),
            )
            .resource(ResourceDescriptor::new("Assets", ResourceKind::Bucket))
            .build()
            .unwrap();
        assert_eq!(graph.dependencies_of("Cdn"), vec!["Assets"]);
    }

    #[test]
    fn test_reference_to_unknown_resource() {
        let err = Graph::builder("site")
            .resource(
                ResourceDescriptor::new("Cdn", ResourceKind::Distribution)
                    .with_config("origin", "${Missing.bucketDomainName}"),
            )
            .build()
            .unwrap_err();
        match err {
            GraphError::UnresolvedOutput {
                referrer,
                reference,
                known_kind,
            } => {
                assert_eq!(referrer, "Cdn");
                assert_eq!(reference, OutputRef::new("Missing", "bucketDomainName"));
                assert!(known_kind.is_none());
            }
            other => panic!("expected UnresolvedOutput, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_to_unknown_key() {
        let err = Graph::builder("site")
            .resource(ResourceDescriptor::new("Assets", ResourceKind::Bucket))
            .resource(
                ResourceDescriptor::new("Cdn", ResourceKind::Distribution)
                    .with_config("origin", "${Assets.tableName}"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::UnresolvedOutput {
                known_kind: Some(ResourceKind::Bucket),
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_reference() {
        let err = Graph::builder("site")
            .resource(
                ResourceDescriptor::new("Handler", ResourceKind::Function)
                    .with_env("TABLE", "${History"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::MalformedReference { .. }));
    }

    #[test]
    fn test_explicit_dependency_on_unknown_resource() {
        let err = Graph::builder("x")
            .resource(ResourceDescriptor::new("Handler", ResourceKind::Function))
            .depends_on("Handler", "Ghost")
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::UnknownResource { id, .. } if id == "Ghost"));
    }

    #[test]
    fn test_grant_adds_policy_and_edges() {
        let graph = Graph::builder("x")
            .resource(ResourceDescriptor::new("History", ResourceKind::Table))
            .resource(ResourceDescriptor::new("Handler", ResourceKind::Function))
            .grant(Grant::access("Handler", "History", Access::ReadWrite))
            .grant(Grant::access("Handler", "History", Access::ReadWrite))
            .build()
            .unwrap();

        assert_eq!(graph.policy("Handler").map(Policy::len), Some(1));
        assert_eq!(graph.dependencies_of("Handler"), vec!["History"]);

        let grant_edges: Vec<_> = graph
            .edges()
            .iter()
            .filter(|e| matches!(e.kind, EdgeKind::Grants { .. }))
            .collect();
        assert_eq!(grant_edges.len(), 1);
        assert_eq!(grant_edges[0].from, "Handler");
        assert_eq!(grant_edges[0].to, "History");
    }

    #[test]
    fn test_route_synthesizes_method() {
        let graph = api_stack().route(post_users(Some("Auth"))).build().unwrap();

        let method = graph.descriptor("Gateway-POST-users").unwrap();
        assert_eq!(method.kind(), ResourceKind::Method);
        assert_eq!(method.get_str("authorizerId"), Some("${Auth.authorizerId}"));
        assert_eq!(
            method.get_str("authorizationType"),
            Some("COGNITO_USER_POOLS")
        );

        let mut deps = graph.dependencies_of("Gateway-POST-users");
        deps.sort();
        assert_eq!(deps, vec!["Auth", "Gateway", "Handler"]);
        assert_eq!(graph.dependencies_of("Auth"), vec!["Pool"]);

        let invoke = graph
            .edges()
            .iter()
            .find(|e| e.from == "Gateway" && e.to == "Handler")
            .unwrap();
        assert!(invoke.permissions().unwrap().contains(INVOKE_FUNCTION));
    }

    #[test]
    fn test_route_without_authorizer() {
        let graph = api_stack().route(post_users(None)).build().unwrap();
        let method = graph.descriptor("Gateway-POST-users").unwrap();
        assert_eq!(method.get_str("authorizationType"), Some("NONE"));
        assert!(method.get("authorizerId").is_none());
    }

    #[test]
    fn test_duplicate_route() {
        let err = api_stack()
            .route(post_users(None))
            .route(post_users(Some("Auth")))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateRoute { .. }));
    }

    fn get(path: &str) -> Route {
        Route {
            method: HttpMethod::Get,
            path: path.into(),
            ..post_users(None)
        }
    }

    #[test]
    fn test_parameter_and_literal_paths_coexist() {
        let graph = api_stack()
            .route(get("/items/{id}"))
            .route(get("/items/id"))
            .route(get("/"))
            .route(get("/root"))
            .build()
            .unwrap();

        assert!(graph.descriptor("Gateway-GET-items-__id").is_some());
        assert!(graph.descriptor("Gateway-GET-items-id").is_some());
        assert!(graph.descriptor("Gateway-GET").is_some());
        assert!(graph.descriptor("Gateway-GET-root").is_some());
        assert_eq!(
            graph.descriptor("Gateway-GET-items-__id").and_then(|d| d.get_str("path")),
            Some("/items/{id}")
        );
    }

    #[test]
    fn test_trailing_slash_is_the_same_route() {
        let err = api_stack()
            .route(get("/users"))
            .route(get("/users/"))
            .build()
            .unwrap_err();
        match err {
            GraphError::DuplicateRoute { path, method, .. } => {
                assert_eq!(path, "/users");
                assert_eq!(method, HttpMethod::Get);
            }
            other => panic!("expected DuplicateRoute, got {:?}", other),
        }
    }

    #[test]
    fn test_authorizer_must_reference_a_user_pool() {
        let err = Graph::builder("api")
            .resource(ResourceDescriptor::new("Auth", ResourceKind::Authorizer))
            .resource(ResourceDescriptor::new("Gateway", ResourceKind::Api))
            .resource(ResourceDescriptor::new("Handler", ResourceKind::Function))
            .route(post_users(Some("Auth")))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::UnboundAuthorizer { ref id } if id == "Auth"));

        let err = Graph::builder("api")
            .resource(ResourceDescriptor::new("Gateway", ResourceKind::Api))
            .resource(
                ResourceDescriptor::new("Auth", ResourceKind::Authorizer)
                    .with_config("restApiId", "${Gateway.restApiId}"),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::UnboundAuthorizer { .. }));
    }

    #[test]
    fn test_route_to_wrong_kind() {
        let mut route = post_users(None);
        route.function = "Pool".into();
        let err = api_stack().route(route).build().unwrap_err();
        assert!(matches!(
            err,
            GraphError::WrongKind {
                expected: ResourceKind::Function,
                found: ResourceKind::UserPool,
                ..
            }
        ));
    }

    #[test]
    fn test_notification_avoids_cycle() {
        let graph = Graph::builder("uploads")
            .resource(ResourceDescriptor::new("Uploads", ResourceKind::Bucket))
            .resource(
                ResourceDescriptor::new("Processor", ResourceKind::Function)
                    .with_env("BUCKET", "${Uploads.bucketName}"),
            )
            .grant(Grant::access("Processor", "Uploads", Access::Read))
            .notification(Notification {
                bucket: "Uploads".into(),
                event: EventType::ObjectCreated,
                function: "Processor".into(),
                prefix: Some("incoming/".into()),
                suffix: None,
            })
            .build()
            .unwrap();

        let id = "Uploads-object-created-Processor";
        let wiring = graph.descriptor(id).unwrap();
        assert_eq!(wiring.get_str("prefix"), Some("incoming/"));
        let mut deps = graph.dependencies_of(id);
        deps.sort();
        assert_eq!(deps, vec!["Processor", "Uploads"]);
        assert!(graph.plan().is_ok());
    }

    fn uploads(prefix: Option<&str>) -> Notification {
        Notification {
            bucket: "Uploads".into(),
            event: EventType::ObjectCreated,
            function: "Processor".into(),
            prefix: prefix.map(String::from),
            suffix: None,
        }
    }

    fn uploads_stack() -> GraphBuilder {
        Graph::builder("uploads")
            .resource(ResourceDescriptor::new("Uploads", ResourceKind::Bucket))
            .resource(ResourceDescriptor::new("Processor", ResourceKind::Function))
    }

    #[test]
    fn test_notifications_differing_by_filter() {
        let graph = uploads_stack()
            .notification(uploads(Some("images/")))
            .notification(uploads(Some("docs/")))
            .build()
            .unwrap();

        let images = graph
            .descriptor("Uploads-object-created-Processor-prefix-images_2f")
            .unwrap();
        assert_eq!(images.get_str("prefix"), Some("images/"));
        assert!(
            graph
                .descriptor("Uploads-object-created-Processor-prefix-docs_2f")
                .is_some()
        );
    }

    #[test]
    fn test_duplicate_notification() {
        let err = uploads_stack()
            .notification(uploads(Some("images/")))
            .notification(uploads(Some("images/")))
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::DuplicateNotification { ref bucket, .. } if bucket == "Uploads"
        ));
    }

    #[test]
    fn test_synthesized_id_collision() {
        let err = api_stack()
            .resource(ResourceDescriptor::new("Gateway-POST-users", ResourceKind::Table))
            .route(post_users(None))
            .build()
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId { .. }));
    }
}
