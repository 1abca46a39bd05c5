//! End-to-end tests over a complete stack: site hosting, a user pool, a table,
//! an upload bucket, two functions and an authorized gateway.

use std::str::FromStr;

use plinth_engine::{
    apply::{ApplyFailure, ApplySummary, Deployment},
    binder::ResolvedConfig,
    graph::Graph,
    pipeline::{Pipeline, phases::lower_manifest},
    plan::Plan,
    provision::{DryRunProvisioner, ProvisionError, Provisioner},
    state::ResourceState,
};
use plinth_ir::{GeneratedOutput, ResourceDescriptor, ResourceKind};
use plinth_manifest::Manifest;

const STACK: &str = include_str!("fixtures/stack.toml");

fn stack() -> (Graph, Plan) {
    let manifest = Manifest::from_str(STACK).expect("Failed to parse stack manifest");
    let graph = lower_manifest(&manifest).expect("Failed to lower stack manifest");
    let plan = graph.plan().expect("Failed to plan stack");
    (graph, plan)
}

fn dry_run() -> DryRunProvisioner {
    DryRunProvisioner::new("us-east-1", "123456789012")
}

/// Compile a manifest and apply it, the way the `apply` command does.
fn deploy(content: &str, provisioner: &mut dyn Provisioner) -> eyre::Result<ApplySummary> {
    let manifest = Manifest::from_str(content).expect("Failed to parse manifest");
    let mut ctx = Pipeline::new().run(manifest)?;
    let (graph, plan) = ctx.take_output()?;
    let mut deployment = Deployment::new(&graph, &plan)?;
    Ok(deployment.apply(provisioner)?)
}

/// Fails on one resource and delegates everything else.
struct FailOn {
    id: &'static str,
    inner: DryRunProvisioner,
}

impl Provisioner for FailOn {
    fn name(&self) -> &'static str {
        "fail-on"
    }

    fn materialize(
        &mut self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedConfig,
    ) -> Result<Vec<GeneratedOutput>, ProvisionError> {
        if descriptor.id() == self.id {
            return Err(ProvisionError::new("quota exceeded"));
        }
        self.inner.materialize(descriptor, resolved)
    }

    fn destroy(&mut self, descriptor: &ResourceDescriptor) -> Result<(), ProvisionError> {
        self.inner.destroy(descriptor)
    }
}

#[test]
fn test_plan_order() {
    let (_, plan) = stack();
    insta::assert_snapshot!(plan.order().join("\n"), @r"
    FrontendBucket
    Distribution
    DeployWebsite
    UserPool
    AdminsGroup
    UsersGroup
    UserPoolClient
    UserPoolDomain
    ManagedLoginBranding
    HistoryTable
    UploadBucket
    ApiHandler
    FileProcessor
    ApiAccessLog
    ApiGateway
    CognitoAuthorizer
    ApiGateway-POST-users
    ApiGateway-POST-upload
    ApiGateway-GET-history
    UploadBucket-object-created-FileProcessor
    ");
}

#[test]
fn test_plan_levels() {
    let (_, plan) = stack();
    assert_eq!(plan.levels().len(), 4);
    assert_eq!(
        plan.levels()[0],
        ["FrontendBucket", "UserPool", "HistoryTable", "UploadBucket", "ApiAccessLog"]
    );
    assert_eq!(plan.level_of("ApiHandler"), Some(1));
    assert_eq!(plan.level_of("UserPoolClient"), Some(2));
    assert_eq!(plan.level_of("CognitoAuthorizer"), Some(2));
    assert_eq!(plan.level_of("ManagedLoginBranding"), Some(3));
    assert_eq!(plan.level_of("ApiGateway-GET-history"), Some(3));
}

#[test]
fn test_every_dependency_is_planned_first() {
    let (graph, plan) = stack();
    assert_eq!(plan.len(), graph.len());
    for edge in graph.dependencies() {
        assert!(
            plan.precedes(&edge.from, &edge.to),
            "{} should precede {}",
            edge.from,
            edge.to
        );
        assert!(plan.level_of(&edge.from) < plan.level_of(&edge.to));
    }
}

#[test]
fn test_branding_follows_pool_and_client() {
    let (graph, plan) = stack();
    assert!(plan.precedes("UserPool", "UserPoolClient"));
    assert!(plan.precedes("UserPoolClient", "ManagedLoginBranding"));

    let mut deps = graph.dependencies_of("ManagedLoginBranding");
    deps.sort();
    assert_eq!(deps, ["UserPool", "UserPoolClient"]);
}

#[test]
fn test_authorized_route_ordering() {
    let (graph, plan) = stack();
    let method = "ApiGateway-POST-users";

    assert!(plan.precedes("UserPool", "CognitoAuthorizer"));
    assert!(plan.precedes("CognitoAuthorizer", method));
    assert!(plan.precedes("ApiGateway", method));
    assert!(plan.precedes("ApiHandler", method));

    let descriptor = graph.descriptor(method).unwrap();
    assert_eq!(descriptor.kind(), ResourceKind::Method);
    assert_eq!(
        descriptor.get_str("authorizationType"),
        Some("COGNITO_USER_POOLS")
    );
}

#[test]
fn test_grants_become_implicit_dependencies() {
    let (graph, _) = stack();

    let mut handler_deps = graph.dependencies_of("ApiHandler");
    handler_deps.sort();
    assert_eq!(handler_deps, ["HistoryTable", "UploadBucket", "UserPool"]);

    assert_eq!(graph.policy("ApiHandler").map(|p| p.len()), Some(4));
    assert_eq!(graph.policy("FileProcessor").map(|p| p.len()), Some(3));
}

#[test]
fn test_apply_binds_environment() {
    let (graph, plan) = stack();
    let mut provisioner = dry_run();
    let mut deployment = Deployment::new(&graph, &plan).unwrap();

    let summary = deployment.apply(&mut provisioner).unwrap();
    assert_eq!(summary.materialized, plan.order());
    assert_eq!(provisioner.materialized(), plan.order());

    let env = deployment.resolved("ApiHandler").unwrap().environment();
    assert_eq!(env["TABLE_NAME"], "11table");
    assert_eq!(env["UPLOAD_BUCKET_NAME"], "11plmkoibqazq-upload");
    assert_eq!(env["USER_POOL_ID"], "us-east-1_USERPOOLX");

    let policy = deployment
        .resolved("ApiHandler")
        .and_then(|r| r.policy.as_ref())
        .unwrap();
    assert!(
        policy
            .resources()
            .any(|r| r == "arn:aws:dynamodb:us-east-1:123456789012:table/11table/index/*")
    );
    assert!(policy.resources().all(|r| !r.contains("${")));

    for id in plan.order() {
        assert_eq!(deployment.state(id), Some(ResourceState::Materialized));
    }
}

#[test]
fn test_teardown_retains_table() {
    let (graph, plan) = stack();
    let mut provisioner = dry_run();
    let mut deployment = Deployment::new(&graph, &plan).unwrap();
    deployment.apply(&mut provisioner).unwrap();

    let summary = deployment.teardown(&mut provisioner).unwrap();
    assert_eq!(summary.retained, ["HistoryTable"]);
    assert_eq!(summary.destroyed.len(), plan.len() - 1);
    assert!(!provisioner.destroyed().contains(&"HistoryTable".to_string()));

    // Dependents go before their prerequisites.
    assert_eq!(
        provisioner.destroyed().first().map(String::as_str),
        Some("UploadBucket-object-created-FileProcessor")
    );
    assert_eq!(
        provisioner.destroyed().last().map(String::as_str),
        Some("FrontendBucket")
    );

    assert_eq!(deployment.state("HistoryTable"), Some(ResourceState::Retained));
    assert_eq!(deployment.state("ApiHandler"), Some(ResourceState::Destroyed));
    assert!(deployment.outputs().outputs_of("HistoryTable").is_some());
    assert!(deployment.outputs().outputs_of("ApiHandler").is_none());
}

#[test]
fn test_failure_reports_partial_state() {
    let (graph, plan) = stack();
    let mut provisioner = FailOn {
        id: "ApiHandler",
        inner: dry_run(),
    };
    let mut deployment = Deployment::new(&graph, &plan).unwrap();

    let err = deployment.apply(&mut provisioner).unwrap_err();
    assert_eq!(err.failed, "ApiHandler");
    assert!(matches!(err.cause, ApplyFailure::Provision(_)));
    // Level 0 and the level 1 resources ahead of the failure.
    assert_eq!(
        err.materialized,
        [
            "FrontendBucket",
            "Distribution",
            "UserPool",
            "AdminsGroup",
            "UsersGroup",
            "UserPoolDomain",
            "HistoryTable",
            "UploadBucket",
            "ApiAccessLog",
        ]
    );
    assert!(err.pending.contains(&"DeployWebsite".to_string()));
    assert!(err.pending.contains(&"ManagedLoginBranding".to_string()));
    assert!(err.pending.contains(&"FileProcessor".to_string()));
    assert!(err.pending.contains(&"ApiGateway-GET-history".to_string()));
    assert!(!err.pending.contains(&"ApiHandler".to_string()));
    assert_eq!(err.materialized.len() + err.pending.len() + 1, plan.len());

    // Nothing is rolled back.
    assert!(provisioner.inner.destroyed().is_empty());
    assert_eq!(deployment.state("UserPool"), Some(ResourceState::Materialized));
    assert_eq!(deployment.state("ApiHandler"), Some(ResourceState::Bound));
    assert_eq!(deployment.state("DeployWebsite"), Some(ResourceState::Ordered));
}

#[test]
fn test_duplicate_id_reaches_no_provisioner() {
    let mut provisioner = dry_run();
    deploy(STACK, &mut provisioner).unwrap();
    assert_eq!(provisioner.calls(), 20);

    // Declared ids are unique, but one matches the id synthesized for a route.
    let content = format!("{STACK}\n[[resource]]\nid = \"ApiGateway-GET-history\"\nkind = \"table\"\n");
    let mut provisioner = dry_run();
    let err = deploy(&content, &mut provisioner).unwrap_err();

    assert!(format!("{err:#}").contains("duplicate resource id 'ApiGateway-GET-history'"));
    assert_eq!(provisioner.calls(), 0);
}

#[test]
fn test_pipeline_compiles_stack() {
    let manifest = Manifest::from_str(STACK).unwrap();
    let mut ctx = Pipeline::new().run(manifest).unwrap();

    assert!(!ctx.has_errors());
    assert!(
        ctx.diagnostics
            .iter()
            .any(|d| d.message.contains("AdminAddUserToGroup"))
    );
    let (graph, plan) = ctx.take_output().unwrap();
    assert_eq!(graph.name(), "test111");
    assert_eq!(plan.len(), 20);
}
