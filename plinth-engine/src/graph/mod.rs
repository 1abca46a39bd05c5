//! The relationship graph.
//!
//! A [`Graph`] is the validated, immutable result of a declaration: every
//! descriptor (including the ones synthesized for routes and notifications),
//! every edge (explicit, implicit from references, and grants) and every
//! principal's resolved policy. It is passed explicitly to every later
//! operation.

mod builder;

pub use builder::GraphBuilder;

use indexmap::IndexMap;
use plinth_ir::{Grant, Notification, Policy, RelationshipEdge, ResourceDescriptor, Route};
use serde::Serialize;

use crate::{
    GraphError,
    plan::{Plan, PlanBuilder},
};

/// A validated set of descriptors and the relationships between them.
#[derive(Debug, Clone, Serialize)]
pub struct Graph {
    name: String,
    descriptors: IndexMap<String, ResourceDescriptor>,
    edges: Vec<RelationshipEdge>,
    policies: IndexMap<String, Policy>,
    grants: Vec<Grant>,
    routes: Vec<Route>,
    notifications: Vec<Notification>,
}

impl Graph {
    /// Start declaring a graph.
    pub fn builder(name: impl Into<String>) -> GraphBuilder {
        GraphBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.values()
    }

    pub fn descriptor(&self, id: &str) -> Option<&ResourceDescriptor> {
        self.descriptors.get(id)
    }

    /// Declaration index of a descriptor.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.descriptors.get_index_of(id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// All edges, deduplicated, in the order they were derived.
    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    /// Only the `DependsOn` edges.
    pub fn dependencies(&self) -> impl Iterator<Item = &RelationshipEdge> {
        self.edges.iter().filter(|e| e.is_dependency())
    }

    /// Ids that must be materialized before `id`.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        self.dependencies()
            .filter(|e| e.to == id)
            .map(|e| e.from.as_str())
            .collect()
    }

    /// Ids that cannot be materialized until `id` is.
    pub fn dependents_of(&self, id: &str) -> Vec<&str> {
        self.dependencies()
            .filter(|e| e.from == id)
            .map(|e| e.to.as_str())
            .collect()
    }

    /// The resolved policy of a principal, if it holds any statements.
    pub fn policy(&self, principal: &str) -> Option<&Policy> {
        self.policies.get(principal)
    }

    pub fn policies(&self) -> impl Iterator<Item = (&str, &Policy)> {
        self.policies.iter().map(|(id, p)| (id.as_str(), p))
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Order the graph for materialization.
    pub fn plan(&self) -> Result<Plan, GraphError> {
        PlanBuilder::new(self).build()
    }
}
