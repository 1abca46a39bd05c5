//! Level-by-level materialization and reverse-order teardown.
//!
//! A [`Deployment`] owns the mutable side of applying a graph: the state of
//! every resource, the outputs generated so far, and the bound configuration
//! handed to the provisioner. The graph and plan themselves stay immutable.
//!
//! Failures are not rolled back. When the provisioner fails the deployment
//! stops and reports which resources were materialized and which are still
//! pending, leaving everything else exactly as it was.

use indexmap::IndexMap;
use plinth_ir::RemovalPolicy;
use serde::Serialize;
use thiserror::Error;

use crate::{
    BindError,
    binder::{OutputBinder, OutputStore, ResolvedConfig},
    graph::Graph,
    plan::Plan,
    provision::{ProvisionError, Provisioner},
    state::{ResourceState, StateError, StateTable},
};

/// Why a single resource could not be materialized or destroyed.
#[derive(Debug, Error)]
pub enum ApplyFailure {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("provisioner returned output '{key}' for '{resource_id}'")]
    ForeignOutput { resource_id: String, key: String },
}

/// Apply stopped at `failed`.
#[derive(Debug, Error)]
#[error("failed to materialize '{failed}': {cause}")]
pub struct ApplyError {
    pub failed: String,
    /// Ids materialized before the failure, in plan order.
    pub materialized: Vec<String>,
    /// Ids never attempted, in plan order.
    pub pending: Vec<String>,
    #[source]
    pub cause: ApplyFailure,
}

/// Teardown stopped at `failed`.
#[derive(Debug, Error)]
#[error("failed to destroy '{failed}': {cause}")]
pub struct TeardownError {
    pub failed: String,
    pub destroyed: Vec<String>,
    pub retained: Vec<String>,
    /// Ids still materialized.
    pub remaining: Vec<String>,
    #[source]
    pub cause: ApplyFailure,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub materialized: Vec<String>,
    pub levels: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TeardownSummary {
    pub destroyed: Vec<String>,
    pub retained: Vec<String>,
}

/// Applies one planned graph through a provisioner.
#[derive(Debug)]
pub struct Deployment<'g> {
    graph: &'g Graph,
    plan: &'g Plan,
    states: StateTable,
    outputs: OutputStore,
    resolved: IndexMap<String, ResolvedConfig>,
}

impl<'g> Deployment<'g> {
    /// Track every planned resource, moving each from `Declared` to `Ordered`.
    pub fn new(graph: &'g Graph, plan: &'g Plan) -> Result<Self, StateError> {
        let mut states = StateTable::new(plan.order().iter().map(String::as_str));
        for id in plan.order() {
            states.transition(id, ResourceState::Ordered)?;
        }
        Ok(Self {
            graph,
            plan,
            states,
            outputs: OutputStore::new(),
            resolved: IndexMap::new(),
        })
    }

    pub fn state(&self, id: &str) -> Option<ResourceState> {
        self.states.get(id)
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    pub fn outputs(&self) -> &OutputStore {
        &self.outputs
    }

    /// The bound configuration a resource was materialized with.
    pub fn resolved(&self, id: &str) -> Option<&ResolvedConfig> {
        self.resolved.get(id)
    }

    /// Materialize every resource, one level at a time.
    pub fn apply(&mut self, provisioner: &mut dyn Provisioner) -> Result<ApplySummary, ApplyError> {
        tracing::info!(
            graph = self.graph.name(),
            engine = provisioner.name(),
            resources = self.plan.len(),
            "applying plan"
        );

        let plan = self.plan;
        let mut materialized = Vec::with_capacity(plan.len());
        for (depth, level) in plan.levels().iter().enumerate() {
            tracing::debug!(level = depth, resources = level.len(), "materializing level");
            for id in level {
                if let Err(cause) = self.materialize(id, provisioner) {
                    tracing::warn!(resource = %id, error = %cause, "materialization failed");
                    let pending = plan
                        .order()
                        .iter()
                        .filter(|o| *o != id && !materialized.contains(*o))
                        .cloned()
                        .collect();
                    return Err(ApplyError {
                        failed: id.clone(),
                        materialized: self.in_plan_order(&materialized),
                        pending,
                        cause,
                    });
                }
                materialized.push(id.clone());
            }
        }

        Ok(ApplySummary {
            materialized: self.in_plan_order(&materialized),
            levels: plan.levels().len(),
        })
    }

    fn materialize(
        &mut self,
        id: &str,
        provisioner: &mut dyn Provisioner,
    ) -> Result<(), ApplyFailure> {
        let graph = self.graph;
        let descriptor = graph
            .descriptor(id)
            .ok_or_else(|| StateError::Unknown { id: id.to_string() })?;

        let resolved = OutputBinder::new(&self.outputs).bind(descriptor, graph.policy(id))?;
        self.states.transition(id, ResourceState::Bound)?;

        let outputs = provisioner.materialize(descriptor, &resolved)?;
        if let Some(foreign) = outputs.iter().find(|o| o.resource_id != id) {
            return Err(ApplyFailure::ForeignOutput {
                resource_id: foreign.resource_id.clone(),
                key: foreign.key.clone(),
            });
        }

        self.outputs.extend(outputs);
        self.states.transition(id, ResourceState::Materialized)?;
        tracing::info!(resource = id, kind = %descriptor.kind(), "materialized");
        self.resolved.insert(id.to_string(), resolved);
        Ok(())
    }

    /// Remove materialized resources in reverse plan order.
    ///
    /// Resources declared with [`RemovalPolicy::Retain`] are left in place
    /// and never reach the provisioner.
    pub fn teardown(
        &mut self,
        provisioner: &mut dyn Provisioner,
    ) -> Result<TeardownSummary, TeardownError> {
        let plan = self.plan;
        let mut summary = TeardownSummary::default();

        for id in plan.order().iter().rev() {
            if self.states.get(id) != Some(ResourceState::Materialized) {
                continue;
            }
            if let Err(cause) = self.release(id, provisioner, &mut summary) {
                tracing::warn!(resource = %id, error = %cause, "teardown failed");
                return Err(TeardownError {
                    failed: id.clone(),
                    destroyed: summary.destroyed,
                    retained: summary.retained,
                    remaining: self
                        .states
                        .in_state(ResourceState::Materialized)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    cause,
                });
            }
        }

        Ok(summary)
    }

    fn release(
        &mut self,
        id: &str,
        provisioner: &mut dyn Provisioner,
        summary: &mut TeardownSummary,
    ) -> Result<(), ApplyFailure> {
        let descriptor = self
            .graph
            .descriptor(id)
            .ok_or_else(|| StateError::Unknown { id: id.to_string() })?;

        match descriptor.removal_policy() {
            RemovalPolicy::Retain => {
                self.states.transition(id, ResourceState::Retained)?;
                tracing::info!(resource = id, "retained");
                summary.retained.push(id.to_string());
            }
            RemovalPolicy::Destroy => {
                provisioner.destroy(descriptor)?;
                self.states.transition(id, ResourceState::Destroyed)?;
                self.outputs.remove(id);
                tracing::info!(resource = id, kind = %descriptor.kind(), "destroyed");
                summary.destroyed.push(id.to_string());
            }
        }
        Ok(())
    }

    fn in_plan_order(&self, ids: &[String]) -> Vec<String> {
        self.plan
            .order()
            .iter()
            .filter(|id| ids.contains(*id))
            .cloned()
            .collect()
    }
}
