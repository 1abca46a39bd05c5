//! Dependency planning, grant resolution and output binding for plinth.
//!
//! This crate turns a set of [`plinth_ir::ResourceDescriptor`]s and their
//! relationships into something an external provisioning engine can apply.
//!
//! # Module Organization
//!
//! - [`graph`] - The validated relationship graph and its builder
//! - [`plan`] - Topological ordering with parallel levels and cycle reporting
//! - [`grants`] - Expansion of grant intents into policy statements
//! - [`binder`] - Resolution of `${Id.outputKey}` references to generated values
//! - [`state`] - Per-resource lifecycle state machine
//! - [`provision`] - The provisioning engine boundary and a dry-run implementation
//! - [`apply`] - Level-by-level materialization and teardown
//! - [`pipeline`] - Manifest → graph → plan compilation phases with diagnostics
//!
//! # Example
//!
//! ```ignore
//! use plinth_engine::{apply::Deployment, graph::Graph, provision::DryRunProvisioner};
//! use plinth_ir::{ResourceDescriptor, ResourceKind};
//!
//! let graph = Graph::builder("demo")
//!     .resource(ResourceDescriptor::new("History", ResourceKind::Table))
//!     .resource(
//!         ResourceDescriptor::new("Handler", ResourceKind::Function)
//!             .with_env("TABLE_NAME", "${History.tableName}"),
//!     )
//!     .build()?;
//! let plan = graph.plan()?;
//!
//! let mut deployment = Deployment::new(&graph, &plan)?;
//! deployment.apply(&mut DryRunProvisioner::new("us-east-1", "000000000000"))?;
//! ```

pub mod apply;
pub mod binder;
pub mod error;
pub mod grants;
pub mod graph;
pub mod pipeline;
pub mod plan;
pub mod provision;
pub mod state;

pub use error::{BindError, GrantError, GraphError};
