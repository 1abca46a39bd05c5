//! Intermediate representation types for the plinth resource graph compiler.
//!
//! This crate provides the data model shared by every stage of the
//! pipeline. A declaration is a flat list of [`ResourceDescriptor`]s plus the
//! relationships between them; everything else (ordering, permission
//! expansion, output binding) is computed from these values by
//! `plinth-engine`.
//!
//! # Architecture
//!
//! ```text
//! plinth.toml (TOML) → plinth-manifest (parsing) → plinth-ir (descriptors) → plinth-engine
//! ```
//!
//! The IR types are designed to be:
//! - Provider-agnostic where possible (kinds name managed services, not SDK calls)
//! - Plain data (no behavior beyond accessors and small helpers)
//! - Cheap to clone and serialize for reporting

mod descriptor;
mod edge;
mod grant;
mod output;
mod policy;
mod reference;
mod value;
mod wiring;

pub use descriptor::{RemovalPolicy, ResourceDescriptor, ResourceKind, UnknownKind};
pub use edge::{EdgeKind, RelationshipEdge};
pub use grant::{Access, Grant, GrantIntent};
pub use output::GeneratedOutput;
pub use policy::{Effect, Policy, PolicyConflict, PolicyStatement};
pub use reference::{OutputRef, ReferenceError, Segment, interpolate, scan, segments};
pub use value::ConfigValue;
pub use wiring::{EventType, HttpMethod, Notification, Route};
