//! Manifest types and parsing for plinth.toml files.

mod file;
mod parse;
mod stack;
mod validate;

pub use file::StackToml;
pub use parse::parse_manifest;
use serde::Deserialize;
pub use stack::StackConfig;
pub use validate::ParseContext;

use crate::{GrantDecl, NotificationDecl, ResourceDecl, RouteDecl};

/// Root manifest for plinth.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Stack metadata
    pub stack: StackConfig,

    /// Resources, in declaration order
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceDecl>,

    /// Permission grants
    #[serde(default, rename = "grant")]
    pub grants: Vec<GrantDecl>,

    /// Gateway routes
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteDecl>,

    /// Bucket event notifications
    #[serde(default, rename = "notification")]
    pub notifications: Vec<NotificationDecl>,
}

impl Manifest {
    /// Find a resource by id.
    pub fn resource(&self, id: &str) -> Option<&ResourceDecl> {
        self.resources.iter().find(|r| r.id() == id)
    }

    /// Check if a resource with the given id is declared.
    pub fn has_resource(&self, id: &str) -> bool {
        self.resource(id).is_some()
    }
}
