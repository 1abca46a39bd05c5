//! Generated outputs.

use serde::Serialize;

/// A value produced by materializing a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedOutput {
    pub resource_id: String,
    pub key: String,
    pub value: String,
}

impl GeneratedOutput {
    pub fn new(
        resource_id: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: resource_id.into(),
            key: key.into(),
            value: value.into(),
        }
    }
}
