//! The provisioning engine boundary.
//!
//! plinth never talks to a cloud provider itself. Everything that creates or
//! removes a real resource goes through a [`Provisioner`]; this module also
//! ships a [`DryRunProvisioner`] that synthesizes outputs for previews.

mod dry_run;

pub use dry_run::DryRunProvisioner;

use plinth_ir::{GeneratedOutput, ResourceDescriptor};
use thiserror::Error;

use crate::binder::ResolvedConfig;

/// Trait for provisioning engines.
///
/// Implement this trait to apply plans against a real provider. Calls arrive
/// in plan order; every call for one level is made before any call for the
/// next, so an implementation may batch or parallelize within a level.
pub trait Provisioner {
    /// Engine name for identification in logs.
    fn name(&self) -> &'static str;

    /// Create the resource and return the outputs its kind exposes.
    ///
    /// `resolved` carries the descriptor's configuration with every
    /// reference already replaced by a literal.
    fn materialize(
        &mut self,
        descriptor: &ResourceDescriptor,
        resolved: &ResolvedConfig,
    ) -> Result<Vec<GeneratedOutput>, ProvisionError>;

    /// Remove a previously materialized resource.
    fn destroy(&mut self, descriptor: &ResourceDescriptor) -> Result<(), ProvisionError>;
}

/// A failure reported by a provisioning engine.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ProvisionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ProvisionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_provision_error_source() {
        let io = std::io::Error::other("connection reset");
        let err = ProvisionError::new("create table failed").with_source(io);
        assert_eq!(err.to_string(), "create table failed");
        assert_eq!(
            err.source().map(|s| s.to_string()).as_deref(),
            Some("connection reset")
        );
    }
}
