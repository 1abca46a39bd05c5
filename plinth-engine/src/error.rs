//! Structural errors raised before anything is materialized.

use plinth_ir::{Access, EventType, HttpMethod, OutputRef, ReferenceError, ResourceKind};
use thiserror::Error;

use crate::pipeline::Location;

/// Errors detected while building a graph or ordering it.
///
/// Every variant is raised before any provisioner call is issued.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("duplicate resource id '{id}'")]
    DuplicateId { id: String },

    #[error("dependency cycle: {}", cycle_path(.members))]
    Cycle { members: Vec<String> },

    #[error("'{referrer}' references unresolved output '{reference}'{}", unresolved_reason(.known_kind))]
    UnresolvedOutput {
        referrer: String,
        reference: OutputRef,
        /// Kind of the referenced resource, if it exists.
        known_kind: Option<ResourceKind>,
    },

    #[error("'{referrer}' depends on unknown resource '{id}'")]
    UnknownResource { referrer: String, id: String },

    #[error("'{referrer}' expects '{id}' to be a {expected}, but it is a {found}")]
    WrongKind {
        referrer: String,
        id: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[error("invalid reference in '{referrer}'")]
    MalformedReference {
        referrer: String,
        #[source]
        source: ReferenceError,
    },

    #[error("route {method} {path} is declared twice on '{api}'")]
    DuplicateRoute {
        api: String,
        method: HttpMethod,
        path: String,
    },

    #[error("'{bucket}' notifies '{function}' on {event} twice with the same key filter")]
    DuplicateNotification {
        bucket: String,
        event: EventType,
        function: String,
    },

    #[error("authorizer '{id}' does not reference any user pool output")]
    UnboundAuthorizer { id: String },

    #[error(transparent)]
    Grant(#[from] GrantError),
}

impl GraphError {
    /// The manifest location this error points at, if any.
    pub fn location(&self) -> Option<Location> {
        match self {
            GraphError::DuplicateId { id } | GraphError::UnboundAuthorizer { id } => {
                Some(Location::Resource(id.clone()))
            }
            GraphError::Cycle { members } => members.first().cloned().map(Location::Resource),
            GraphError::UnresolvedOutput { referrer, .. }
            | GraphError::UnknownResource { referrer, .. }
            | GraphError::WrongKind { referrer, .. }
            | GraphError::MalformedReference { referrer, .. } => {
                Some(Location::Resource(referrer.clone()))
            }
            GraphError::DuplicateRoute { api, .. } => Some(Location::Route(api.clone())),
            GraphError::DuplicateNotification { bucket, .. } => {
                Some(Location::Notification(bucket.clone()))
            }
            GraphError::Grant(err) => Some(Location::Grant(err.principal().to_string())),
        }
    }
}

fn cycle_path(members: &[String]) -> String {
    match members.first() {
        Some(first) => format!("{} -> {}", members.join(" -> "), first),
        None => String::new(),
    }
}

fn unresolved_reason(kind: &Option<ResourceKind>) -> String {
    match kind {
        Some(kind) => format!(
            " ({} resources produce: {})",
            kind,
            kind.outputs().join(", ")
        ),
        None => " (no such resource)".to_string(),
    }
}

/// Errors from expanding a grant into policy statements.
#[derive(Debug, Error)]
pub enum GrantError {
    #[error("grant principal '{principal}' is not declared")]
    UnknownPrincipal { principal: String },

    #[error("grant from '{principal}' targets unknown resource '{target}'")]
    UnknownTarget { principal: String, target: String },

    #[error("'{principal}' is a {kind} and cannot hold permissions")]
    NotAPrincipal {
        principal: String,
        kind: ResourceKind,
    },

    #[error("'{access}' access is not supported on {kind} '{target}'")]
    Unsupported {
        principal: String,
        target: String,
        kind: ResourceKind,
        access: Access,
    },

    #[error("{kind} '{target}' has no ARN to scope permissions for '{principal}' to")]
    NoArn {
        principal: String,
        target: String,
        kind: ResourceKind,
    },

    #[error("grant to '{principal}' has no target; declare it global to apply it to every resource")]
    Unscoped { principal: String },

    #[error("grant to '{principal}' is global but also targets '{target}'")]
    GlobalWithTarget { principal: String, target: String },

    #[error("grant to '{principal}' lists no actions")]
    NoActions { principal: String },
}

impl GrantError {
    /// The principal the failing grant was declared for.
    pub fn principal(&self) -> &str {
        match self {
            GrantError::UnknownPrincipal { principal }
            | GrantError::UnknownTarget { principal, .. }
            | GrantError::NotAPrincipal { principal, .. }
            | GrantError::Unsupported { principal, .. }
            | GrantError::NoArn { principal, .. }
            | GrantError::Unscoped { principal }
            | GrantError::GlobalWithTarget { principal, .. }
            | GrantError::NoActions { principal } => principal,
        }
    }
}

/// Errors from resolving references against generated outputs.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("output '{reference}' has not been produced")]
    UnresolvedOutput { reference: OutputRef },

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_closes_the_loop() {
        let err = GraphError::Cycle {
            members: vec!["A".into(), "B".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle: A -> B -> A");
    }

    #[test]
    fn test_unresolved_output_lists_known_keys() {
        let err = GraphError::UnresolvedOutput {
            referrer: "Handler".into(),
            reference: OutputRef::new("History", "tableNam"),
            known_kind: Some(ResourceKind::Table),
        };
        assert_eq!(
            err.to_string(),
            "'Handler' references unresolved output 'History.tableNam' (table resources produce: tableName, tableArn)"
        );
        assert_eq!(err.location(), Some(Location::Resource("Handler".into())));
    }

    #[test]
    fn test_grant_error_location() {
        let err = GraphError::from(GrantError::Unscoped {
            principal: "Handler".into(),
        });
        assert_eq!(err.location(), Some(Location::Grant("Handler".into())));
    }

    #[test]
    fn test_wiring_error_locations() {
        let route = GraphError::DuplicateRoute {
            api: "Gateway".into(),
            method: HttpMethod::Get,
            path: "/users".into(),
        };
        assert_eq!(route.location().map(|l| l.to_string()).as_deref(), Some("route.Gateway"));

        let notification = GraphError::DuplicateNotification {
            bucket: "Uploads".into(),
            event: EventType::ObjectCreated,
            function: "Handler".into(),
        };
        assert_eq!(
            notification.to_string(),
            "'Uploads' notifies 'Handler' on object-created twice with the same key filter"
        );
        assert_eq!(
            notification.location(),
            Some(Location::Notification("Uploads".into()))
        );
    }
}
