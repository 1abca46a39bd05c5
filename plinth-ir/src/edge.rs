//! Relationship edges between descriptors.

use std::collections::BTreeSet;

use serde::Serialize;

/// The meaning of a relationship edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EdgeKind {
    /// `to` cannot be materialized until `from` exists.
    DependsOn,
    /// `from` receives the listed permissions on `to`.
    Grants { permissions: BTreeSet<String> },
}

/// A directed edge in the relationship graph.
///
/// For [`EdgeKind::DependsOn`] the edge points from the prerequisite to the
/// dependent, so every edge `a → b` means `a` is materialized before `b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationshipEdge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl RelationshipEdge {
    /// `dependent` needs `prerequisite` to exist first.
    pub fn depends_on(dependent: impl Into<String>, prerequisite: impl Into<String>) -> Self {
        Self {
            from: prerequisite.into(),
            to: dependent.into(),
            kind: EdgeKind::DependsOn,
        }
    }

    /// `principal` receives `permissions` on `resource`.
    pub fn grants<I, S>(principal: impl Into<String>, resource: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            from: principal.into(),
            to: resource.into(),
            kind: EdgeKind::Grants {
                permissions: permissions.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn is_dependency(&self) -> bool {
        matches!(self.kind, EdgeKind::DependsOn)
    }

    /// The granted permissions, for grant edges.
    pub fn permissions(&self) -> Option<&BTreeSet<String>> {
        match &self.kind {
            EdgeKind::Grants { permissions } => Some(permissions),
            EdgeKind::DependsOn => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depends_on_points_at_dependent() {
        let edge = RelationshipEdge::depends_on("ApiHandler", "HistoryTable");
        assert_eq!(edge.from, "HistoryTable");
        assert_eq!(edge.to, "ApiHandler");
        assert!(edge.is_dependency());
        assert!(edge.permissions().is_none());
    }

    #[test]
    fn test_grants_collects_permissions() {
        let edge = RelationshipEdge::grants(
            "UploadBucket",
            "FileProcessor",
            ["lambda:InvokeFunction", "lambda:InvokeFunction"],
        );
        assert!(!edge.is_dependency());
        assert_eq!(edge.permissions().map(BTreeSet::len), Some(1));
    }
}
