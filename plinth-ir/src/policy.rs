//! Permission policies attached to principals.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Whether a statement allows or denies its actions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => f.write_str("allow"),
            Effect::Deny => f.write_str("deny"),
        }
    }
}

/// One concrete permission statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PolicyStatement {
    pub effect: Effect,
    pub actions: BTreeSet<String>,
    /// Resource patterns; may contain output references until bound.
    pub resources: BTreeSet<String>,
}

impl PolicyStatement {
    pub fn allow<A, R>(actions: A, resources: R) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }
}

/// Two statements on one principal that disagree about an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyConflict {
    pub action: String,
    pub resource: String,
}

impl fmt::Display for PolicyConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' on '{}' is both allowed and denied",
            self.action, self.resource
        )
    }
}

/// The ordered set of statements held by one principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Policy {
    statements: Vec<PolicyStatement>,
}

impl Policy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement unless an identical one is already present.
    ///
    /// Returns true if the statement was added.
    pub fn add(&mut self, statement: PolicyStatement) -> bool {
        if self.statements.contains(&statement) {
            return false;
        }
        self.statements.push(statement);
        true
    }

    pub fn statements(&self) -> &[PolicyStatement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Every resource pattern referenced by any statement.
    pub fn resources(&self) -> impl Iterator<Item = &str> {
        self.statements
            .iter()
            .flat_map(|s| s.resources.iter().map(String::as_str))
    }

    /// Find actions that are both allowed and denied on the same resource pattern.
    ///
    /// A trailing `*` on either side matches by prefix.
    pub fn conflicts(&self) -> Vec<PolicyConflict> {
        let mut found = Vec::new();
        let allows = self.statements.iter().filter(|s| s.effect == Effect::Allow);

        for allow in allows {
            for deny in self.statements.iter().filter(|s| s.effect == Effect::Deny) {
                for resource in allow.resources.intersection(&deny.resources) {
                    for action in &allow.actions {
                        if deny.actions.iter().any(|d| actions_overlap(action, d)) {
                            let conflict = PolicyConflict {
                                action: action.clone(),
                                resource: resource.clone(),
                            };
                            if !found.contains(&conflict) {
                                found.push(conflict);
                            }
                        }
                    }
                }
            }
        }
        found
    }
}

fn actions_overlap(a: &str, b: &str) -> bool {
    fn matches(pattern: &str, action: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => action.starts_with(prefix),
            None => pattern == action,
        }
    }
    matches(a, b) || matches(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut policy = Policy::new();
        let stmt = PolicyStatement::allow(["dynamodb:GetItem"], ["${T.tableArn}"]);

        assert!(policy.add(stmt.clone()));
        assert!(!policy.add(stmt));
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_action_order_does_not_matter() {
        let mut policy = Policy::new();
        policy.add(PolicyStatement::allow(["b", "a"], ["r"]));
        assert!(!policy.add(PolicyStatement::allow(["a", "b"], ["r"])));
    }

    #[test]
    fn test_conflicts_detects_allow_and_deny() {
        let mut policy = Policy::new();
        policy.add(PolicyStatement::allow(["s3:GetObject*"], ["bucket/*"]));
        policy.add(
            PolicyStatement::allow(["s3:GetObject"], ["bucket/*"]).with_effect(Effect::Deny),
        );

        let conflicts = policy.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].action, "s3:GetObject*");
        assert_eq!(conflicts[0].resource, "bucket/*");
    }

    #[test]
    fn test_no_conflict_on_different_resources() {
        let mut policy = Policy::new();
        policy.add(PolicyStatement::allow(["s3:GetObject"], ["a/*"]));
        policy.add(PolicyStatement::allow(["s3:GetObject"], ["b/*"]).with_effect(Effect::Deny));
        assert!(policy.conflicts().is_empty());
    }
}
