//! Grant intents.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

use crate::Effect;

/// A high-level access level that expands into concrete actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    Read,
    Write,
    ReadWrite,
    Put,
    Invoke,
}

impl Access {
    pub fn as_str(&self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::Write => "write",
            Access::ReadWrite => "read-write",
            Access::Put => "put",
            Access::Invoke => "invoke",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a grant asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantIntent {
    /// A named access level, expanded per target kind.
    Access(Access),
    /// An explicit action list, emitted as declared.
    Custom {
        effect: Effect,
        actions: BTreeSet<String>,
    },
}

impl fmt::Display for GrantIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantIntent::Access(access) => write!(f, "{}", access),
            GrantIntent::Custom { effect, actions } => {
                let actions: Vec<&str> = actions.iter().map(String::as_str).collect();
                write!(f, "{} [{}]", effect, actions.join(", "))
            }
        }
    }
}

/// A declared grant of permissions to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    /// Resource receiving the permissions.
    pub principal: String,
    /// Resource the permissions apply to. `None` only for global grants.
    pub target: Option<String>,
    pub intent: GrantIntent,
    /// Explicitly applies to every resource (`*`).
    pub global: bool,
}

impl Grant {
    /// Grant a named access level on a target.
    pub fn access(principal: impl Into<String>, target: impl Into<String>, access: Access) -> Self {
        Self {
            principal: principal.into(),
            target: Some(target.into()),
            intent: GrantIntent::Access(access),
            global: false,
        }
    }

    /// Grant an explicit action list on a target.
    pub fn actions<I, S>(principal: impl Into<String>, target: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principal: principal.into(),
            target: Some(target.into()),
            intent: GrantIntent::Custom {
                effect: Effect::Allow,
                actions: actions.into_iter().map(Into::into).collect(),
            },
            global: false,
        }
    }

    /// Grant an explicit action list on every resource.
    pub fn global<I, S>(principal: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            principal: principal.into(),
            target: None,
            intent: GrantIntent::Custom {
                effect: Effect::Allow,
                actions: actions.into_iter().map(Into::into).collect(),
            },
            global: true,
        }
    }

    /// Switch a custom grant to the given effect. Named access levels are always `Allow`.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        if let GrantIntent::Custom { effect: e, .. } = &mut self.intent {
            *e = effect;
        }
        self
    }
}
