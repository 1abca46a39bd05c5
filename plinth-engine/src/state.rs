//! Per-resource lifecycle.
//!
//! ```text
//! Declared → Ordered → Bound → Materialized → Retained
//!                                           ↘ Destroyed
//! ```
//!
//! Transitions only move forward. `Destroyed` and `Retained` are terminal.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

/// Where a resource is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceState {
    Declared,
    Ordered,
    Bound,
    Materialized,
    Retained,
    Destroyed,
}

impl ResourceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Declared => "declared",
            ResourceState::Ordered => "ordered",
            ResourceState::Bound => "bound",
            ResourceState::Materialized => "materialized",
            ResourceState::Retained => "retained",
            ResourceState::Destroyed => "destroyed",
        }
    }

    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: ResourceState) -> bool {
        use ResourceState::*;
        matches!(
            (self, next),
            (Declared, Ordered)
                | (Ordered, Bound)
                | (Bound, Materialized)
                | (Materialized, Retained)
                | (Materialized, Destroyed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ResourceState::Retained | ResourceState::Destroyed)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("'{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: ResourceState,
        to: ResourceState,
    },

    #[error("'{id}' is not tracked")]
    Unknown { id: String },
}

/// The current state of every resource in a graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StateTable {
    states: IndexMap<String, ResourceState>,
}

impl StateTable {
    /// Track every id, starting in `Declared`.
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            states: ids
                .into_iter()
                .map(|id| (id.to_string(), ResourceState::Declared))
                .collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<ResourceState> {
        self.states.get(id).copied()
    }

    /// Move `id` to `next`, failing if the transition is not allowed.
    pub fn transition(&mut self, id: &str, next: ResourceState) -> Result<(), StateError> {
        let current = self
            .states
            .get_mut(id)
            .ok_or_else(|| StateError::Unknown { id: id.to_string() })?;
        if !current.can_transition_to(next) {
            return Err(StateError::InvalidTransition {
                id: id.to_string(),
                from: *current,
                to: next,
            });
        }
        *current = next;
        Ok(())
    }

    /// Ids currently in `state`, in tracking order.
    pub fn in_state(&self, state: ResourceState) -> Vec<&str> {
        self.states
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ResourceState)> {
        self.states.iter().map(|(id, s)| (id.as_str(), *s))
    }
}
