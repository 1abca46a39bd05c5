//! Materialization ordering.
//!
//! Ordering uses Kahn's algorithm over the `DependsOn` edges. Among the
//! resources that are ready at any point, the one declared first is taken
//! next, so the same declaration always yields the same order. Each resource
//! is also assigned a level: one more than the deepest of its prerequisites.
//! Resources sharing a level do not depend on each other.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::{GraphError, graph::Graph};

/// A dependency-respecting order over a graph's descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    order: Vec<String>,
    levels: Vec<Vec<String>>,
}

impl Plan {
    /// Every id, prerequisites before dependents.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Groups of ids that can be materialized together, in order.
    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|o| o == id)
    }

    /// Returns true if `a` comes before `b` in the order.
    pub fn precedes(&self, a: &str, b: &str) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|level| level.iter().any(|l| l == id))
    }
}

/// Orders a [`Graph`] into a [`Plan`].
pub struct PlanBuilder<'g> {
    graph: &'g Graph,
}

impl<'g> PlanBuilder<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    pub fn build(&self) -> Result<Plan, GraphError> {
        let ids: Vec<&str> = self.graph.descriptors().map(|d| d.id()).collect();
        let n = ids.len();

        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        for edge in self.graph.dependencies() {
            let (Some(from), Some(to)) = (self.graph.index_of(&edge.from), self.graph.index_of(&edge.to))
            else {
                continue;
            };
            successors[from].push(to);
            predecessors[to].push(from);
            in_degree[to] += 1;
        }

        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut level = vec![0usize; n];
        let mut done = vec![false; n];
        let mut order = Vec::with_capacity(n);

        while let Some(next) = ready.pop_first() {
            done[next] = true;
            order.push(next);
            for &succ in &successors[next] {
                level[succ] = level[succ].max(level[next] + 1);
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    ready.insert(succ);
                }
            }
        }

        if order.len() < n {
            let members = find_cycle(&predecessors, &done)
                .into_iter()
                .map(|i| ids[i].to_string())
                .collect();
            return Err(GraphError::Cycle { members });
        }

        let depth = order.iter().map(|&i| level[i] + 1).max().unwrap_or(0);
        let mut levels = vec![Vec::new(); depth];
        for &i in &order {
            levels[level[i]].push(ids[i].to_string());
        }

        tracing::debug!(resources = n, levels = depth, "planned graph");

        Ok(Plan {
            order: order.into_iter().map(|i| ids[i].to_string()).collect(),
            levels,
        })
    }
}

/// Extract one concrete cycle from the nodes Kahn's algorithm could not place.
///
/// Every unplaced node has an unplaced predecessor, so walking predecessors
/// from any of them must revisit a node. The members are returned in edge
/// order, starting from the one declared first.
fn find_cycle(predecessors: &[Vec<usize>], done: &[bool]) -> Vec<usize> {
    let Some(start) = done.iter().position(|d| !d) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut current = start;
    loop {
        let Some(&pred) = predecessors[current].iter().filter(|&&p| !done[p]).min() else {
            return Vec::new();
        };
        if let Some(pos) = path.iter().position(|&p| p == pred) {
            let mut cycle: Vec<usize> = path.split_off(pos);
            cycle.reverse();
            if let Some(first) = cycle.iter().enumerate().min_by_key(|(_, i)| **i).map(|(pos, _)| pos) {
                cycle.rotate_left(first);
            }
            return cycle;
        }
        path.push(pred);
        current = pred;
    }
}
