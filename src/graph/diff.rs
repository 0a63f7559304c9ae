//! Set difference between the previous and the current graph of a subject.

use serde::{Deserialize, Serialize};

use super::Graph;

/// The minimal change that turns one graph into another.
///
/// `deletions = previous − next` and `additions = next − previous`, so
/// applying deletions and then additions to `previous` yields exactly `next`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDelta {
    pub additions: Graph,
    pub deletions: Graph,
}

impl GraphDelta {
    pub fn compute(previous: &Graph, next: &Graph) -> Self {
        Self {
            additions: next.difference(previous),
            deletions: previous.difference(next),
        }
    }

    /// Apply deletions, then additions, to `graph`.
    pub fn apply_to(&self, graph: &mut Graph) {
        for fact in &self.deletions {
            graph.remove(fact);
        }
        for fact in &self.additions {
            graph.insert(fact.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.deletions.is_empty()
    }
}
