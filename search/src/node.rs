//! Search node, frontier ordering key and dedup signature.

use knitxfer_kernel::machine::state::{Layout, MachineState};

use crate::cost::{PassContext, PassTracker};

/// An immutable search node in the frontier.
///
/// Ordering for frontier extraction uses `(f_cost, penalty, creation_order)`
/// where `f_cost = passes + est_passes`. Lower is better; ties broken by
/// less remaining offset, then older creation order.
#[derive(Debug, Clone)]
pub struct SearchNode {
    pub state: MachineState,
    /// Passes spent by `state.history()` and the pass left open.
    pub tracker: PassTracker,
    /// Admissible estimate of passes still needed.
    pub est_passes: u32,
    pub penalty: u64,
    /// Global counter for deterministic tie-breaking.
    pub creation_order: u64,
}

impl SearchNode {
    #[must_use]
    pub fn passes(&self) -> u32 {
        self.tracker.passes()
    }

    #[must_use]
    pub fn f_cost(&self) -> u32 {
        self.passes().saturating_add(self.est_passes)
    }

    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature {
            passes: self.passes(),
            layout: self.state.layout().clone(),
            context: self.tracker.context(),
        }
    }
}

/// Dedup key: two nodes with equal signatures have identical futures.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Signature {
    pub passes: u32,
    pub layout: Layout,
    pub context: PassContext,
}

/// The frontier ordering key: `(f_cost, penalty, creation_order)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierKey {
    pub f_cost: u32,
    pub penalty: u64,
    pub creation_order: u64,
}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            .then(self.penalty.cmp(&other.penalty))
            .then(self.creation_order.cmp(&other.creation_order))
    }
}

impl From<&SearchNode> for FrontierKey {
    fn from(node: &SearchNode) -> Self {
        Self {
            f_cost: node.f_cost(),
            penalty: node.penalty,
            creation_order: node.creation_order,
        }
    }
}
