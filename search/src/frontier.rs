//! Best-first frontier with duplicate and dominance pruning.
//!
//! Uses `BTreeMap`/`BTreeSet` (not hash containers) so every decision is
//! independent of hashing and iteration order.
//!
//! A node is dominated when its layout was already expanded with strictly
//! fewer passes, or with the same open pass and no more passes. The first
//! transfer out of a layout costs at most one pass more for one open pass
//! than for another, and later charges depend only on the transfers
//! themselves, so a dominated node can never lead to a cheaper plan.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use knitxfer_kernel::machine::state::Layout;

use crate::cost::PassContext;
use crate::node::{FrontierKey, SearchNode, Signature};

/// A frontier entry wrapping a node with its ordering key.
///
/// `BinaryHeap` is a max-heap, so we use `Reverse<FrontierKey>` to get
/// min-heap behavior (lowest `f_cost` first).
#[derive(Debug)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    node: SearchNode,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Best-first frontier manager.
///
/// Maintains:
/// - A `BinaryHeap` for O(log n) pop of the best node
/// - The set of every signature ever queued
/// - Per expanded layout, the fewest passes it was expanded with, overall
///   and per open pass
#[derive(Debug, Default)]
pub struct BestFirstFrontier {
    heap: BinaryHeap<FrontierEntry>,
    queued: BTreeSet<Signature>,
    expanded: BTreeMap<Layout, Expanded>,
    high_water: u64,
}

#[derive(Debug)]
struct Expanded {
    best: u32,
    by_context: BTreeMap<PassContext, u32>,
}

impl BestFirstFrontier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `node` unless its signature was queued before or is dominated.
    ///
    /// Returns `false` if the node was not added.
    pub fn push(&mut self, node: SearchNode) -> bool {
        let sig = node.signature();
        if self.is_dominated(&sig) || !self.queued.insert(sig) {
            return false;
        }
        self.heap.push(FrontierEntry {
            key: Reverse(FrontierKey::from(&node)),
            node,
        });
        let size = self.heap.len() as u64;
        if size > self.high_water {
            self.high_water = size;
        }
        true
    }

    /// Pop the best (lowest `f_cost`) node.
    #[must_use]
    pub fn pop(&mut self) -> Option<SearchNode> {
        self.heap.pop().map(|e| e.node)
    }

    /// Whether an already expanded node makes `sig` pointless.
    #[must_use]
    pub fn is_dominated(&self, sig: &Signature) -> bool {
        self.expanded.get(&sig.layout).is_some_and(|e| {
            e.best < sig.passes
                || e
                    .by_context
                    .get(&sig.context)
                    .is_some_and(|&p| p <= sig.passes)
        })
    }

    /// Record `sig` as expanded.
    ///
    /// Returns `false` (recording nothing) when it is dominated.
    pub fn mark_expanded(&mut self, sig: &Signature) -> bool {
        if self.is_dominated(sig) {
            return false;
        }
        let entry = self
            .expanded
            .entry(sig.layout.clone())
            .or_insert_with(|| Expanded {
                best: sig.passes,
                by_context: BTreeMap::new(),
            });
        entry.best = entry.best.min(sig.passes);
        entry.by_context.insert(sig.context, sig.passes);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// High-water mark of frontier size.
    #[must_use]
    pub fn high_water(&self) -> u64 {
        self.high_water
    }

    /// Distinct layouts expanded so far.
    #[must_use]
    pub fn expanded_layout_count(&self) -> usize {
        self.expanded.len()
    }
}
