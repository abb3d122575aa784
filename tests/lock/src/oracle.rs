//! Exhaustive reference planner for small problems.
//!
//! Explores `(layout, open pass)` states in order of passes spent, trying
//! every loop at every racking (not only stack leaders), and reports the
//! exact minimum number of passes to a goal. Legality comes from
//! `check_move`; pass accounting is reimplemented here so the search's
//! `PassTracker` is checked against an independent count.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use knitxfer_kernel::machine::state::{Layout, MachineState};
use knitxfer_kernel::machine::transfer::Transfer;
use knitxfer_search::cost::PassContext;
use knitxfer_search::legality::check_move;
use knitxfer_search::problem::TransferProblem;
use knitxfer_search::search::is_goal;

/// Limits that keep an unsolvable problem from running forever.
#[derive(Debug, Clone, Copy)]
pub struct OracleLimits {
    pub max_rack: i32,
    /// Give up once every state within this many passes is explored.
    pub max_passes: u32,
    /// Give up after this many settled states.
    pub max_states: usize,
}

impl OracleLimits {
    #[must_use]
    pub fn new(max_rack: i32) -> Self {
        Self {
            max_rack,
            max_passes: 8,
            max_states: 200_000,
        }
    }
}

/// Outcome of an exhaustive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleAnswer {
    /// Minimum passes from the start state to a goal.
    Optimal(u32),
    /// No goal within `max_passes`, with every such state explored.
    Unreachable,
    /// `max_states` ran out first.
    GaveUp,
}

impl OracleAnswer {
    #[must_use]
    pub fn optimal(self) -> Option<u32> {
        match self {
            Self::Optimal(p) => Some(p),
            Self::Unreachable | Self::GaveUp => None,
        }
    }
}

fn charge(context: PassContext, t: &Transfer) -> u32 {
    match context {
        Some((rack, bed)) if rack == t.front_needle() - t.back_needle() && bed == t.source.bed => {
            0
        }
        _ => 1,
    }
}

fn context_after(t: &Transfer) -> PassContext {
    Some((t.front_needle() - t.back_needle(), t.source.bed))
}

/// Every successor of `state` with the transfer that produced it.
#[must_use]
pub fn successors(
    problem: &TransferProblem,
    state: &MachineState,
    max_rack: i32,
) -> Vec<(Transfer, MachineState)> {
    let mut out = Vec::new();
    for index in 0..problem.loop_count() {
        for rack in -max_rack..=max_rack {
            if let Ok(next) = check_move(problem, state, index, rack) {
                if let Some(&t) = next.history().last() {
                    out.push((t, next));
                }
            }
        }
    }
    out
}

/// Exact minimum passes still needed from `start` with `context` open.
#[must_use]
pub fn min_remaining_passes(
    problem: &TransferProblem,
    start: &MachineState,
    context: PassContext,
    limits: OracleLimits,
) -> OracleAnswer {
    let mut states: Vec<(MachineState, PassContext)> = vec![(start.clone(), context)];
    let mut best: BTreeMap<(Layout, PassContext), u32> = BTreeMap::new();
    let mut settled: BTreeSet<(Layout, PassContext)> = BTreeSet::new();
    let mut heap = BinaryHeap::new();
    best.insert((start.layout().clone(), context), 0);
    heap.push(Reverse((0_u32, 0_usize)));

    while let Some(Reverse((cost, id))) = heap.pop() {
        if cost > limits.max_passes {
            return OracleAnswer::Unreachable;
        }
        let (state, ctx) = states[id].clone();
        let key = (state.layout().clone(), ctx);
        if !settled.insert(key) {
            continue;
        }
        if is_goal(problem, &state) {
            return OracleAnswer::Optimal(cost);
        }
        if settled.len() > limits.max_states {
            return OracleAnswer::GaveUp;
        }
        for (t, next) in successors(problem, &state, limits.max_rack) {
            let next_cost = cost + charge(ctx, &t);
            let next_ctx = context_after(&t);
            let next_key = (next.layout().clone(), next_ctx);
            if settled.contains(&next_key) {
                continue;
            }
            if best.get(&next_key).is_some_and(|&c| c <= next_cost) {
                continue;
            }
            best.insert(next_key, next_cost);
            states.push((next, next_ctx));
            heap.push(Reverse((next_cost, states.len() - 1)));
        }
    }
    OracleAnswer::Unreachable
}

/// Exact optimum of the whole problem.
#[must_use]
pub fn optimal_passes(problem: &TransferProblem, limits: OracleLimits) -> OracleAnswer {
    min_remaining_passes(problem, &problem.initial_state(), None, limits)
}

/// States reachable from the start within `max_passes`, each with its open
/// pass and the passes spent reaching it. At most `cap` states are returned.
#[must_use]
pub fn reachable_states(
    problem: &TransferProblem,
    max_rack: i32,
    max_passes: u32,
    cap: usize,
) -> Vec<(MachineState, PassContext, u32)> {
    let start = problem.initial_state();
    let mut seen: BTreeSet<(Layout, PassContext)> = BTreeSet::new();
    seen.insert((start.layout().clone(), None));
    let mut out = vec![(start, None, 0)];
    let mut cursor = 0;
    while cursor < out.len() && out.len() < cap {
        let (state, ctx, passes) = out[cursor].clone();
        cursor += 1;
        for (t, next) in successors(problem, &state, max_rack) {
            let next_passes = passes + charge(ctx, &t);
            if next_passes > max_passes {
                continue;
            }
            let next_ctx = context_after(&t);
            if seen.insert((next.layout().clone(), next_ctx)) {
                out.push((next, next_ctx, next_passes));
                if out.len() >= cap {
                    break;
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(offsets: &[i32]) -> TransferProblem {
        TransferProblem::new(offsets, &vec![false; offsets.len()]).unwrap()
    }

    #[test]
    fn trivial_problem_needs_no_passes() {
        assert_eq!(
            optimal_passes(&problem(&[0, 0]), OracleLimits::new(1)),
            OracleAnswer::Optimal(0)
        );
    }

    #[test]
    fn uniform_shift_needs_two_passes() {
        assert_eq!(
            optimal_passes(&problem(&[1, 1, 1]), OracleLimits::new(1)),
            OracleAnswer::Optimal(2)
        );
    }

    #[test]
    fn reachable_states_start_at_root() {
        let p = problem(&[1, 0]);
        let states = reachable_states(&p, 1, 2, 50);
        assert_eq!(states[0].2, 0);
        assert!(states[0].1.is_none());
        assert!(states.len() > 1);
        assert!(states.iter().all(|(_, _, passes)| *passes <= 2));
    }
}
