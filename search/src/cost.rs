//! Cost and heuristic functions.
//!
//! # Pass model
//!
//! A pass is one carriage traversal at a fixed racking drawing loops from
//! one bed. Walking a transfer list, a new pass starts whenever the racking
//! changes or, at unchanged racking, the source bed changes. The first
//! transfer opens pass 1; an empty list costs 0.
//!
//! Every F->B pass at racking `r` adds `r` to the offset of each loop it
//! carries and every B->F pass subtracts `r`. The bounds below follow from
//! that: a loop with a non-zero offset on the front bed needs an F->B and a
//! later B->F pass; two front loops with different non-zero offsets cannot
//! both be finished by one F->B and one B->F pass; and so on.

use std::collections::BTreeSet;

use knitxfer_kernel::machine::bed::{Bed, BedNeedle};
use knitxfer_kernel::machine::state::MachineState;
use knitxfer_kernel::machine::transfer::Transfer;

use crate::problem::TransferProblem;

/// Racking and source bed of the pass currently open.
pub type PassContext = Option<(i32, Bed)>;

/// Incremental pass counter.
///
/// After any transfer the open pass is exactly `(transfer.rack(),
/// transfer.source_bed())`, so the charge for the next transfer depends
/// only on the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassTracker {
    passes: u32,
    context: PassContext,
}

impl PassTracker {
    #[must_use]
    pub fn passes(&self) -> u32 {
        self.passes
    }

    #[must_use]
    pub fn context(&self) -> PassContext {
        self.context
    }

    /// Extra passes `transfer` costs after the current one: 0 or 1.
    #[must_use]
    pub fn charge(&self, transfer: &Transfer) -> u32 {
        match self.context {
            Some((rack, bed)) if rack == transfer.rack() && bed == transfer.source_bed() => 0,
            _ => 1,
        }
    }

    #[must_use]
    pub fn advance(&self, transfer: &Transfer) -> Self {
        Self {
            passes: self.passes + self.charge(transfer),
            context: Some((transfer.rack(), transfer.source_bed())),
        }
    }
}

/// `Σ |offset[i]|`: zero exactly when every loop is on its target needle.
#[must_use]
pub fn penalty(state: &MachineState) -> u64 {
    state.penalty()
}

/// Physical passes needed to execute `transfers` in order.
#[must_use]
pub fn pass_count(transfers: &[Transfer]) -> u32 {
    transfers
        .iter()
        .fold(PassTracker::default(), |t, x| t.advance(x))
        .passes()
}

/// Whether a zero-offset front loop already occupies the target of an active
/// first that has not arrived. That loop must leave and come back after the
/// first lands.
#[must_use]
pub fn firsts_conflict(problem: &TransferProblem, state: &MachineState) -> bool {
    if !problem.firsts_active() {
        return false;
    }
    (0..problem.loop_count())
        .filter(|&f| problem.is_first(f) && state.offsets()[f] != 0)
        .any(|f| {
            state
                .stack_at(BedNeedle::front(problem.target(f)))
                .iter()
                .any(|&z| state.offsets()[z] == 0)
        })
}

/// Admissible estimate of the passes still needed from `state`.
///
/// With `kf` distinct non-zero offsets on the front bed and `kb` distinct
/// offsets on the back bed:
///
/// - an F->B pass is needed if `kf > 0` or a firsts conflict exists;
/// - a B->F pass is needed if anything is off target or on the back bed;
/// - three passes are needed if `kf >= 2`, or if `kb >= 2` and an F->B pass
///   is needed; two if `kb >= 2` alone.
///
/// The open pass may serve the first of those for free, so one pass is taken
/// off when it draws from a bed that still has required work.
#[must_use]
pub fn lower_bound_from_here(
    problem: &TransferProblem,
    state: &MachineState,
    context: PassContext,
) -> u32 {
    let mut front = BTreeSet::new();
    let mut back = BTreeSet::new();
    for (i, &offset) in state.offsets().iter().enumerate() {
        match state.beds()[i] {
            Bed::Front if offset != 0 => {
                front.insert(offset);
            }
            Bed::Front => {}
            Bed::Back => {
                back.insert(offset);
            }
        }
    }
    let (kf, kb) = (front.len(), back.len());
    let need_to_back = kf > 0 || firsts_conflict(problem, state);
    let need_to_front = kf > 0 || kb > 0;

    let mut bound = u32::from(need_to_back) + u32::from(need_to_front);
    if kf >= 2 || (kb >= 2 && need_to_back) {
        bound = 3;
    } else if kb >= 2 {
        bound = bound.max(2);
    }

    let open_pass_helps = match context {
        Some((_, Bed::Front)) => need_to_back,
        Some((_, Bed::Back)) => kb > 0,
        None => false,
    };
    bound.saturating_sub(u32::from(open_pass_helps))
}

/// Lower bound on the optimal pass count of the whole problem, used to stop
/// the search early once a plan meets it.
///
/// Counts distinct offsets over loops that are off target or not flagged
/// first, capped at 3 (beyond that, combinations of rackings can serve more
/// offsets than passes), then raised to the heuristic at the initial state.
#[must_use]
pub fn initial_lower_bound(problem: &TransferProblem) -> u32 {
    if problem.is_trivial() {
        return 0;
    }
    let distinct: BTreeSet<i32> = problem
        .offsets()
        .iter()
        .enumerate()
        .filter(|&(i, &o)| o != 0 || !problem.is_first(i))
        .map(|(_, &o)| o)
        .collect();
    let counted = u32::try_from(distinct.len()).unwrap_or(u32::MAX).min(3);
    counted.max(lower_bound_from_here(
        problem,
        &problem.initial_state(),
        None,
    ))
}
