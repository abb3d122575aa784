//! Move validator.
//!
//! A move carries loop `index` and every loop stacked with it to the
//! opposite bed at a given racking. [`check_move`] runs the checks below in
//! order and stops at the first failure, returning its reason code:
//!
//! 1. the current layout tolerates the racking at all;
//! 2. the layout after the move respects slack at that racking;
//! 3. no carried loop lands on the wrong side of its nearest same-bed
//!    neighbours;
//! 4. the destination stack holds a single offset;
//! 5. with firsts active, every first in the destination stack can still
//!    finish first-arrived: index 0 on the front bed, last on the back bed.
//!    Stacks never split and each bed change reverses them, so a first out
//!    of that position can never recover.

use std::fmt;

use knitxfer_kernel::machine::bed::{Bed, BedNeedle};
use knitxfer_kernel::machine::slack::SlackViolation;
use knitxfer_kernel::machine::state::{MachineState, StateError};

use crate::problem::TransferProblem;

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveRejection {
    /// The current layout cannot be racked to the requested offset.
    RackInfeasible(SlackViolation),
    /// The layout after the move over-stretches yarn.
    PostMoveSlack(SlackViolation),
    /// `moved` would cross `neighbor` on the destination bed.
    Tangle { moved: usize, neighbor: usize },
    /// `moved` would stack with `other`, which has a different offset.
    MixedStack { moved: usize, other: usize },
    /// First-flagged loop `first` would be out of place on `at`.
    FirstOutOfOrder { first: usize, at: BedNeedle },
    /// The move could not be applied at all.
    Machine(StateError),
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RackInfeasible(v) => write!(f, "racking infeasible: {v}"),
            Self::PostMoveSlack(v) => write!(f, "move over-stretches: {v}"),
            Self::Tangle { moved, neighbor } => {
                write!(f, "loop {moved} would tangle with loop {neighbor}")
            }
            Self::MixedStack { moved, other } => write!(
                f,
                "loop {moved} would stack with loop {other} of a different offset"
            ),
            Self::FirstOutOfOrder { first, at } => {
                write!(f, "first loop {first} could no longer arrive first on {at}")
            }
            Self::Machine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for MoveRejection {}

/// Check 1: the current layout tolerates `rack`.
///
/// # Errors
///
/// [`MoveRejection::RackInfeasible`] with the first over-stretched pair.
pub fn check_rackable(
    problem: &TransferProblem,
    state: &MachineState,
    rack: i32,
) -> Result<(), MoveRejection> {
    problem
        .slack()
        .check_state(state, rack)
        .map_err(MoveRejection::RackInfeasible)
}

/// Check 3: each loop in `moved` keeps its order relative to the nearest
/// lower- and higher-indexed loops on its bed.
///
/// # Errors
///
/// [`MoveRejection::Tangle`] naming the crossed neighbour.
pub fn check_tangling(after: &MachineState, moved: &[usize]) -> Result<(), MoveRejection> {
    let beds = after.beds();
    let currents = after.currents();
    for &m in moved {
        let bed = beds[m];
        let here = currents[m];
        if let Some(prev) = (0..m).rev().find(|&j| beds[j] == bed) {
            if here < currents[prev] {
                return Err(MoveRejection::Tangle {
                    moved: m,
                    neighbor: prev,
                });
            }
        }
        if let Some(next) = (m + 1..beds.len()).find(|&j| beds[j] == bed) {
            if here > currents[next] {
                return Err(MoveRejection::Tangle {
                    moved: m,
                    neighbor: next,
                });
            }
        }
    }
    Ok(())
}

/// Check 4: every loop on `at` shares the offset of `moved`.
///
/// # Errors
///
/// [`MoveRejection::MixedStack`] naming the first mismatched loop.
pub fn check_stack_consistency(
    after: &MachineState,
    at: BedNeedle,
    moved: usize,
) -> Result<(), MoveRejection> {
    let offsets = after.offsets();
    match after
        .stack_at(at)
        .iter()
        .find(|&&j| offsets[j] != offsets[moved])
    {
        Some(&other) => Err(MoveRejection::MixedStack { moved, other }),
        None => Ok(()),
    }
}

/// Check 5: firsts on `at` sit where they can still finish first-arrived.
///
/// # Errors
///
/// [`MoveRejection::FirstOutOfOrder`] naming the misplaced first.
pub fn check_firsts_order(
    problem: &TransferProblem,
    after: &MachineState,
    at: BedNeedle,
) -> Result<(), MoveRejection> {
    if !problem.firsts_active() {
        return Ok(());
    }
    let stack = after.stack_at(at);
    let required = match at.bed {
        Bed::Front => 0,
        Bed::Back => stack.len().saturating_sub(1),
    };
    for (pos, &j) in stack.iter().enumerate() {
        if problem.is_first(j) && pos != required {
            return Err(MoveRejection::FirstOutOfOrder { first: j, at });
        }
    }
    Ok(())
}

/// Run every check for moving loop `index` (with its stack) at `rack`.
///
/// On success returns the state after the move; `state` is never modified.
///
/// # Errors
///
/// The first failing check's [`MoveRejection`].
pub fn check_move(
    problem: &TransferProblem,
    state: &MachineState,
    index: usize,
    rack: i32,
) -> Result<MachineState, MoveRejection> {
    check_rackable(problem, state, rack)?;

    let transfer = state
        .transfer_for_move(index, rack)
        .map_err(MoveRejection::Machine)?;
    let moved = state.stack_at(transfer.source).to_vec();
    let after = state
        .apply_transfer(transfer)
        .map_err(MoveRejection::Machine)?;

    problem
        .slack()
        .check_state(&after, rack)
        .map_err(MoveRejection::PostMoveSlack)?;
    check_tangling(&after, &moved)?;
    check_stack_consistency(&after, transfer.destination, index)?;
    check_firsts_order(problem, &after, transfer.destination)?;
    Ok(after)
}

/// `true` when [`check_move`] accepts the move.
#[must_use]
pub fn is_move_legal(
    problem: &TransferProblem,
    state: &MachineState,
    index: usize,
    rack: i32,
) -> bool {
    check_move(problem, state, index, rack).is_ok()
}
