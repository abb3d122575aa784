//! `replay_verify()`: check a transfer list by deterministic replay.
//!
//! The list is simulated on a fresh machine (loop `i` on front needle `i`).
//! Before each transfer the valid racking range is recomputed from the slack
//! profile and the transfer's racking must fall inside it. After the last
//! transfer every loop must rest on front needle `i + offset[i]`, and every
//! loop flagged first must be the first-arrived entry of its stack.
//!
//! Transfers of empty needles and of stacks are legal here but counted, so
//! callers can hold plans to stricter rules.

use std::fmt;
use std::fmt::Write as _;

use crate::machine::bed::{BedNeedle, Needle};
use crate::machine::slack::{RackRange, SlackProfile};
use crate::machine::state::{home_needle, Layout, MachineState, StateError};
use crate::machine::transfer::Transfer;
use crate::proof::hash::{canonical_hash, ContentHash, DOMAIN_LAYOUT};

/// Error during replay (distinct from a divergence verdict).
///
/// A `ReplayError` means the inputs could not be replayed at all.
/// A [`ReplayVerdict::Divergence`] means they were replayed but the
/// transfers broke a machine rule or missed the goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// `offsets` and `firsts` disagree in length.
    LengthMismatch { offsets: usize, firsts: usize },
    /// Target `i + offset[i]` of a loop does not fit the needle range.
    OffsetOutOfRange { loop_index: usize, offset: i32 },
    /// The simulated machine reached an impossible configuration.
    Machine(StateError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { offsets, firsts } => write!(
                f,
                "{offsets} offsets but {firsts} firsts flags; lengths must agree"
            ),
            Self::OffsetOutOfRange { loop_index, offset } => write!(
                f,
                "offset {offset} of loop {loop_index} overflows the needle range"
            ),
            Self::Machine(e) => write!(f, "replay machine error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<StateError> for ReplayError {
    fn from(e: StateError) -> Self {
        Self::Machine(e)
    }
}

/// The first rule a replayed transfer list broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Divergence {
    /// Transfer `step` (0-based) stays on one bed.
    SameBed { step: usize, transfer: Transfer },
    /// Transfer `step` spans more needles than any racking can.
    RackOverflow { step: usize, transfer: Transfer },
    /// Before transfer `step` no racking satisfies every split pair.
    NoValidRacking { step: usize },
    /// Transfer `step` needs a racking outside the valid range.
    RackOutOfRange {
        step: usize,
        rack: i32,
        range: RackRange,
    },
    /// Loop did not finish on its target needle.
    Unreached {
        loop_index: usize,
        target: BedNeedle,
        actual: BedNeedle,
    },
    /// Loop flagged first is not the first-arrived entry of its stack.
    FirstBuried {
        loop_index: usize,
        at: BedNeedle,
        depth: usize,
    },
}

impl fmt::Display for Divergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SameBed { step, transfer } => {
                write!(f, "transfer {step} ({transfer}) must change beds")
            }
            Self::RackOverflow { step, transfer } => {
                write!(f, "transfer {step} ({transfer}) needs an unrepresentable racking")
            }
            Self::NoValidRacking { step } => {
                write!(f, "no valid racking exists before transfer {step}")
            }
            Self::RackOutOfRange { step, rack, range } => write!(
                f,
                "transfer {step} needs racking {rack}, outside valid range {range}"
            ),
            Self::Unreached {
                loop_index,
                target,
                actual,
            } => write!(f, "loop {loop_index} ended on {actual}, expected {target}"),
            Self::FirstBuried {
                loop_index,
                at,
                depth,
            } => write!(
                f,
                "loop {loop_index} must arrive first on {at} but is entry {depth}"
            ),
        }
    }
}

/// Verdict of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayVerdict {
    Match,
    Divergence(Divergence),
}

impl ReplayVerdict {
    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Outcome of [`replay_verify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub verdict: ReplayVerdict,
    /// Transfers whose source needle held nothing.
    pub empty_transfers: usize,
    /// Transfers that carried more than one loop.
    pub stacked_transfers: usize,
    /// Layout after the last transfer that was replayed.
    pub final_layout: Layout,
}

impl ReplayReport {
    /// Content hash of the final layout, one `"<needle> <loops...>"` line per
    /// occupied needle in layout order.
    #[must_use]
    pub fn layout_digest(&self) -> ContentHash {
        let mut text = String::new();
        for (at, stack) in &self.final_layout {
            let _ = write!(text, "{at}");
            for i in stack {
                let _ = write!(text, " {i}");
            }
            text.push('\n');
        }
        canonical_hash(DOMAIN_LAYOUT, text.as_bytes())
    }
}

/// Replay `transfers` for a problem with the given `offsets` and `firsts`.
///
/// # Errors
///
/// Returns [`ReplayError`] if the inputs are structurally unusable. Rule
/// violations are reported through [`ReplayReport::verdict`].
pub fn replay_verify(
    offsets: &[i32],
    firsts: &[bool],
    transfers: &[Transfer],
) -> Result<ReplayReport, ReplayError> {
    if offsets.len() != firsts.len() {
        return Err(ReplayError::LengthMismatch {
            offsets: offsets.len(),
            firsts: firsts.len(),
        });
    }
    let targets = offsets
        .iter()
        .enumerate()
        .map(|(loop_index, &offset)| {
            home_needle(loop_index)
                .checked_add(offset)
                .ok_or(ReplayError::OffsetOutOfRange { loop_index, offset })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let slack = SlackProfile::from_offsets(offsets);
    let mut state = MachineState::initial(offsets);
    let mut empty_transfers = 0;
    let mut stacked_transfers = 0;

    let finish = |state: MachineState, verdict, empty_transfers, stacked_transfers| ReplayReport {
        verdict,
        empty_transfers,
        stacked_transfers,
        final_layout: state.layout().clone(),
    };

    for (step, &transfer) in transfers.iter().enumerate() {
        if !transfer.is_cross_bed() {
            let verdict = ReplayVerdict::Divergence(Divergence::SameBed { step, transfer });
            return Ok(finish(state, verdict, empty_transfers, stacked_transfers));
        }
        if !transfer.in_range() {
            let verdict = ReplayVerdict::Divergence(Divergence::RackOverflow { step, transfer });
            return Ok(finish(state, verdict, empty_transfers, stacked_transfers));
        }
        let range = slack.valid_rack_range(state.currents(), state.beds());
        if range.is_empty() {
            let verdict = ReplayVerdict::Divergence(Divergence::NoValidRacking { step });
            return Ok(finish(state, verdict, empty_transfers, stacked_transfers));
        }
        let rack = transfer.rack();
        if !range.contains(rack) {
            let verdict =
                ReplayVerdict::Divergence(Divergence::RackOutOfRange { step, rack, range });
            return Ok(finish(state, verdict, empty_transfers, stacked_transfers));
        }

        match state.stack_at(transfer.source).len() {
            0 => {
                empty_transfers += 1;
                continue;
            }
            1 => {}
            _ => stacked_transfers += 1,
        }
        state = state.apply_transfer(transfer)?;
    }

    let verdict = goal_verdict(&state, &targets, firsts);
    Ok(finish(state, verdict, empty_transfers, stacked_transfers))
}

fn goal_verdict(state: &MachineState, targets: &[Needle], firsts: &[bool]) -> ReplayVerdict {
    for (i, &needle) in targets.iter().enumerate() {
        let target = BedNeedle::front(needle);
        let actual = state.position(i);
        if actual != target {
            return ReplayVerdict::Divergence(Divergence::Unreached {
                loop_index: i,
                target,
                actual,
            });
        }
        if firsts[i] {
            let depth = state
                .stack_at(target)
                .iter()
                .position(|&j| j == i)
                .unwrap_or(0);
            if depth != 0 {
                return ReplayVerdict::Divergence(Divergence::FirstBuried {
                    loop_index: i,
                    at: target,
                    depth,
                });
            }
        }
    }
    ReplayVerdict::Match
}
