//! `MachineState`: loop positions, remaining offsets and needle stacks.
//!
//! # Representation
//!
//! Per loop `i` the state keeps its current needle, its bed and its remaining
//! offset (`target - current`). The layout maps every occupied `(bed, needle)`
//! to the loops resting there in arrival order: index 0 arrived first, the
//! last element arrived most recently.
//!
//! # Invariants
//!
//! - Every loop index appears in exactly one layout entry, and that entry is
//!   the one named by its `(bed, current)` pair.
//! - Layout entries are never empty; a needle that loses its loops is removed,
//!   so two states with the same placement compare equal structurally.
//! - `history` replayed from [`MachineState::initial`] reproduces the state.
//!
//! States are values. Applying a transfer returns a fresh state and leaves
//! the receiver untouched.

use std::collections::BTreeMap;
use std::fmt;

use crate::machine::bed::{Bed, BedNeedle, Needle};
use crate::machine::transfer::Transfer;

/// Occupied needles and the loops stacked on each, in arrival order.
pub type Layout = BTreeMap<BedNeedle, Vec<usize>>;

/// Needle a loop starts on: loop `i` starts on front needle `i`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn home_needle(index: usize) -> Needle {
    index as Needle
}

/// Typed failure for state transitions. Fail-closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// A loop index outside `0..loop_count`.
    UnknownLoop { index: usize, loop_count: usize },
    /// The transfer source holds no loops.
    EmptySource { at: BedNeedle },
    /// Source and destination are on the same bed.
    SameBed { transfer: Transfer },
    /// The layout disagrees with per-loop positions.
    Inconsistent { detail: String },
    /// A needle, racking or offset would leave the `i32` range.
    Overflow { index: usize },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLoop { index, loop_count } => {
                write!(f, "loop {index} out of range for {loop_count} loops")
            }
            Self::EmptySource { at } => write!(f, "no loops to transfer on {at}"),
            Self::SameBed { transfer } => {
                write!(f, "transfer {transfer} does not change beds")
            }
            Self::Inconsistent { detail } => write!(f, "inconsistent machine state: {detail}"),
            Self::Overflow { index } => {
                write!(f, "moving loop {index} overflows the needle or offset range")
            }
        }
    }
}

impl std::error::Error for StateError {}

/// Full machine configuration plus the transfers that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    currents: Vec<Needle>,
    offsets: Vec<i32>,
    beds: Vec<Bed>,
    layout: Layout,
    rack: i32,
    history: Vec<Transfer>,
}

impl MachineState {
    /// All loops on the front bed at their home needles, racked at 0.
    #[must_use]
    pub fn initial(offsets: &[i32]) -> Self {
        let n = offsets.len();
        let currents: Vec<Needle> = (0..n).map(home_needle).collect();
        let layout: Layout = currents
            .iter()
            .enumerate()
            .map(|(i, &needle)| (BedNeedle::front(needle), vec![i]))
            .collect();
        Self {
            currents,
            offsets: offsets.to_vec(),
            beds: vec![Bed::Front; n],
            layout,
            rack: 0,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.currents.len()
    }

    #[must_use]
    pub fn currents(&self) -> &[Needle] {
        &self.currents
    }

    #[must_use]
    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    #[must_use]
    pub fn beds(&self) -> &[Bed] {
        &self.beds
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Racking in effect after the most recent transfer (0 initially).
    #[must_use]
    pub fn rack(&self) -> i32 {
        self.rack
    }

    /// Transfers applied so far, in order.
    #[must_use]
    pub fn history(&self) -> &[Transfer] {
        &self.history
    }

    /// Where loop `index` currently rests.
    ///
    /// # Panics
    ///
    /// Panics if `index >= loop_count()`.
    #[must_use]
    pub fn position(&self, index: usize) -> BedNeedle {
        BedNeedle::new(self.beds[index], self.currents[index])
    }

    /// Loops stacked on `at`, first arrival first. Empty for a bare needle.
    #[must_use]
    pub fn stack_at(&self, at: BedNeedle) -> &[usize] {
        self.layout.get(&at).map_or(&[], Vec::as_slice)
    }

    /// Sum of absolute remaining offsets. Zero exactly when every loop sits
    /// on its target needle.
    #[must_use]
    pub fn penalty(&self) -> u64 {
        self.offsets.iter().map(|o| u64::from(o.unsigned_abs())).sum()
    }

    #[must_use]
    pub fn all_on_front(&self) -> bool {
        self.beds.iter().all(|&b| b == Bed::Front)
    }

    /// The transfer that carries loop `index` (and its stack) to the opposite
    /// bed at racking `rack`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownLoop`] for an out-of-range index, or
    /// [`StateError::Overflow`] if the destination needle is unrepresentable.
    pub fn transfer_for_move(&self, index: usize, rack: i32) -> Result<Transfer, StateError> {
        if index >= self.loop_count() {
            return Err(StateError::UnknownLoop {
                index,
                loop_count: self.loop_count(),
            });
        }
        let source = self.position(index);
        // Back needle n faces front needle n + rack.
        let destination = match source.bed {
            Bed::Front => source.needle.checked_sub(rack).map(BedNeedle::back),
            Bed::Back => source.needle.checked_add(rack).map(BedNeedle::front),
        }
        .ok_or(StateError::Overflow { index })?;
        Ok(Transfer::new(source, destination))
    }

    /// Move loop `index`, together with every loop stacked with it, to the
    /// opposite bed at racking `rack`.
    ///
    /// # Errors
    ///
    /// See [`MachineState::apply_transfer`].
    pub fn apply_move(&self, index: usize, rack: i32) -> Result<Self, StateError> {
        let transfer = self.transfer_for_move(index, rack)?;
        self.apply_transfer(transfer)
    }

    /// Apply one transfer and return the resulting state.
    ///
    /// The source stack is lifted in reverse order and deposited after any
    /// loops already on the destination, so a carried stack arrives reversed.
    ///
    /// # Errors
    ///
    /// - [`StateError::SameBed`] if the transfer does not change beds.
    /// - [`StateError::EmptySource`] if nothing rests on the source needle.
    /// - [`StateError::Overflow`] if the racking or a carried offset
    ///   overflows.
    pub fn apply_transfer(&self, transfer: Transfer) -> Result<Self, StateError> {
        if !transfer.is_cross_bed() {
            return Err(StateError::SameBed { transfer });
        }
        let mut next = self.clone();
        let overflow = |index| StateError::Overflow { index };
        let carried = next
            .layout
            .remove(&transfer.source)
            .filter(|stack| !stack.is_empty())
            .ok_or(StateError::EmptySource {
                at: transfer.source,
            })?;

        if !transfer.in_range() {
            return Err(overflow(carried[0]));
        }
        let shift = transfer.shift();
        let landing = next.layout.entry(transfer.destination).or_default();
        for &i in carried.iter().rev() {
            landing.push(i);
            next.currents[i] = transfer.destination.needle;
            next.beds[i] = transfer.destination.bed;
            next.offsets[i] = next.offsets[i].checked_sub(shift).ok_or(overflow(i))?;
        }
        next.rack = transfer.rack();
        next.history.push(transfer);
        Ok(next)
    }

    /// Verify the layout/position invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Inconsistent`] naming the first mismatch.
    pub fn check_consistency(&self) -> Result<(), StateError> {
        let mut seen = vec![false; self.loop_count()];
        for (&at, stack) in &self.layout {
            if stack.is_empty() {
                return Err(StateError::Inconsistent {
                    detail: format!("empty layout entry at {at}"),
                });
            }
            for &i in stack {
                if i >= seen.len() || seen[i] {
                    return Err(StateError::Inconsistent {
                        detail: format!("loop {i} listed twice or out of range at {at}"),
                    });
                }
                seen[i] = true;
                if self.position(i) != at {
                    return Err(StateError::Inconsistent {
                        detail: format!("loop {i} is at {} but listed at {at}", self.position(i)),
                    });
                }
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(StateError::Inconsistent {
                detail: format!("loop {missing} missing from layout"),
            });
        }
        Ok(())
    }
}
