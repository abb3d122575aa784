//! Yarn slack between consecutive loops.
//!
//! Loops `i-1` and `i` are joined by yarn whose tolerable stretch is
//! `max(1, |target[i] - target[i-1]|)` with `target[i] = i + offset[i]`,
//! measured on the offsets the problem started with. On one bed the stretch
//! is `|current[i-1] - current[i]|`; across beds it is
//! `|back + rack - front|`, since back needle `n` faces front needle
//! `n + rack`.

use std::fmt;

use crate::machine::bed::{Bed, Needle};
use crate::machine::state::MachineState;

/// Stretch allowances for each adjacent loop pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlackProfile {
    /// `pairs[k]` bounds the yarn between loops `k` and `k + 1`.
    pairs: Vec<i64>,
}

/// The first adjacent pair whose yarn would be over-stretched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlackViolation {
    /// Index of the right-hand loop of the pair (`left + 1`).
    pub loop_index: usize,
    pub stretch: i64,
    pub slack: i64,
}

impl fmt::Display for SlackViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "yarn between loops {} and {} stretches {} > slack {}",
            self.loop_index - 1,
            self.loop_index,
            self.stretch,
            self.slack
        )
    }
}

/// Inclusive racking interval; either end may be unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RackRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl RackRange {
    #[must_use]
    pub fn contains(&self, rack: i32) -> bool {
        let rack = i64::from(rack);
        !matches!(self.min, Some(lo) if lo > rack) && !matches!(self.max, Some(hi) if rack > hi)
    }

    /// No racking at all is feasible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!((self.min, self.max), (Some(lo), Some(hi)) if lo > hi)
    }
}

impl fmt::Display for RackRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => write!(f, "[{lo}, {hi}]"),
            (Some(lo), None) => write!(f, "[{lo}, inf)"),
            (None, Some(hi)) => write!(f, "(-inf, {hi}]"),
            (None, None) => f.write_str("(-inf, inf)"),
        }
    }
}

impl SlackProfile {
    #[must_use]
    pub fn from_offsets(offsets: &[i32]) -> Self {
        let pairs = offsets
            .windows(2)
            .map(|w| {
                // target[i] - target[i-1] = 1 + offset[i] - offset[i-1]
                let span = 1 + i64::from(w[1]) - i64::from(w[0]);
                span.abs().max(1)
            })
            .collect();
        Self { pairs }
    }

    /// Allowance between loops `index - 1` and `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is 0 or past the last loop.
    #[must_use]
    pub fn slack_before(&self, index: usize) -> i64 {
        self.pairs[index - 1]
    }

    /// Check every adjacent pair for positions `currents`/`beds` at `rack`.
    ///
    /// # Errors
    ///
    /// Returns the lowest-indexed over-stretched pair.
    pub fn check(&self, currents: &[Needle], beds: &[Bed], rack: i32) -> Result<(), SlackViolation> {
        for (k, &slack) in self.pairs.iter().enumerate() {
            let i = k + 1;
            let stretch = stretch(currents, beds, i, rack);
            if stretch > slack {
                return Err(SlackViolation {
                    loop_index: i,
                    stretch,
                    slack,
                });
            }
        }
        Ok(())
    }

    /// [`SlackProfile::check`] applied to a machine state.
    ///
    /// # Errors
    ///
    /// As for [`SlackProfile::check`].
    pub fn check_state(&self, state: &MachineState, rack: i32) -> Result<(), SlackViolation> {
        self.check(state.currents(), state.beds(), rack)
    }

    /// Rackings under which every pair split across beds stays within slack.
    /// Unbounded when no pair is split.
    #[must_use]
    pub fn valid_rack_range(&self, currents: &[Needle], beds: &[Bed]) -> RackRange {
        let mut range = RackRange { min: None, max: None };
        for (k, &slack) in self.pairs.iter().enumerate() {
            let i = k + 1;
            if beds[i - 1] == beds[i] {
                continue;
            }
            let (back, front) = split(currents, beds, i);
            // -slack <= back + rack - front <= slack
            let lo = front - back - slack;
            let hi = front - back + slack;
            range.min = Some(range.min.map_or(lo, |m| m.max(lo)));
            range.max = Some(range.max.map_or(hi, |m| m.min(hi)));
        }
        range
    }
}

fn split(currents: &[Needle], beds: &[Bed], i: usize) -> (i64, i64) {
    let (a, b) = (i64::from(currents[i - 1]), i64::from(currents[i]));
    if beds[i] == Bed::Back {
        (b, a)
    } else {
        (a, b)
    }
}

fn stretch(currents: &[Needle], beds: &[Bed], i: usize, rack: i32) -> i64 {
    if beds[i - 1] == beds[i] {
        (i64::from(currents[i - 1]) - i64::from(currents[i])).abs()
    } else {
        let (back, front) = split(currents, beds, i);
        (back + i64::from(rack) - front).abs()
    }
}
