//! Validated, immutable problem configuration.
//!
//! Built once per invocation by [`TransferProblem::new`], which runs every
//! precondition check. All search functions take it by reference.

use std::collections::BTreeMap;

use knitxfer_kernel::machine::bed::Needle;
use knitxfer_kernel::machine::slack::SlackProfile;
use knitxfer_kernel::machine::state::{home_needle, MachineState};

use crate::error::PreconditionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferProblem {
    offsets: Vec<i32>,
    targets: Vec<Needle>,
    /// Flags that survived validation: only firsts that share their target
    /// with another loop constrain anything.
    firsts: Vec<bool>,
    firsts_active: bool,
    slack: SlackProfile,
}

impl TransferProblem {
    /// Validate `offsets`/`firsts` and build the problem.
    ///
    /// Loop `i` starts on front needle `i` and must finish on front needle
    /// `i + offsets[i]`. A loop flagged in `firsts` must be the first to
    /// arrive on that needle.
    ///
    /// # Errors
    ///
    /// - [`PreconditionError::LengthMismatch`] if the slices differ in length.
    /// - [`PreconditionError::OffsetOutOfRange`] if a target overflows.
    /// - [`PreconditionError::CablePattern`] if targets are not monotonic.
    /// - [`PreconditionError::SharedFirstTarget`] if two firsts share a target.
    pub fn new(offsets: &[i32], firsts: &[bool]) -> Result<Self, PreconditionError> {
        if offsets.len() != firsts.len() {
            return Err(PreconditionError::LengthMismatch {
                offsets: offsets.len(),
                firsts: firsts.len(),
            });
        }
        let targets = offsets
            .iter()
            .enumerate()
            .map(|(index, &offset)| {
                home_needle(index)
                    .checked_add(offset)
                    .ok_or(PreconditionError::OffsetOutOfRange { index, offset })
            })
            .collect::<Result<Vec<Needle>, _>>()?;

        check_monotonic(&targets)?;

        let mut by_target: BTreeMap<Needle, Vec<usize>> = BTreeMap::new();
        for (i, &t) in targets.iter().enumerate() {
            by_target.entry(t).or_default().push(i);
        }
        let mut effective = vec![false; offsets.len()];
        for group in by_target.values() {
            let flagged: Vec<usize> = group.iter().copied().filter(|&i| firsts[i]).collect();
            if let [first, second, ..] = flagged[..] {
                return Err(PreconditionError::SharedFirstTarget { first, second });
            }
            if group.len() > 1 {
                for &i in &flagged {
                    effective[i] = true;
                }
            }
        }
        let firsts_active = effective.iter().any(|&f| f);

        Ok(Self {
            offsets: offsets.to_vec(),
            targets,
            firsts: effective,
            firsts_active,
            slack: SlackProfile::from_offsets(offsets),
        })
    }

    #[must_use]
    pub fn loop_count(&self) -> usize {
        self.offsets.len()
    }

    /// Offsets as given, before any transfer.
    #[must_use]
    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    #[must_use]
    pub fn targets(&self) -> &[Needle] {
        &self.targets
    }

    /// Front needle loop `index` must finish on.
    ///
    /// # Panics
    ///
    /// Panics if `index >= loop_count()`.
    #[must_use]
    pub fn target(&self, index: usize) -> Needle {
        self.targets[index]
    }

    /// Whether loop `index` carries an active first constraint.
    #[must_use]
    pub fn is_first(&self, index: usize) -> bool {
        self.firsts[index]
    }

    #[must_use]
    pub fn firsts(&self) -> &[bool] {
        &self.firsts
    }

    #[must_use]
    pub fn firsts_active(&self) -> bool {
        self.firsts_active
    }

    #[must_use]
    pub fn slack(&self) -> &SlackProfile {
        &self.slack
    }

    /// Nothing to move and no ordering to enforce: the empty plan is optimal.
    #[must_use]
    pub fn is_trivial(&self) -> bool {
        !self.firsts_active && self.offsets.iter().all(|&o| o == 0)
    }

    #[must_use]
    pub fn initial_state(&self) -> MachineState {
        MachineState::initial(&self.offsets)
    }
}

fn check_monotonic(targets: &[Needle]) -> Result<(), PreconditionError> {
    let mut up = true;
    let mut down = true;
    for (i, pair) in targets.windows(2).enumerate() {
        up &= pair[0] <= pair[1];
        down &= pair[0] >= pair[1];
        if !up && !down {
            return Err(PreconditionError::CablePattern { index: i + 1 });
        }
    }
    Ok(())
}
