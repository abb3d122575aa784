//! Search policy types.

use crate::error::PreconditionError;

/// Runtime search knobs.
///
/// `max_rack` is the machine's physical racking limit; candidate moves use
/// every racking in `-max_rack..=max_rack`. The two budgets bound work and
/// memory on inputs whose frontier grows without a quick proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPolicy {
    pub max_rack: u32,
    /// Hard cap on state expansions.
    pub max_expansions: u64,
    /// Hard cap on queued states.
    pub max_frontier_size: u64,
}

impl SearchPolicy {
    /// Policy with a specific racking limit and default budgets.
    #[must_use]
    pub fn with_max_rack(max_rack: u32) -> Self {
        Self {
            max_rack,
            ..Self::default()
        }
    }

    /// Reject policies that could never search.
    ///
    /// # Errors
    ///
    /// Returns [`PreconditionError::InvalidMaxRack`] for `max_rack == 0`, or
    /// [`PreconditionError::InvalidBudget`] for a zero budget.
    pub fn validate(&self) -> Result<(), PreconditionError> {
        if self.max_rack == 0 || i32::try_from(self.max_rack).is_err() {
            return Err(PreconditionError::InvalidMaxRack {
                max_rack: self.max_rack,
            });
        }
        if self.max_expansions == 0 {
            return Err(PreconditionError::InvalidBudget {
                detail: "max_expansions must be positive".into(),
            });
        }
        if self.max_frontier_size == 0 {
            return Err(PreconditionError::InvalidBudget {
                detail: "max_frontier_size must be positive".into(),
            });
        }
        Ok(())
    }

    /// Candidate rackings, most negative first.
    pub(crate) fn racks(&self) -> std::ops::RangeInclusive<i32> {
        // validate() guarantees the limit fits in i32.
        let r = i32::try_from(self.max_rack).unwrap_or(i32::MAX);
        -r..=r
    }
}

impl Default for SearchPolicy {
    fn default() -> Self {
        Self {
            max_rack: 8,
            max_expansions: 500_000,
            max_frontier_size: 2_000_000,
        }
    }
}
