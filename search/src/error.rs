//! Typed planning errors.
//!
//! `PreconditionError` covers pre-flight failures: nothing is searched when
//! one is returned. `PlanError` adds the runtime outcomes that end a search
//! without a plan.

use std::fmt;

/// Rejected problem or policy, detected before search starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// `offsets` and `firsts` disagree in length.
    LengthMismatch { offsets: usize, firsts: usize },
    /// Targets `i + offset[i]` are neither non-decreasing nor non-increasing.
    /// `index` is the first loop that breaks both orders.
    CablePattern { index: usize },
    /// Two loops flagged first share one target needle.
    SharedFirstTarget { first: usize, second: usize },
    /// `i + offset[i]` does not fit the needle range.
    OffsetOutOfRange { index: usize, offset: i32 },
    /// `max_rack` must be at least 1.
    InvalidMaxRack { max_rack: u32 },
    /// A search budget was zero.
    InvalidBudget { detail: String },
}

impl fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch { offsets, firsts } => write!(
                f,
                "{offsets} offsets but {firsts} firsts flags; lengths must agree"
            ),
            Self::CablePattern { index } => write!(
                f,
                "targets are not monotonic at loop {index}; cable patterns are unsupported"
            ),
            Self::SharedFirstTarget { first, second } => write!(
                f,
                "loops {first} and {second} are both flagged first but share a target"
            ),
            Self::OffsetOutOfRange { index, offset } => {
                write!(f, "offset {offset} of loop {index} overflows the needle range")
            }
            Self::InvalidMaxRack { max_rack } => {
                write!(f, "max_rack must be at least 1, got {max_rack}")
            }
            Self::InvalidBudget { detail } => write!(f, "invalid search budget: {detail}"),
        }
    }
}

impl std::error::Error for PreconditionError {}

/// Which configured bound stopped the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceLimit {
    Expansions(u64),
    FrontierSize(u64),
}

impl fmt::Display for ResourceLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expansions(n) => write!(f, "max_expansions = {n}"),
            Self::FrontierSize(n) => write!(f, "max_frontier_size = {n}"),
        }
    }
}

/// Why no plan was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    Precondition(PreconditionError),
    /// Move generation produced an impossible state. Always a bug.
    InvariantViolation { detail: String },
    /// The reachable space was exhausted without meeting the goal.
    NoSolution { expansions: u64 },
    /// A configured bound was hit before an optimal plan was proven.
    ResourceExhausted { limit: ResourceLimit, expansions: u64 },
    /// The caller's cancel flag was raised.
    Cancelled { expansions: u64 },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition(e) => write!(f, "precondition violated: {e}"),
            Self::InvariantViolation { detail } => {
                write!(f, "internal invariant violated: {detail}")
            }
            Self::NoSolution { expansions } => {
                write!(f, "no transfer plan exists (searched {expansions} states)")
            }
            Self::ResourceExhausted { limit, expansions } => write!(
                f,
                "search stopped at {limit} after {expansions} expansions"
            ),
            Self::Cancelled { expansions } => {
                write!(f, "search cancelled after {expansions} expansions")
            }
        }
    }
}

impl std::error::Error for PlanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Precondition(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PreconditionError> for PlanError {
    fn from(e: PreconditionError) -> Self {
        Self::Precondition(e)
    }
}
