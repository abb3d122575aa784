//! Planning entry points: validate, search, extract the transfer list.

use std::sync::atomic::AtomicBool;

use knitxfer_kernel::machine::codec::render_xfers;
use knitxfer_kernel::machine::transfer::Transfer;
use knitxfer_kernel::proof::hash::{canonical_hash, ContentHash, DOMAIN_TRANSFER_PLAN};

use crate::error::{PlanError, ResourceLimit};
use crate::policy::SearchPolicy;
use crate::problem::TransferProblem;
use crate::search::search_with_cancel;
use crate::stats::{SearchStats, TerminationReason};

/// A minimum-pass transfer plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    /// Transfers in application order.
    pub transfers: Vec<Transfer>,
    pub passes: u32,
    /// Lower bound the plan was checked against; never above `passes`.
    pub lower_bound: u32,
    pub stats: SearchStats,
}

impl TransferPlan {
    /// The plan in `.xfers` text form.
    #[must_use]
    pub fn to_xfers(&self) -> String {
        render_xfers(&self.transfers)
    }

    /// Content hash of [`TransferPlan::to_xfers`].
    #[must_use]
    pub fn digest(&self) -> ContentHash {
        canonical_hash(DOMAIN_TRANSFER_PLAN, self.to_xfers().as_bytes())
    }
}

/// Plan with the default policy and return only the transfers.
///
/// # Errors
///
/// See [`plan_with_cancel`].
pub fn plan_transfers(offsets: &[i32], firsts: &[bool]) -> Result<Vec<Transfer>, PlanError> {
    plan_with_policy(offsets, firsts, &SearchPolicy::default()).map(|p| p.transfers)
}

/// Plan under `policy`.
///
/// # Errors
///
/// See [`plan_with_cancel`].
pub fn plan_with_policy(
    offsets: &[i32],
    firsts: &[bool],
    policy: &SearchPolicy,
) -> Result<TransferPlan, PlanError> {
    plan_with_cancel(offsets, firsts, policy, None)
}

/// Plan under `policy`, stopping early if `cancel` is raised.
///
/// # Errors
///
/// - [`PlanError::Precondition`] for rejected inputs or policy.
/// - [`PlanError::NoSolution`] if no plan exists within `max_rack`.
/// - [`PlanError::ResourceExhausted`] if a budget ran out first.
/// - [`PlanError::Cancelled`] if `cancel` was raised.
/// - [`PlanError::InvariantViolation`] on an internal bug.
pub fn plan_with_cancel(
    offsets: &[i32],
    firsts: &[bool],
    policy: &SearchPolicy,
    cancel: Option<&AtomicBool>,
) -> Result<TransferPlan, PlanError> {
    let problem = TransferProblem::new(offsets, firsts)?;
    let result = search_with_cancel(&problem, policy, cancel)?;
    let expansions = result.stats.expansions;

    let Some(node) = result.solution else {
        return Err(match result.stats.termination {
            TerminationReason::FrontierExhausted => PlanError::NoSolution { expansions },
            TerminationReason::ExpansionBudgetExceeded => PlanError::ResourceExhausted {
                limit: ResourceLimit::Expansions(policy.max_expansions),
                expansions,
            },
            TerminationReason::FrontierBudgetExceeded => PlanError::ResourceExhausted {
                limit: ResourceLimit::FrontierSize(policy.max_frontier_size),
                expansions,
            },
            TerminationReason::Cancelled => PlanError::Cancelled { expansions },
            other => PlanError::InvariantViolation {
                detail: format!("search ended with {other} but no plan"),
            },
        });
    };

    Ok(TransferPlan {
        passes: node.passes(),
        transfers: node.state.history().to_vec(),
        lower_bound: result.lower_bound,
        stats: result.stats,
    })
}
