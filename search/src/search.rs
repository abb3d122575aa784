//! Search entry point and expansion loop.
//!
//! Best-first branch and bound. The frontier is ordered by
//! `passes + est_passes` with an admissible estimate, so the first goal
//! popped is optimal. Goals are also recognised when generated: they set the
//! incumbent pass count that prunes children, and one that meets the
//! precomputed lower bound ends the search at once.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};

use knitxfer_kernel::machine::bed::BedNeedle;
use knitxfer_kernel::machine::state::{MachineState, StateError};

use crate::cost::{initial_lower_bound, lower_bound_from_here, PassTracker};
use crate::error::PlanError;
use crate::frontier::BestFirstFrontier;
use crate::legality::{check_move, MoveRejection};
use crate::node::SearchNode;
use crate::policy::SearchPolicy;
use crate::problem::TransferProblem;
use crate::stats::{SearchStats, TerminationReason};

/// Result of a search execution.
///
/// Runtime terminations (budgets, cancellation, exhaustion) are reported
/// through `stats.termination`; only a proven plan fills `solution`.
#[derive(Debug)]
pub struct SearchResult {
    /// The goal node reached, if any.
    pub solution: Option<SearchNode>,
    /// Bound the search compared plans against.
    pub lower_bound: u32,
    pub stats: SearchStats,
}

/// Goal test: every loop on its target front needle and every active first
/// the first-arrived entry of its stack.
#[must_use]
pub fn is_goal(problem: &TransferProblem, state: &MachineState) -> bool {
    if state.penalty() != 0 || !state.all_on_front() {
        return false;
    }
    !problem.firsts_active()
        || (0..problem.loop_count()).all(|i| {
            !problem.is_first(i) || state.stack_at(state.position(i)).first() == Some(&i)
        })
}

/// Run the search without a cancel flag.
///
/// # Errors
///
/// See [`search_with_cancel`].
pub fn search(problem: &TransferProblem, policy: &SearchPolicy) -> Result<SearchResult, PlanError> {
    search_with_cancel(problem, policy, None)
}

/// Run best-first search from the initial layout.
///
/// `cancel` is polled once per frontier pop.
///
/// # Errors
///
/// - [`PlanError::Precondition`] if `policy` fails validation.
/// - [`PlanError::InvariantViolation`] if move generation breaks the machine
///   model.
#[allow(clippy::too_many_lines)]
pub fn search_with_cancel(
    problem: &TransferProblem,
    policy: &SearchPolicy,
    cancel: Option<&AtomicBool>,
) -> Result<SearchResult, PlanError> {
    policy.validate()?;

    let root_state = problem.initial_state();
    let root = SearchNode {
        penalty: root_state.penalty(),
        est_passes: lower_bound_from_here(problem, &root_state, None),
        state: root_state,
        tracker: PassTracker::default(),
        creation_order: 0,
    };

    if problem.is_trivial() {
        debug!(
            "no transfers needed for {} loops; skipping search",
            problem.loop_count()
        );
        return Ok(SearchResult {
            solution: Some(root),
            lower_bound: 0,
            stats: SearchStats::new(TerminationReason::Trivial),
        });
    }

    let lower_bound = initial_lower_bound(problem);
    debug!(
        "searching {} loops: lower bound {} passes, penalty {}, max_rack {}",
        problem.loop_count(),
        lower_bound,
        root.penalty,
        policy.max_rack
    );

    let mut frontier = BestFirstFrontier::new();
    let mut stats = SearchStats::new(TerminationReason::FrontierExhausted);
    let mut solution: Option<SearchNode> = None;
    let mut incumbent: Option<u32> = None;
    let mut next_creation_order: u64 = 1;
    frontier.push(root);

    let termination = 'search: loop {
        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            break TerminationReason::Cancelled;
        }
        if stats.expansions >= policy.max_expansions {
            break TerminationReason::ExpansionBudgetExceeded;
        }
        let Some(current) = frontier.pop() else {
            break TerminationReason::FrontierExhausted;
        };

        if !frontier.mark_expanded(&current.signature()) {
            stats.dominated_pops += 1;
            continue;
        }
        if is_goal(problem, &current.state) {
            let reason = if current.passes() == lower_bound {
                TerminationReason::LowerBoundReached
            } else {
                TerminationReason::FrontierBoundReached
            };
            solution = Some(current);
            break reason;
        }
        if incumbent.is_some_and(|ub| current.passes() > ub) {
            stats.dominated_pops += 1;
            continue;
        }

        stats.expansions += 1;
        for index in 0..problem.loop_count() {
            // Stack-mates generate identical moves; let the lowest index lead.
            let at = current.state.position(index);
            if current.state.stack_at(at).iter().min() != Some(&index) {
                continue;
            }
            for rack in policy.racks() {
                let child_state = match check_move(problem, &current.state, index, rack) {
                    Ok(next) => next,
                    // Unrepresentable needles or offsets: not a move.
                    Err(MoveRejection::Machine(StateError::Overflow { .. })) => continue,
                    Err(MoveRejection::Machine(e)) => {
                        return Err(PlanError::InvariantViolation {
                            detail: e.to_string(),
                        })
                    }
                    Err(_) => continue,
                };
                let child = make_child(problem, &current, child_state, next_creation_order, at)?;
                next_creation_order += 1;
                stats.children_generated += 1;

                if incumbent.is_some_and(|ub| child.f_cost() > ub) {
                    stats.children_pruned_by_bound += 1;
                    continue;
                }
                if is_goal(problem, &child.state) {
                    stats.solutions_found += 1;
                    let passes = child.passes();
                    debug!("candidate plan: {passes} passes");
                    if !incumbent.is_some_and(|ub| ub <= passes) {
                        incumbent = Some(passes);
                    }
                    if passes == lower_bound {
                        solution = Some(child);
                        break 'search TerminationReason::LowerBoundReached;
                    }
                }
                if !frontier.push(child) {
                    stats.duplicates_suppressed += 1;
                    continue;
                }
                if frontier.len() as u64 > policy.max_frontier_size {
                    break 'search TerminationReason::FrontierBudgetExceeded;
                }
            }
        }
    };

    stats.termination = termination;
    stats.frontier_high_water = frontier.high_water();

    match termination {
        TerminationReason::ExpansionBudgetExceeded
        | TerminationReason::FrontierBudgetExceeded
        | TerminationReason::Cancelled => warn!(
            "search stopped ({termination}) after {} expansions, frontier {}",
            stats.expansions,
            frontier.len()
        ),
        _ => {}
    }
    info!(
        "search finished ({termination}): {} passes, {} expansions, {} children, {} duplicates, {} dominated",
        solution
            .as_ref()
            .map_or_else(|| "no".to_string(), |s| s.passes().to_string()),
        stats.expansions,
        stats.children_generated,
        stats.duplicates_suppressed,
        stats.dominated_pops
    );

    Ok(SearchResult {
        solution,
        lower_bound,
        stats,
    })
}

fn make_child(
    problem: &TransferProblem,
    parent: &SearchNode,
    state: MachineState,
    creation_order: u64,
    from: BedNeedle,
) -> Result<SearchNode, PlanError> {
    let transfer = state
        .history()
        .last()
        .copied()
        .filter(|t| t.source == from)
        .ok_or_else(|| PlanError::InvariantViolation {
            detail: format!("child of a move from {from} does not end with that transfer"),
        })?;
    if cfg!(debug_assertions) {
        state
            .check_consistency()
            .map_err(|e| PlanError::InvariantViolation {
                detail: e.to_string(),
            })?;
    }
    let tracker = parent.tracker.advance(&transfer);
    Ok(SearchNode {
        penalty: state.penalty(),
        est_passes: lower_bound_from_here(problem, &state, tracker.context()),
        state,
        tracker,
        creation_order,
    })
}
