//! Planner scenario lock tests: fixed inputs with known outcomes, the
//! stacking invariant along solution paths, rejection of bad inputs, and
//! in-process determinism.

use knitxfer_kernel::machine::state::MachineState;
use knitxfer_kernel::machine::transfer::Transfer;
use knitxfer_search::error::PreconditionError;
use knitxfer_search::problem::TransferProblem;
use knitxfer_search::stats::TerminationReason;
use knitxfer_search::{plan_transfers, plan_with_policy, PlanError, SearchPolicy};

fn policy() -> SearchPolicy {
    SearchPolicy::with_max_rack(3)
}

/// States visited when `transfers` are applied one at a time.
fn path_states(problem: &TransferProblem, plan: &[Transfer]) -> Vec<MachineState> {
    let mut states = vec![problem.initial_state()];
    for &t in plan {
        let next = states
            .last()
            .unwrap()
            .apply_transfer(t)
            .unwrap_or_else(|e| panic!("transfer {t} failed: {e}"));
        states.push(next);
    }
    states
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: fixed scenarios
// ---------------------------------------------------------------------------

#[test]
fn all_zero_offsets_return_empty_plan() {
    let plan = plan_with_policy(&[0; 5], &[false; 5], &policy()).unwrap();
    assert!(plan.transfers.is_empty());
    assert_eq!(plan.passes, 0);
    assert_eq!(plan.stats.termination, TerminationReason::Trivial);
    assert_eq!(plan.stats.expansions, 0);
}

#[test]
fn single_offset_group_needs_two_passes() {
    let plan = plan_with_policy(&[0, 0, 1, 1, 0, 0, 0], &[false; 7], &policy()).unwrap();
    assert_eq!(plan.passes, 2);
    assert_eq!(plan.lower_bound, 2);
    assert_eq!(plan.stats.termination, TerminationReason::LowerBoundReached);
    // Only the two moving loops are transferred, out and back.
    assert_eq!(plan.transfers.len(), 4);
}

#[test]
fn crossing_targets_are_rejected_before_search() {
    // Targets 0, 3, 2.
    let err = plan_transfers(&[0, 2, 0], &[false; 3]).unwrap_err();
    assert_eq!(
        err,
        PlanError::Precondition(PreconditionError::CablePattern { index: 2 })
    );
}

#[test]
fn stacking_targets_are_not_crossings() {
    // Targets 0, 3, 3: loop 2 stacks onto loop 1.
    let plan = plan_with_policy(&[0, 2, 1], &[false; 3], &policy()).unwrap();
    assert!(plan.passes >= 2);
}

#[test]
fn mismatched_lengths_are_rejected() {
    let err = plan_transfers(&[0, 1], &[false]).unwrap_err();
    assert_eq!(
        err,
        PlanError::Precondition(PreconditionError::LengthMismatch {
            offsets: 2,
            firsts: 1
        })
    );
}

#[test]
fn two_firsts_on_one_target_are_rejected() {
    // Targets 1, 1.
    let err = plan_transfers(&[1, 0], &[true, true]).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Precondition(PreconditionError::SharedFirstTarget { .. })
    ));
}

#[test]
fn narrow_racking_is_rejected_by_policy() {
    let err = plan_with_policy(&[0, 1], &[false; 2], &SearchPolicy::with_max_rack(0)).unwrap_err();
    assert!(matches!(
        err,
        PlanError::Precondition(PreconditionError::InvalidMaxRack { max_rack: 0 })
    ));
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: stacking invariant on the solution path
// ---------------------------------------------------------------------------

#[test]
fn stacks_on_solution_path_share_a_target() {
    let inputs: &[(&[i32], &[bool])] = &[
        (&[0, -1, 0], &[false; 3]),
        (&[1, 0, -1], &[false; 3]),
        (&[1, 0], &[true, false]),
        (&[0, 1, 1, 2, 2], &[false; 5]),
    ];
    for &(offsets, firsts) in inputs {
        let problem = TransferProblem::new(offsets, firsts).unwrap();
        let plan = plan_with_policy(offsets, firsts, &policy()).unwrap();
        for state in path_states(&problem, &plan.transfers) {
            for stack in state.layout().values() {
                let target = problem.target(stack[0]);
                assert!(
                    stack.iter().all(|&i| problem.target(i) == target),
                    "{offsets:?}: mixed stack {stack:?}"
                );
            }
            state.check_consistency().unwrap();
        }
    }
}

#[test]
fn firsts_land_before_their_stackmates() {
    let problem = TransferProblem::new(&[0, -1, 0], &[false, true, false]).unwrap();
    let plan = plan_with_policy(&[0, -1, 0], &[false, true, false], &policy()).unwrap();
    let last = path_states(&problem, &plan.transfers).pop().unwrap();
    let stack = last.stack_at(last.position(1));
    assert_eq!(stack, &[1, 0]);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: in-process determinism
// ---------------------------------------------------------------------------

#[test]
fn plan_is_deterministic_n10() {
    let offsets = [0, 1, 1, 2, 2, 2];
    let firsts = [false; 6];
    let first = plan_with_policy(&offsets, &firsts, &policy()).unwrap();
    for _ in 1..10 {
        let other = plan_with_policy(&offsets, &firsts, &policy()).unwrap();
        assert_eq!(first.digest(), other.digest(), "plan digest differs across runs");
        assert_eq!(first.stats, other.stats);
    }
}

#[test]
fn stats_json_reports_termination() {
    let plan = plan_with_policy(&[0, 1, 0], &[false; 3], &policy()).unwrap();
    let json = plan.stats.to_json();
    assert_eq!(
        json["termination"].as_str(),
        Some(plan.stats.termination.as_str())
    );
    assert_eq!(json["expansions"].as_u64(), Some(plan.stats.expansions));
}

#[test]
fn stats_json_reads_back_as_logged() {
    let plan = plan_with_policy(&[0, 0, 1, 1, 0, 0, 0], &[false; 7], &policy()).unwrap();
    let stats = &plan.stats;
    let parsed: serde_json::Value = serde_json::from_str(&stats.to_json().to_string()).unwrap();
    assert_eq!(
        parsed,
        serde_json::json!({
            "children_generated": stats.children_generated,
            "children_pruned_by_bound": stats.children_pruned_by_bound,
            "dominated_pops": stats.dominated_pops,
            "duplicates_suppressed": stats.duplicates_suppressed,
            "expansions": stats.expansions,
            "frontier_high_water": stats.frontier_high_water,
            "solutions_found": stats.solutions_found,
            "termination": "lower_bound_reached",
        })
    );
}
