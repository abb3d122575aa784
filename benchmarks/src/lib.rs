//! Shared helpers for knitxfer benchmark suites.

use knitxfer_search::problem::TransferProblem;
use knitxfer_search::search::{search, SearchResult};
use knitxfer_search::SearchPolicy;

/// A named planning workload.
pub struct Regime {
    pub name: &'static str,
    pub offsets: Vec<i32>,
    pub firsts: Vec<bool>,
    pub policy: SearchPolicy,
}

impl Regime {
    /// Validated problem for this regime.
    ///
    /// # Panics
    ///
    /// Panics if the regime's offsets are rejected. Benchmark setup failures
    /// are fatal.
    #[must_use]
    pub fn problem(&self) -> TransferProblem {
        TransferProblem::new(&self.offsets, &self.firsts).expect("regime offsets are valid")
    }
}

/// `width` loops all shifted by `shift`: one offset group, wide layout.
#[must_use]
pub fn regime_uniform_shift(width: usize, shift: i32) -> Regime {
    Regime {
        name: "uniform_shift",
        offsets: vec![shift; width],
        firsts: vec![false; width],
        policy: SearchPolicy::with_max_rack(shift.unsigned_abs().max(1)),
    }
}

/// A flat band with a raised centre: three offset groups.
#[must_use]
pub fn regime_ramp() -> Regime {
    Regime {
        name: "ramp",
        offsets: vec![0, 0, 1, 1, 2, 2, 2, 2],
        firsts: vec![false; 8],
        policy: SearchPolicy::with_max_rack(3),
    }
}

/// Decreases that stack neighbours onto each other.
#[must_use]
pub fn regime_lace() -> Regime {
    Regime {
        name: "lace",
        offsets: vec![0, -1, 0, 0, 1, 0],
        firsts: vec![false; 6],
        policy: SearchPolicy::with_max_rack(2),
    }
}

/// Stacking decreases where the moving loop must land first.
#[must_use]
pub fn regime_firsts() -> Regime {
    Regime {
        name: "firsts",
        offsets: vec![0, -1, 0, 0, 1, 0],
        firsts: vec![false, true, false, false, true, false],
        policy: SearchPolicy::with_max_rack(2),
    }
}

/// A problem large enough that the expansion budget runs out.
#[must_use]
pub fn regime_budget_limited() -> Regime {
    Regime {
        name: "budget_limited",
        offsets: vec![1, 2, 3, 4, 5, 6],
        firsts: vec![false; 6],
        policy: SearchPolicy {
            max_expansions: 200,
            ..SearchPolicy::with_max_rack(6)
        },
    }
}

/// Every regime, in a fixed order.
#[must_use]
pub fn all_regimes() -> Vec<Regime> {
    vec![
        regime_uniform_shift(16, 2),
        regime_ramp(),
        regime_lace(),
        regime_firsts(),
        regime_budget_limited(),
    ]
}

/// Run only the search for `problem`, skipping plan extraction.
///
/// # Panics
///
/// Panics if the search reports an error.
#[must_use]
pub fn run_search_only(problem: &TransferProblem, policy: &SearchPolicy) -> SearchResult {
    search(problem, policy).expect("search")
}
