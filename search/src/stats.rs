//! Search counters and termination reasons.

/// Why the search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Nothing to move; the search never ran.
    Trivial,
    /// A plan met the precomputed lower bound.
    LowerBoundReached,
    /// A goal was popped: no queued node can beat it.
    FrontierBoundReached,
    /// The frontier emptied without a goal.
    FrontierExhausted,
    /// `max_expansions` budget was hit.
    ExpansionBudgetExceeded,
    /// `max_frontier_size` budget was hit.
    FrontierBudgetExceeded,
    /// The caller raised the cancel flag.
    Cancelled,
}

impl TerminationReason {
    /// Whether the search proved its plan optimal.
    #[must_use]
    pub fn is_optimal(self) -> bool {
        matches!(
            self,
            Self::Trivial | Self::LowerBoundReached | Self::FrontierBoundReached
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trivial => "trivial",
            Self::LowerBoundReached => "lower_bound_reached",
            Self::FrontierBoundReached => "frontier_bound_reached",
            Self::FrontierExhausted => "frontier_exhausted",
            Self::ExpansionBudgetExceeded => "expansion_budget_exceeded",
            Self::FrontierBudgetExceeded => "frontier_budget_exceeded",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected over one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped and expanded.
    pub expansions: u64,
    /// Legal children built.
    pub children_generated: u64,
    /// Children dropped because `passes + est_passes` exceeded the incumbent.
    pub children_pruned_by_bound: u64,
    /// Children not queued: duplicate or dominated signature.
    pub duplicates_suppressed: u64,
    /// Popped nodes discarded as dominated or over the incumbent.
    pub dominated_pops: u64,
    /// Goal states discovered.
    pub solutions_found: u64,
    pub frontier_high_water: u64,
    pub termination: TerminationReason,
}

impl SearchStats {
    #[must_use]
    pub fn new(termination: TerminationReason) -> Self {
        Self {
            expansions: 0,
            children_generated: 0,
            children_pruned_by_bound: 0,
            duplicates_suppressed: 0,
            dominated_pops: 0,
            solutions_found: 0,
            frontier_high_water: 0,
            termination,
        }
    }

    /// JSON object with one key per counter; keys sorted.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "children_generated": self.children_generated,
            "children_pruned_by_bound": self.children_pruned_by_bound,
            "dominated_pops": self.dominated_pops,
            "duplicates_suppressed": self.duplicates_suppressed,
            "expansions": self.expansions,
            "frontier_high_water": self.frontier_high_water,
            "solutions_found": self.solutions_found,
            "termination": self.termination.as_str(),
        })
    }
}
