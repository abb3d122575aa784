//! Knitxfer search: minimum-pass transfer planning by best-first branch and
//! bound.
//!
//! This crate depends only on `knitxfer_kernel`; it does NOT depend on
//! `knitxfer_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! knitxfer_kernel  ←  knitxfer_search  ←  knitxfer_harness
//! (machine model)     (costs, search)     (case files, reports)
//! ```
//!
//! # Key types
//!
//! - [`TransferProblem`] -- validated offsets/firsts configuration
//! - [`SearchPolicy`] -- racking limit and search budgets
//! - [`TransferPlan`] -- the chosen transfers with pass count and stats
//! - [`legality::MoveRejection`] -- reason code from the move validator
//!
//! # Entry points
//!
//! - [`plan_transfers`] -- default policy, transfers only
//! - [`plan_with_policy`] / [`plan_with_cancel`] -- full result

#![forbid(unsafe_code)]

pub mod cost;
pub mod error;
pub mod frontier;
pub mod legality;
pub mod node;
pub mod plan;
pub mod policy;
pub mod problem;
pub mod search;
pub mod stats;

pub use error::{PlanError, PreconditionError};
pub use plan::{plan_transfers, plan_with_cancel, plan_with_policy, TransferPlan};
pub use policy::SearchPolicy;
pub use problem::TransferProblem;
