//! Harness runner: plan every case, replay-verify the plan, tally results.
//!
//! The runner uses ONLY crate-level entry points: `plan_with_policy` from
//! the search crate and `replay_verify` from the kernel. It does not judge
//! plans itself.
//!
//! # Pipeline
//!
//! ```text
//! expand paths → Case::load() → traits() / skip options
//!   → plan_with_policy(max_rack = max(transferMax, 1))
//!   → replay_verify() → [write_xout()]
//! ```

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use knitxfer_kernel::proof::replay::{replay_verify, Divergence, ReplayError, ReplayVerdict};
use knitxfer_search::{plan_with_policy, PlanError, SearchPolicy, TransferPlan};

use crate::case::Case;
use crate::report::{write_xout, ReportError};

/// Which cases to skip and where to write results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub skip_cables: bool,
    pub skip_lace: bool,
    pub skip_long: bool,
    /// Directory for `.xout` files of passing cases; `None` writes nothing.
    pub out_dir: Option<PathBuf>,
}

/// Tally over a run. Invalid case files count as both skipped and invalid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub total: usize,
    pub ran: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub invalid: usize,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "of {} cases: skipped {} ({} invalid), ran {} ({} passed, {} failed)",
            self.total, self.skipped, self.invalid, self.ran, self.passed, self.failed
        )
    }
}

/// Why a case that ran did not pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseFailure {
    Plan(PlanError),
    Replay(ReplayError),
    Divergence(Divergence),
}

impl std::fmt::Display for CaseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plan(e) => write!(f, "planning failed: {e}"),
            Self::Replay(e) => write!(f, "replay failed: {e}"),
            Self::Divergence(d) => write!(f, "replay diverged: {d}"),
        }
    }
}

/// Error that aborts a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    Io { detail: String },
    Report(ReportError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::Report(e) => write!(f, "report error: {e}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ReportError> for RunError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

/// Policy used for a case: default budgets, racking limited to `transferMax`.
#[must_use]
pub fn policy_for(case: &Case) -> SearchPolicy {
    SearchPolicy::with_max_rack(case.transfer_max.max(1))
}

/// Plan one case and verify the plan by replay.
///
/// # Errors
///
/// Returns [`CaseFailure`] if planning fails or the replay does not match.
pub fn run_case(case: &Case) -> Result<TransferPlan, CaseFailure> {
    let plan = plan_with_policy(&case.offsets, &case.firsts, &policy_for(case))
        .map_err(CaseFailure::Plan)?;
    let report =
        replay_verify(&case.offsets, &case.firsts, &plan.transfers).map_err(CaseFailure::Replay)?;
    match report.verdict {
        ReplayVerdict::Match => Ok(plan),
        ReplayVerdict::Divergence(d) => Err(CaseFailure::Divergence(d)),
    }
}

/// Run every case named by `paths`. A directory contributes each regular
/// file directly inside it, in name order.
///
/// # Errors
///
/// Returns [`RunError`] if a path cannot be listed or a result file cannot
/// be written. Malformed or failing cases are counted, not returned.
pub fn run_cases(paths: &[PathBuf], options: &RunOptions) -> Result<RunStats, RunError> {
    let mut stats = RunStats::default();
    for file in expand_paths(paths)? {
        stats.total += 1;
        info!("{} ...", file.display());

        let case = match Case::load(&file) {
            Ok(case) => case,
            Err(e) => {
                warn!("{}: {e}", file.display());
                stats.skipped += 1;
                stats.invalid += 1;
                continue;
            }
        };

        let traits = case.traits();
        if (traits.has_lace && options.skip_lace)
            || (traits.has_cables && options.skip_cables)
            || (traits.has_long && options.skip_long)
        {
            stats.skipped += 1;
            continue;
        }

        stats.ran += 1;
        let plan = match run_case(&case) {
            Ok(plan) => plan,
            Err(e) => {
                warn!("{}: {e}", case.name);
                stats.failed += 1;
                continue;
            }
        };
        stats.passed += 1;
        info!(
            "{}: {} transfers in {} passes (lower bound {}, {})",
            case.name,
            plan.transfers.len(),
            plan.passes,
            plan.lower_bound,
            plan.stats.termination
        );
        debug!("{}: {}", case.name, plan.stats.to_json());

        if let Some(out_dir) = &options.out_dir {
            write_xout(out_dir, &case, &plan.transfers)?;
        }
    }
    info!("{stats}");
    Ok(stats)
}

fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, RunError> {
    let mut files = Vec::new();
    for path in paths {
        let meta = std::fs::metadata(path).map_err(|e| RunError::Io {
            detail: format!("stat {}: {e}", path.display()),
        })?;
        if meta.is_dir() {
            files.extend(list_files(path)?);
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>, RunError> {
    let entries = std::fs::read_dir(dir).map_err(|e| RunError::Io {
        detail: format!("read_dir {}: {e}", dir.display()),
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RunError::Io {
            detail: format!("dir entry: {e}"),
        })?;
        let file_type = entry.file_type().map_err(|e| RunError::Io {
            detail: format!("file_type: {e}"),
        })?;
        if file_type.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
