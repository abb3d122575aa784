//! Binary that plans the case file given on the command line and prints
//! deterministic output lines for cross-process verification.
//!
//! Usage: `plan_fixture <case.json>`
//!
//! Output: key=value lines (see source for format).

use knitxfer_harness::case::Case;
use knitxfer_harness::runner::policy_for;
use knitxfer_kernel::proof::replay::replay_verify;
use knitxfer_search::plan_with_policy;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("usage: plan_fixture <case.json>");
        std::process::exit(1);
    }
    let case = Case::load(std::path::Path::new(&args[1])).expect("failed to load case");
    let plan = plan_with_policy(&case.offsets, &case.firsts, &policy_for(&case))
        .expect("planning failed");
    let report =
        replay_verify(&case.offsets, &case.firsts, &plan.transfers).expect("replay failed");

    println!("plan_digest={}", plan.digest().as_str());
    println!("layout_digest={}", report.layout_digest().as_str());
    println!("passes={}", plan.passes);
    println!("lower_bound={}", plan.lower_bound);
    println!("transfer_count={}", plan.transfers.len());
    println!("termination_reason={}", plan.stats.termination);
    println!("expansions={}", plan.stats.expansions);
    println!("replay_match={}", report.verdict.is_match());
}
