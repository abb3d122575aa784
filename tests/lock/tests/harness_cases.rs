//! Harness lock tests: run the fixture case directory, check the tally, and
//! read every written `.xout` back through replay verification.

use std::path::{Path, PathBuf};

use knitxfer_harness::report::parse_xout;
use knitxfer_harness::runner::{run_cases, RunOptions, RunStats};
use knitxfer_kernel::proof::replay::replay_verify;
use knitxfer_search::cost::pass_count;

fn cases_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .join("fixtures/cases")
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: fixture tally
// ---------------------------------------------------------------------------

#[test]
fn fixture_directory_tally() {
    let out = tempfile::tempdir().unwrap();
    let options = RunOptions {
        out_dir: Some(out.path().to_path_buf()),
        ..RunOptions::default()
    };
    let stats = run_cases(&[cases_dir()], &options).unwrap();
    assert_eq!(
        stats,
        RunStats {
            total: 8,
            ran: 7,
            passed: 6,
            failed: 1,
            skipped: 1,
            invalid: 1,
        }
    );
}

#[test]
fn skip_options_leave_plain_cases() {
    let options = RunOptions {
        skip_cables: true,
        skip_lace: true,
        skip_long: true,
        out_dir: None,
    };
    let stats = run_cases(&[cases_dir()], &options).unwrap();
    assert_eq!(stats.total, 8);
    assert_eq!(stats.invalid, 1);
    // decrease, lace-first and one-group stack loops; cable; long.
    assert_eq!(stats.skipped, 6);
    assert_eq!(stats.ran, 2);
    assert_eq!(stats.passed, 2);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: written results replay
// ---------------------------------------------------------------------------

#[test]
fn written_xout_files_replay() {
    let out = tempfile::tempdir().unwrap();
    let options = RunOptions {
        out_dir: Some(out.path().to_path_buf()),
        ..RunOptions::default()
    };
    run_cases(&[cases_dir()], &options).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "decrease.xout",
            "flat.xout",
            "lace-first.xout",
            "long.xout",
            "one-group.xout",
            "shift-right.xout",
        ]
    );

    for name in &names {
        let text = std::fs::read_to_string(out.path().join(name)).unwrap();
        let (case, transfers) = parse_xout(name, &text).unwrap();
        let report = replay_verify(&case.offsets, &case.firsts, &transfers).unwrap();
        assert!(report.verdict.is_match(), "{name}: {:?}", report.verdict);
        if name == "one-group.xout" {
            assert_eq!(pass_count(&transfers), 2);
        }
        if name == "flat.xout" {
            assert!(transfers.is_empty());
        }
    }
}
