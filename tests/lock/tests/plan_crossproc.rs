//! Cross-process determinism: spawns the `plan_fixture` binary under
//! several environment variants and asserts identical output. Planning must
//! not depend on cwd, locale, or hash seeds.

use std::path::Path;
use std::process::Command;

fn fixture_path(name: &str) -> String {
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("tests/ exists")
        .parent()
        .expect("workspace root exists");
    workspace_root
        .join("tests/fixtures/cases")
        .join(name)
        .to_string_lossy()
        .to_string()
}

/// `cargo test` puts test binaries in `target/<profile>/deps/`; the
/// `plan_fixture` binary lives one level up.
fn binary_path() -> String {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push("plan_fixture");
    path.to_string_lossy().to_string()
}

fn run_variant(case: &str, work_dir: &str, env_overrides: &[(&str, &str)]) -> String {
    let mut command = Command::new(binary_path());
    command.arg(fixture_path(case)).current_dir(work_dir);
    command
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command
        .output()
        .unwrap_or_else(|e| panic!("failed to spawn plan_fixture: {e}"));
    assert!(
        output.status.success(),
        "plan_fixture failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("utf-8 output")
}

fn assert_variants_agree(case: &str) {
    let tmp = tempfile::tempdir().unwrap();
    let tmp_dir = tmp.path().to_string_lossy().to_string();
    let baseline = run_variant(case, "/", &[]);
    let variants = [
        run_variant(case, &tmp_dir, &[]),
        run_variant(case, "/", &[("LC_ALL", "C")]),
        run_variant(case, &tmp_dir, &[("LANG", "tr_TR.UTF-8"), ("RUST_LOG", "trace")]),
    ];
    for (i, out) in variants.iter().enumerate() {
        assert_eq!(&baseline, out, "variant {i} differs for {case}");
    }
    assert!(baseline.contains("replay_match=true"), "{baseline}");
}

#[test]
fn one_group_is_stable_across_processes() {
    assert_variants_agree("one-group.json");
}

#[test]
fn lace_with_first_is_stable_across_processes() {
    assert_variants_agree("lace-first.json");
}

#[test]
fn fixture_output_has_expected_keys() {
    let out = run_variant("shift-right.json", "/", &[]);
    let keys: Vec<&str> = out
        .lines()
        .filter_map(|l| l.split_once('=').map(|(k, _)| k))
        .collect();
    assert_eq!(
        keys,
        vec![
            "plan_digest",
            "layout_digest",
            "passes",
            "lower_bound",
            "transfer_count",
            "termination_reason",
            "expansions",
            "replay_match",
        ]
    );
    assert!(out.contains("passes=2\n"));
}
