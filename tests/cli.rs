//! CLI integration tests for the perfcheck binary.
//!
//! Tests the command-line interface behavior.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use perfcheck::ast::build::*;
use perfcheck::ast::{AssignOp, Type};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the perfcheck binary.
fn perfcheck() -> Command {
    cargo_bin_cmd!("perfcheck")
}

/// Write a unit whose only function concatenates and spawns inside one loop.
fn write_busy_unit(dir: &Path) {
    let body = vec![
        assign_op(ident("s", Type::string()).at(3, 3), AssignOp::Add, ident("item", Type::string())),
        go_stmt(call(func_lit(vec![]), vec![])).at(4, 3),
    ];
    let unit = unit(vec![file(
        "worker.go",
        vec![func(
            "run",
            vec![range(
                None,
                Some(ident("item", Type::string())),
                ident("items", Type::slice_of(Type::string())),
                body,
            )],
        )],
    )]);
    fs::write(dir.join("worker.unit.json"), serde_json::to_string(&unit).unwrap()).unwrap();
}

#[test]
fn test_help_flag() {
    perfcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Performance-by-default detectors"));
}

#[test]
fn test_version_flag() {
    perfcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("perfcheck"));
}

#[test]
fn test_rules_subcommand() {
    perfcheck()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("perf_atomic_for_small_lock"))
        .stdout(predicate::str::contains("perf_no_defer_in_loop"))
        .stdout(predicate::str::contains("perf_vec_reserve_capacity"));
}

#[test]
fn test_rules_filtered_by_language() {
    perfcheck()
        .args(["rules", "--lang", "rust"])
        .assert()
        .success()
        .stdout(predicate::str::contains("perf_vec_reserve_capacity"))
        .stdout(predicate::str::contains("perf_no_defer_in_loop").not());
}

#[test]
fn test_explain_known_rule() {
    perfcheck()
        .arg("explain")
        .arg("perf_equal_fold_compare")
        .assert()
        .success()
        .stdout(predicate::str::contains("Why it matters"))
        .stdout(predicate::str::contains("strings.EqualFold"))
        .stdout(predicate::str::contains("Category:  cpu"));
}

#[test]
fn test_explain_unknown_rule() {
    perfcheck()
        .arg("explain")
        .arg("nonexistent-rule")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown rule"));
}

#[test]
fn test_init_creates_config() {
    let temp = TempDir::new().unwrap();

    perfcheck()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let written = fs::read_to_string(temp.path().join("perfcheck.toml")).unwrap();
    assert!(written.contains("[output]"));
}

#[test]
fn test_init_fails_if_exists() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("perfcheck.toml"), "").unwrap();

    perfcheck()
        .arg("init")
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_check_empty_directory() {
    let temp = TempDir::new().unwrap();

    perfcheck()
        .arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No performance issues found."));
}

#[test]
fn test_findings_do_not_fail_the_run() {
    let temp = TempDir::new().unwrap();
    write_busy_unit(temp.path());

    perfcheck()
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("perf_avoid_string_concat_loop"))
        .stdout(predicate::str::contains("worker.go:3:3"))
        .stdout(predicate::str::contains("2 warning(s)"));
}

#[test]
fn test_check_json_output() {
    let temp = TempDir::new().unwrap();
    write_busy_unit(temp.path());

    let output = perfcheck()
        .args(["check", "--format", "json"])
        .arg(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = parsed.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["rule_id"], "perf_avoid_string_concat_loop");
    assert_eq!(items[1]["rule_id"], "perf_bound_concurrency");
    assert_eq!(items[1]["line"], 4);
}

#[test]
fn test_check_sarif_output() {
    let temp = TempDir::new().unwrap();
    write_busy_unit(temp.path());

    perfcheck()
        .args(["check", "--format", "sarif"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": \"2.1.0\""))
        .stdout(predicate::str::contains("perf_bound_concurrency"));
}

#[test]
fn test_rules_flag_restricts_detectors() {
    let temp = TempDir::new().unwrap();
    write_busy_unit(temp.path());

    perfcheck()
        .args(["check", "--format", "json", "--rules", "perf_bound_concurrency"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("perf_bound_concurrency"))
        .stdout(predicate::str::contains("perf_avoid_string_concat_loop").not());
}

#[test]
fn test_unknown_rule_flag_fails() {
    let temp = TempDir::new().unwrap();

    perfcheck()
        .args(["check", "--rules", "no-such-rule"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rule 'no-such-rule'"));
}

#[test]
fn test_config_selects_format() {
    let temp = TempDir::new().unwrap();
    write_busy_unit(temp.path());
    fs::write(temp.path().join("perfcheck.toml"), "[output]\nformat = \"json\"\n").unwrap();

    perfcheck()
        .arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_broken_bundle_fails_fast() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("rules.tsv"), "id\tlangs\nperf_x\tgo\n").unwrap();
    fs::write(temp.path().join("perfcheck.toml"), "[catalog]\nbundle = \"rules.tsv\"\n").unwrap();

    perfcheck()
        .arg("check")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid field count on line 2"));
}

#[test]
fn test_check_nonexistent_path() {
    perfcheck()
        .arg("check")
        .arg("/nonexistent/path/for/perfcheck")
        .assert()
        .failure()
        .stderr(predicate::str::contains("path does not exist"));
}
