//! CLI integration tests for incmake
//!
//! These tests run the binary against declaration files in temporary
//! directories and check what it prints and executes.

use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command instance for the incmake binary
fn incmake_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("incmake"));
    cmd.env_remove("INCMAKE_FILE");
    cmd
}

const BIGGER: &str = "\
main = t, f.java, f.cpp
t = f.py, f.go, f.h, f.cpp
f.cpp = f.go, f.h, f.py
f.go = f.asm
";

/// Create a temporary directory holding `build.txt`
fn setup_project(declarations: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("build.txt"), declarations).unwrap();
    dir
}

fn json_stdout(output: &assert_cmd::assert::Assert) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).unwrap()
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_config() {
    let dir = TempDir::new().unwrap();

    incmake_cmd()
        .arg("init")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized incmake project"));

    assert!(dir.path().join("incmake.toml").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    incmake_cmd().arg("init").arg(dir.path()).assert().success();
    incmake_cmd().arg("init").arg(dir.path()).assert().success();
}

// =============================================================================
// Build Tests
// =============================================================================

#[test]
fn test_build_dry_run_lists_stale_targets() {
    let dir = setup_project(BIGGER);

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--dry-run", "--modified", "f.asm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled 5 target(s)"))
        .stdout(predicate::str::contains("f.go"))
        .stdout(predicate::str::contains("f.java").not());
}

#[test]
fn test_build_json_report() {
    let dir = setup_project(BIGGER);

    let output = incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--dry-run", "-m", "f.asm", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["phase"], "done");
    assert_eq!(json["modified"], serde_json::json!(["f.asm"]));

    let compiled: Vec<_> = json["compiled"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert_eq!(compiled.len(), 5);
    assert_eq!(compiled[0], "f.asm");
    assert_eq!(compiled[1], "f.go");
    assert_eq!(compiled[4], "main");
}

#[test]
fn test_build_runs_command_in_order() {
    let dir = setup_project("f1:\nf2 : f1\nmain = f2\n");

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--all", "--exec", "echo {name} >> built.log"])
        .assert()
        .success();

    let log = fs::read_to_string(dir.path().join("built.log")).unwrap();
    assert_eq!(log, "f1\nf2\nmain\n");
}

#[test]
fn test_build_uses_configured_command_and_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("incmake.toml"),
        "build_file = \"rules.txt\"\ncompile_command = \"echo {name} >> built.log\"\nmodified = \"all\"\n",
    )
    .unwrap();
    fs::write(dir.path().join("rules.txt"), "f1:\nmain = f1\n").unwrap();

    incmake_cmd()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .success();

    let log = fs::read_to_string(dir.path().join("built.log")).unwrap();
    assert_eq!(log, "f1\nmain\n");
}

#[test]
fn test_build_failing_command_aborts() {
    let dir = setup_project("f1:\nmain = f1\n");

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--all", "--exec", "test {name} != main"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("main"));
}

#[test]
fn test_build_nothing_modified() {
    let dir = setup_project(BIGGER);

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--none"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to compile."));
}

#[test]
fn test_build_since_future_timestamp() {
    let dir = setup_project("a.c:\napp = a.c\n");
    fs::write(dir.path().join("a.c"), "int a;").unwrap();

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--dry-run", "--since", "2999-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to compile."));

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--dry-run", "--since", "2000-01-01T00:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled 2 target(s)"));
}

#[test]
fn test_build_cycle_fails() {
    let dir = setup_project("a=b\nb=c\nc=a\n");

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--all", "--exec", "echo {name} >> built.log"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Dependency cycle detected"))
        .stderr(predicate::str::contains("dependency cycle"));

    assert!(!dir.path().join("built.log").exists());
}

#[test]
fn test_build_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    incmake_cmd()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read declaration file"));
}

#[test]
fn test_build_explicit_file_flag() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("other.txt"), "x:\ny = x\n").unwrap();

    incmake_cmd()
        .current_dir(dir.path())
        .args(["--file", "other.txt", "build", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Compiled 2 target(s)"));
}

#[test]
fn test_build_conflicting_flags_rejected() {
    let dir = setup_project(BIGGER);

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--all", "--none"])
        .assert()
        .failure();
}

#[test]
fn test_build_empty_file() {
    let dir = setup_project("");

    incmake_cmd()
        .current_dir(dir.path())
        .args(["build", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to compile."));
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_order_respects_dependencies() {
    let dir = setup_project(BIGGER);

    let output = incmake_cmd()
        .current_dir(dir.path())
        .args(["order", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let order: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect();
    let pos = |name: &str| order.iter().position(|n| n == name).unwrap();

    assert_eq!(order.len(), 8);
    assert!(pos("f.asm") < pos("f.go"));
    assert!(pos("f.go") < pos("f.cpp"));
    assert!(pos("f.cpp") < pos("t"));
    assert!(pos("t") < pos("main"));
    assert!(pos("f.java") < pos("main"));
}

#[test]
fn test_order_cycle_fails() {
    let dir = setup_project("a = a\n");

    incmake_cmd()
        .current_dir(dir.path())
        .arg("order")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No build order"));
}

#[test]
fn test_check_reports_cycle() {
    let dir = setup_project("a=b\nb=c\nc=a\nd = e\n");

    incmake_cmd()
        .current_dir(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Cycle:   detected"));
}

#[test]
fn test_check_acyclic_json() {
    let dir = setup_project(BIGGER);

    let output = incmake_cmd()
        .current_dir(dir.path())
        .args(["check", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    assert_eq!(json["cycle"], false);
    assert_eq!(json["targets"], 8);
    assert_eq!(json["sources"], serde_json::json!(["f.java", "f.py", "f.h", "f.asm"]));
    assert_eq!(json["leaves"], serde_json::json!(["main"]));
}

#[test]
fn test_show_target() {
    let dir = setup_project(BIGGER);

    incmake_cmd()
        .current_dir(dir.path())
        .args(["show", "f.cpp"])
        .assert()
        .success()
        .stdout(predicate::str::contains("f.cpp (task)"))
        .stdout(predicate::str::contains("f.go"))
        .stdout(predicate::str::contains("main"));
}

#[test]
fn test_show_unknown_target_fails() {
    let dir = setup_project(BIGGER);

    incmake_cmd()
        .current_dir(dir.path())
        .args(["show", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Target not found: ghost"));
}

#[test]
fn test_affected_lists_reachable_targets() {
    let dir = setup_project(BIGGER);

    let output = incmake_cmd()
        .current_dir(dir.path())
        .args(["affected", "f.go", "--format", "json"])
        .assert()
        .success();

    let json = json_stdout(&output);
    let mut reached: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    reached.sort();

    assert_eq!(reached, vec!["f.cpp", "f.go", "main", "t"]);
}

#[test]
fn test_verbose_logs_to_stderr() {
    let dir = setup_project("f1:\nmain = f1\n");

    incmake_cmd()
        .current_dir(dir.path())
        .args(["--verbose", "build", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("[verbose:build] Parsed 2 targets"));
}
