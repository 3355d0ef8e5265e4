use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn taskdeps() -> Command {
    let mut cmd = Command::cargo_bin("taskdeps").unwrap();
    cmd.env("RUST_LOG", "off").env("TASKDEPS_CONFIG", "");
    cmd
}

fn config_file(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.yml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_lists_source_files() {
    taskdeps()
        .arg(fixture("simple.yml"))
        .args(["--task", "n1.task"])
        .assert()
        .success()
        .stdout("simple2.txt\nsimple3.txt\nsimple4a.txt\nsimple4b.txt\n");
}

#[test]
fn test_frames_and_vars() {
    taskdeps()
        .arg(fixture("frames.yml"))
        .args(["-t", "nOutput.task", "-f", "7", "-v", "wedgeString=awesome"])
        .assert()
        .success()
        .stdout("source_0007.txt\nwedge_awesome.txt\n");
}

#[test]
fn test_json_output_with_nodes() {
    let output = taskdeps()
        .arg(fixture("subgraph.yml"))
        .args(["--task", "n1.task", "--nodes", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["task"], "n1.task");
    assert_eq!(
        value["upstream_nodes"],
        serde_json::json!(["box.boxWriter", "n2"])
    );
    assert_eq!(
        value["source_files"],
        serde_json::json!(["boxWriter.txt", "graphWriter.txt"])
    );
}

#[test]
fn test_custom_file_plug() {
    taskdeps()
        .arg(fixture("simple.yml"))
        .args(["--task", "n1.task", "--file-plug", "cachePath"])
        .assert()
        .success()
        .stdout("cache2.abc\n");
}

#[test]
fn test_check_fails_on_missing_files() {
    taskdeps()
        .arg(fixture("simple.yml"))
        .args(["--task", "n1.task", "--check"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("# missing (4)"));
}

#[test]
fn test_unknown_task_is_an_error() {
    taskdeps()
        .arg(fixture("simple.yml"))
        .args(["--task", "ghost.task"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost.task"));
}

#[test]
fn test_bad_var_syntax_rejected() {
    taskdeps()
        .arg(fixture("simple.yml"))
        .args(["--task", "n1.task", "--var", "novalue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected name=value"));
}

#[test]
fn test_config_env_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(&dir, "file_plug_names: [cachePath]\n");

    taskdeps()
        .env("TASKDEPS_CONFIG", &config)
        .arg(fixture("simple.yml"))
        .args(["--task", "n1.task"])
        .assert()
        .success()
        .stdout("cache2.abc\n");
}

#[test]
fn test_no_config_skips_global_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_file(&dir, "file_plug_names: [cachePath]\n");

    taskdeps()
        .env("TASKDEPS_CONFIG", &config)
        .arg(fixture("simple.yml"))
        .args(["--task", "n1.task", "--no-config"])
        .assert()
        .success()
        .stdout("simple2.txt\nsimple3.txt\nsimple4a.txt\nsimple4b.txt\n");
}

#[test]
fn test_raw_conflicts_with_check() {
    taskdeps()
        .arg(fixture("frames.yml"))
        .args(["--task", "nOutput.task", "--raw", "--check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
