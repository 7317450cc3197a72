//! Integration tests for the qf binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn qf(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_qf"));
    cmd.current_dir(dir).env_remove("QF_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempdir().unwrap();
    qf(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("escape"));
}

#[test]
fn test_render_prints_only_the_query() {
    let dir = tempdir().unwrap();
    qf(dir.path())
        .args(["render", "SELECT {n}{flag:if: AND flag}", "-t", "n=int:5"])
        .assert()
        .success()
        .stdout("SELECT 5\n");
}

#[test]
fn test_render_with_args_file() {
    let dir = tempdir().unwrap();
    let args = dir.path().join("args.yaml");
    fs::write(&args, "named:\n  ids: [1, 2]\n  kind: a'b\n").unwrap();

    qf(dir.path())
        .args(["render", "id IN ({ids}) AND kind = '{kind}'", "--args-file"])
        .arg(&args)
        .assert()
        .success()
        .stdout("id IN (1, 2) AND kind = 'a''b'\n");
}

#[test]
fn test_render_reads_stdin() {
    let dir = tempdir().unwrap();
    qf(dir.path())
        .args(["render", "-", "-s", "who=world"])
        .write_stdin("hello {who}")
        .assert()
        .success()
        .stdout("hello world\n");
}

#[test]
fn test_config_file_disables_escaping() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("qf.toml"), "[formatter]\nescaper = \"none\"\n").unwrap();

    qf(dir.path())
        .args(["render", "{v}", "-s", "v=it's"])
        .assert()
        .success()
        .stdout("it's\n");
}

#[test]
fn test_template_error_exit_code() {
    let dir = tempdir().unwrap();
    qf(dir.path())
        .args(["render", "{0}", "-p", "a", "-p", "b"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("never used"));
}

#[test]
fn test_invalid_argument_exit_code() {
    let dir = tempdir().unwrap();
    qf(dir.path())
        .args(["render", "{n}", "-t", "n=int:abc"])
        .assert()
        .code(2);

    qf(dir.path())
        .args(["render", "{n}", "--config", "missing.toml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_escape_command() {
    let dir = tempdir().unwrap();
    qf(dir.path())
        .args(["escape", "date", "2021-05-17"])
        .assert()
        .success()
        .stdout("'2021-05-17'::date\n");

    qf(dir.path())
        .args(["escape", "null", "None", "--condition", "deleted_at"])
        .assert()
        .success()
        .stdout("deleted_at IS NULL\n");
}
