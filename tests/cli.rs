#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn olaf() -> Command {
    Command::cargo_bin("olaf").expect("binary exists")
}

#[test]
fn compiles_file_to_stdout() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("greet.olaf");
    fs::write(&input_path, "build greet:\n  say \"hi\"\nend\n").expect("write input");

    olaf()
        .arg(&input_path)
        .assert()
        .success()
        .stdout("function greet() {\n  console.log(\"hi\");\n}\n");
}

#[test]
fn compiles_stdin_to_output_file() {
    let dir = tempdir().expect("tempdir");
    let output_path = dir.path().join("out.js");

    olaf()
        .arg("--output")
        .arg(&output_path)
        .write_stdin("snowball x = 5\nsay x\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let js = fs::read_to_string(&output_path).expect("read output");
    assert_eq!(js, "let x = 5;\nconsole.log(x);\n");
}

#[test]
fn honours_indent_and_wait_options() {
    olaf()
        .args(["--indent", "4", "--wait-ms", "10"])
        .write_stdin("build nap:\n  wait\nend\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "    await new Promise(resolve => setTimeout(resolve, 10));",
        ))
        .stdout(predicate::str::starts_with("async function nap() {"));
}

#[test]
fn reports_unclosed_block() {
    let dir = tempdir().expect("tempdir");
    let input_path = dir.path().join("broken.olaf");
    fs::write(&input_path, "build f:\n  say \"hi\"\n").expect("write input");

    olaf()
        .arg(&input_path)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("E0101"))
        .stderr(predicate::str::contains("'build f:' is never closed"))
        .stderr(predicate::str::contains("broken.olaf"));
}

#[test]
fn reports_every_error_at_once() {
    olaf()
        .write_stdin("end\nsay @\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0100"))
        .stderr(predicate::str::contains("E0001"))
        .stderr(predicate::str::contains("2 error(s)"));
}

#[test]
fn check_mode_prints_nothing_on_success() {
    olaf()
        .arg("--check")
        .write_stdin("say 1\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    olaf()
        .arg("--check")
        .write_stdin("end\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("E0100"));
}

#[test]
fn missing_input_file_is_an_error() {
    let dir = tempdir().expect("tempdir");

    olaf()
        .arg(dir.path().join("missing.olaf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}
