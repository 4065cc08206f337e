use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Helper to get a Command for the bomstrip binary.
#[allow(deprecated)]
fn bomstrip_cmd(scratch: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bomstrip").unwrap();
    cmd.env("NO_COLOR", "1").env("TMPDIR", scratch);
    cmd
}

fn with_bom(body: &[u8]) -> Vec<u8> {
    let mut v = BOM.to_vec();
    v.extend_from_slice(body);
    v
}

#[test]
fn help_works() {
    let scratch = tempdir().unwrap();
    bomstrip_cmd(scratch.path()).arg("--help").assert().success();
}

#[test]
fn version_prints_package_version() {
    let scratch = tempdir().unwrap();
    bomstrip_cmd(scratch.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn fix_rewrites_tree_and_reports_summary() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let root = work.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/a.php"), with_bom(b"<?php\r\necho 1;\r\n")).unwrap();
    fs::write(root.join("b.css"), b"a{}\r\n").unwrap();
    fs::write(root.join("clean.js"), b"x\n").unwrap();
    fs::write(root.join("skip.bin"), b"x\r\n").unwrap();

    bomstrip_cmd(scratch.path())
        .arg("fix")
        .arg(root)
        .assert()
        .success()
        .stdout(predicate::str::contains("fixed:"))
        .stdout(predicate::str::contains("fixed=2 (bom=0 crlf=1 both=1)"));

    assert_eq!(fs::read(root.join("src/a.php")).unwrap(), b"<?php\necho 1;\n");
    assert_eq!(fs::read(root.join("b.css")).unwrap(), b"a{}\n");
    assert_eq!(fs::read(root.join("skip.bin")).unwrap(), b"x\r\n");
    assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[test]
fn dry_run_changes_nothing() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let f = work.path().join("a.txt");
    fs::write(&f, with_bom(b"x\r\n")).unwrap();

    bomstrip_cmd(scratch.path())
        .args(["fix", "--dry-run"])
        .arg(&f)
        .assert()
        .success()
        .stdout(predicate::str::contains("would fix:"))
        .stdout(predicate::str::contains("bom+crlf"));

    assert_eq!(fs::read(&f).unwrap(), with_bom(b"x\r\n"));
}

#[test]
fn scan_check_fails_when_changes_pending() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let f = work.path().join("a.md");
    fs::write(&f, b"x\r\n").unwrap();

    bomstrip_cmd(scratch.path())
        .args(["scan", "--check"])
        .arg(work.path())
        .assert()
        .code(1);

    fs::write(&f, b"x\n").unwrap();
    bomstrip_cmd(scratch.path())
        .args(["scan", "--check"])
        .arg(work.path())
        .assert()
        .success();
}

#[test]
fn per_file_failure_sets_exit_code_but_batch_continues() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let good = work.path().join("good.txt");
    fs::write(&good, b"x\r\n").unwrap();
    let missing = work.path().join("missing.txt");

    bomstrip_cmd(scratch.path())
        .arg("fix")
        .arg(&missing)
        .arg(&good)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[unreadable]"));

    assert_eq!(fs::read(&good).unwrap(), b"x\n");
}

#[test]
fn too_large_file_is_reported_and_untouched() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let f = work.path().join("big.txt");
    fs::write(&f, with_bom(b"0123456789\r\n")).unwrap();

    bomstrip_cmd(scratch.path())
        .args(["fix", "--max-size", "8"])
        .arg(&f)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[too-large]"));

    assert_eq!(fs::read(&f).unwrap(), with_bom(b"0123456789\r\n"));
}

#[test]
fn unusable_scratch_area_aborts_before_touching_files() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let f = work.path().join("a.txt");
    fs::write(&f, b"x\r\n").unwrap();

    bomstrip_cmd(scratch.path())
        .arg("fix")
        .arg("--temp-dir")
        .arg(scratch.path().join("does-not-exist"))
        .arg(&f)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("scratch area"));

    assert_eq!(fs::read(&f).unwrap(), b"x\r\n");
}

#[test]
fn json_output_has_results_and_summary() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let f = work.path().join("a.txt");
    fs::write(&f, with_bom(b"x\n")).unwrap();

    let out = bomstrip_cmd(scratch.path())
        .args(["fix", "--output", "json"])
        .arg(&f)
        .output()
        .unwrap();
    assert!(out.status.success());
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["results"][0]["status"], "fixed");
    assert_eq!(v["results"][0]["issues"], "bom");
    assert_eq!(v["summary"]["fixed_bom"], 1);
    assert_eq!(v["preview"], false);
}

#[test]
fn sweep_removes_leftovers_of_one_run() {
    let scratch = tempdir().unwrap();
    fs::write(scratch.path().join("bomstrip-77-a.php.tmp"), b"x").unwrap();
    fs::write(scratch.path().join("bomstrip-77-a.php.bak"), b"x").unwrap();
    fs::write(scratch.path().join("bomstrip-78-b.php.tmp"), b"x").unwrap();

    bomstrip_cmd(scratch.path())
        .arg("sweep")
        .arg("--temp-dir")
        .arg(scratch.path())
        .args(["--run", "77"])
        .assert()
        .success()
        .stdout(predicate::str::contains("removed=2"));

    assert!(scratch.path().join("bomstrip-78-b.php.tmp").exists());
    assert!(!scratch.path().join("bomstrip-77-a.php.tmp").exists());
}

#[test]
fn sweep_with_paths_removes_staging_files_beside_targets() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();
    let nested = work.path().join("public");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join(".bomstrip-77-index.php.swap"), b"x").unwrap();
    fs::write(nested.join("index.php"), b"x").unwrap();

    bomstrip_cmd(scratch.path())
        .arg("sweep")
        .arg("--temp-dir")
        .arg(scratch.path())
        .args(["--run", "77"])
        .arg(work.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("removed=1"));

    assert!(!nested.join(".bomstrip-77-index.php.swap").exists());
    assert!(nested.join("index.php").exists());
}

#[test]
fn piped_stderr_has_no_color_codes() {
    let work = tempdir().unwrap();
    let scratch = tempdir().unwrap();

    bomstrip_cmd(scratch.path())
        .env_remove("NO_COLOR")
        .arg("fix")
        .arg(work.path().join("missing.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("\u{1b}[").not());
}
