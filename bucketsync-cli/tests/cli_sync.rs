use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bucketsync() -> Command {
    if let Ok(path) = std::env::var("CARGO_BIN_EXE_bucketsync") {
        return Command::new(PathBuf::from(path));
    }
    Command::cargo_bin("bucketsync").expect("unable to locate bucketsync binary")
}

fn site(dir: &Path) {
    fs::create_dir_all(dir.join("b")).unwrap();
    fs::write(dir.join("a.txt"), "alpha").unwrap();
    fs::write(dir.join("b/c.txt"), "gamma").unwrap();
}

#[test]
fn plan_prints_jobs_and_writes_nothing() {
    let source = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    site(source.path());

    let output = bucketsync()
        .arg("plan")
        .arg("--bucket")
        .arg(bucket.path())
        .arg("--source")
        .arg(source.path())
        .args(["--target", "site", "--json"])
        .output()
        .expect("run bucketsync plan");
    assert!(
        output.status.success(),
        "command failed: status={} stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr),
    );

    let jobs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let remotes: Vec<_> = jobs
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["remote"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(remotes, vec!["site/a.txt", "site/b/c.txt"]);
    assert!(!bucket.path().join("site").exists());
}

#[test]
fn sync_uploads_then_deletes_stale_objects() {
    let source = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    site(source.path());

    bucketsync()
        .arg("sync")
        .arg("--bucket")
        .arg(bucket.path())
        .arg("--source")
        .arg(source.path())
        .args(["--target", "site"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 uploaded"));
    assert_eq!(
        fs::read_to_string(bucket.path().join("site/a.txt")).unwrap(),
        "alpha"
    );

    fs::remove_file(source.path().join("a.txt")).unwrap();
    bucketsync()
        .arg("sync")
        .arg("--bucket")
        .arg(bucket.path())
        .arg("--source")
        .arg(source.path())
        .args(["--target", "site", "--delete", "--invalidate", "E2EXAMPLE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 deleted"))
        .stdout(predicate::str::contains("cache invalidation requested"));
    assert!(!bucket.path().join("site/a.txt").exists());
}

#[test]
fn dry_run_reports_but_leaves_bucket_untouched() {
    let source = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    site(source.path());

    bucketsync()
        .arg("sync")
        .arg("--bucket")
        .arg(bucket.path())
        .arg("--source")
        .arg(source.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"));

    assert!(!bucket.path().join("a.txt").exists());
    assert!(!bucket.path().join("b").exists());
}

#[test]
fn settings_file_supplies_values_and_flags_override() {
    let source = TempDir::new().unwrap();
    let bucket = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    site(source.path());
    let config = work.path().join("bucketsync.yaml");
    fs::write(
        &config,
        format!(
            "bucket: {}\nsource: {}\ntarget: from-file\nredirects:\n  old.html: /a.txt\n",
            bucket.path().display(),
            source.path().display(),
        ),
    )
    .unwrap();

    let output = bucketsync()
        .current_dir(work.path())
        .arg("plan")
        .arg("--config")
        .arg(&config)
        .args(["--target", "from-flag", "--json"])
        .output()
        .expect("run bucketsync plan");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("from-flag/a.txt"), "stdout: {stdout}");
    assert!(!stdout.contains("from-file"), "stdout: {stdout}");
    assert!(stdout.contains("\"redirect\""), "stdout: {stdout}");
}

#[test]
fn missing_bucket_exits_non_zero() {
    let source = TempDir::new().unwrap();
    bucketsync()
        .arg("sync")
        .arg("--source")
        .arg(source.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must set 'bucket'"));
}

#[test]
fn malformed_redirect_flag_is_rejected() {
    bucketsync()
        .args(["plan", "--bucket", "b", "--redirect", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=TARGET"));
}

#[test]
fn bucket_inside_source_is_rejected() {
    let work = TempDir::new().unwrap();
    site(work.path());

    bucketsync()
        .current_dir(work.path())
        .args(["sync", "--bucket", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("inside source"));
    assert!(!work.path().join("out").exists());
}
