use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn mason_cmd() -> Command {
    Command::cargo_bin("mason").unwrap()
}

fn scaffold(dir: &std::path::Path) {
    std::fs::write(dir.join("Mason.toml"), "[project]\nname = \"app\"\n").unwrap();
}

#[test]
fn test_clean_removes_output_directory() {
    let tmp = TempDir::new().unwrap();
    scaffold(tmp.path());

    let out_dir = tmp.path().join(".out");
    std::fs::create_dir_all(&out_dir).unwrap();
    std::fs::write(out_dir.join("main.o"), "fake").unwrap();

    mason_cmd()
        .current_dir(tmp.path())
        .args(["clean"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Removed"));

    assert!(!out_dir.exists());
}

#[test]
fn test_clean_without_output_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    scaffold(tmp.path());

    mason_cmd()
        .current_dir(tmp.path())
        .args(["clean"])
        .assert()
        .success()
        .stderr(predicate::str::contains("nothing to do"));
}

#[test]
fn test_clean_finds_manifest_in_ancestor() {
    let tmp = TempDir::new().unwrap();
    scaffold(tmp.path());

    let nested = tmp.path().join("src/deep");
    std::fs::create_dir_all(&nested).unwrap();
    let out_dir = tmp.path().join(".out");
    std::fs::create_dir_all(&out_dir).unwrap();

    mason_cmd()
        .current_dir(&nested)
        .args(["clean"])
        .assert()
        .success();

    assert!(!out_dir.exists());
}

#[test]
fn test_clean_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    mason_cmd()
        .current_dir(tmp.path())
        .args(["clean"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mason.toml"));
}
