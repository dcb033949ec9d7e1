#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn mason_cmd() -> Command {
    Command::cargo_bin("mason").unwrap()
}

/// Stand-in for g++: parses `-o` and writes an executable placeholder there.
fn write_stub_compiler(dir: &Path) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-compiler.sh");
    std::fs::write(
        &path,
        r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
    [ "$prev" = "-o" ] && out="$arg"
    prev="$arg"
done
if [ -n "$out" ]; then
    mkdir -p "$(dirname "$out")"
    case "$out" in
        *failing*) printf '#!/bin/sh\nexit 1\n' > "$out" ;;
        *)         printf '#!/bin/sh\nexit 0\n' > "$out" ;;
    esac
    chmod +x "$out"
fi
exit 0
"#,
    )
    .unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

fn scaffold(dir: &Path) {
    let compiler = write_stub_compiler(dir);
    std::fs::write(
        dir.join("Mason.toml"),
        format!(
            r#"[project]
name = "app.bin"
compiler = "{}"

[build]
source-dirs = ["src"]
tests-dir = "src/tests"
"#,
            compiler.display()
        ),
    )
    .unwrap();
    std::fs::create_dir_all(dir.join("src/tests")).unwrap();
    std::fs::write(dir.join("src/main.cpp"), "int main() { return 0; }\n").unwrap();
    std::fs::write(dir.join("src/tests/smoke_test.cpp"), "int main() { return 0; }\n").unwrap();
}

#[test]
fn test_build_produces_artifacts_and_runs_tests() {
    let tmp = TempDir::new().unwrap();
    scaffold(tmp.path());

    mason_cmd()
        .current_dir(tmp.path())
        .args(["build"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Finished"));

    assert!(tmp.path().join("app.bin").exists());
    assert!(tmp.path().join(".out").join("src").join("main.cpp.o").exists());
}

#[test]
fn test_build_respects_jobs_flag() {
    let tmp = TempDir::new().unwrap();
    scaffold(tmp.path());

    mason_cmd()
        .current_dir(tmp.path())
        .args(["build", "--jobs", "1"])
        .assert()
        .success();

    assert!(tmp.path().join("app.bin").exists());
}

#[test]
fn test_build_exits_zero_when_a_test_fails() {
    let tmp = TempDir::new().unwrap();
    scaffold(tmp.path());
    std::fs::write(
        tmp.path().join("src/tests/failing_test.cpp"),
        "int main() { return 1; }\n",
    )
    .unwrap();

    mason_cmd()
        .current_dir(tmp.path())
        .args(["build"])
        .assert()
        .success()
        .stderr(predicate::str::contains("FAILED"));
}

#[test]
fn test_build_without_manifest_fails() {
    let tmp = TempDir::new().unwrap();

    mason_cmd()
        .current_dir(tmp.path())
        .args(["build"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Mason.toml"));
}
