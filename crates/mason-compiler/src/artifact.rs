//! Linked artifacts: binaries and tests.
//!
//! Targets and tests are one struct with a closed [`ArtifactKind`]
//! discriminant. A test is a binary that is additionally executed after a
//! successful link, carrying a separate runtime pass/fail outcome.

use std::path::{Path, PathBuf};

use mason_util::fs;
use mason_util::process::CommandBuilder;

use crate::registry::{UnitId, UnitRegistry};
use crate::report::{BuildReport, TestRun};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// A plain linked binary.
    Binary,
    /// A binary executed after linking; exit code 0 means the test passed.
    Test,
}

/// A linked output composed of compile units, libraries, and link flags.
#[derive(Debug)]
pub struct Artifact {
    /// Project-relative display name (also the output path under the root).
    pub name: String,
    /// Absolute path of the linked output.
    pub output: PathBuf,
    /// Compiler driver used for linking, propagated to attached units.
    pub compiler: String,
    /// Owned compile units, in attach order.
    pub units: Vec<UnitId>,
    /// Libraries linked with `-l`.
    pub libraries: Vec<String>,
    /// Library search paths linked with `-L`.
    pub library_paths: Vec<PathBuf>,
    /// Include directories propagated to units attached after they are set.
    pub include_dirs: Vec<PathBuf>,
    /// Extra flags, used both at link time and propagated to units.
    pub flags: Vec<String>,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn new(name: impl Into<String>, root: &Path, compiler: &str, kind: ArtifactKind) -> Self {
        let name = name.into();
        let output = root.join(&name);
        Self {
            name,
            output,
            compiler: compiler.to_string(),
            units: Vec::new(),
            libraries: Vec::new(),
            library_paths: Vec::new(),
            include_dirs: Vec::new(),
            flags: Vec::new(),
            kind,
        }
    }

    /// Attach a compile unit, propagating the artifact's *current* include
    /// directories, flags, and compiler onto it. One-way and attach-time
    /// only: later artifact-level changes do not reach already-attached
    /// units.
    pub fn add_unit(&mut self, id: UnitId, units: &mut UnitRegistry) {
        let unit = units.unit_mut(id);
        for dir in &self.include_dirs {
            unit.add_include_dir(dir.clone());
        }
        unit.add_flags(self.flags.iter().cloned());
        unit.set_compiler(&self.compiler);
        self.units.push(id);
    }

    pub fn add_library(&mut self, lib: impl Into<String>) {
        self.libraries.push(lib.into());
    }

    pub fn add_library_path(&mut self, path: PathBuf) {
        self.library_paths.push(path);
    }

    pub fn add_include_dir(&mut self, dir: PathBuf) {
        self.include_dirs.push(dir);
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) {
        self.flags.push(flag.into());
    }

    pub fn is_test(&self) -> bool {
        self.kind == ArtifactKind::Test
    }

    /// Whether this artifact must be relinked. Tests always are: they must
    /// be re-verified on every build even when nothing changed.
    pub fn needs_recompilation(&self, units: &UnitRegistry) -> bool {
        if self.is_test() {
            return true;
        }

        let Some(output_time) = fs::modified(&self.output) else {
            return true;
        };

        self.units.iter().any(|&id| {
            match fs::modified(&units.unit(id).object) {
                Some(object_time) => object_time > output_time,
                None => true,
            }
        })
    }

    /// Whether linking may be attempted: every owned unit's object file
    /// must already exist on disk.
    pub fn can_build(&self, units: &UnitRegistry) -> bool {
        self.units
            .iter()
            .all(|&id| units.unit(id).object.exists())
    }

    /// Link, and for tests also execute the linked binary.
    ///
    /// Fails fast with an error report if [`Self::can_build`] is false.
    /// A test whose link failed is reported as not passed without being run.
    pub fn build(&self, units: &UnitRegistry, run_dir: &Path) -> BuildReport {
        let mut report = self.link(units);

        if self.is_test() {
            report.test = Some(if report.success {
                self.run(run_dir)
            } else {
                TestRun {
                    passed: false,
                    output: String::new(),
                }
            });
        }

        report
    }

    fn link(&self, units: &UnitRegistry) -> BuildReport {
        if !self.can_build(units) {
            return BuildReport::failed_invocation(
                self.compiler.clone(),
                format!(
                    "error: cannot link '{}' yet, object files are missing",
                    self.name
                ),
            );
        }

        if let Some(parent) = self.output.parent() {
            if let Err(e) = fs::ensure_dir(parent) {
                return BuildReport::failed_invocation(
                    self.compiler.clone(),
                    format!("Failed to create {}: {e}", parent.display()),
                );
            }
        }

        let mut cmd = CommandBuilder::new(&self.compiler)
            .arg("-o")
            .arg(self.output.display().to_string());
        for &id in &self.units {
            cmd = cmd.arg(units.unit(id).object.display().to_string());
        }
        for path in &self.library_paths {
            cmd = cmd.arg(format!("-L{}", path.display()));
        }
        for lib in &self.libraries {
            cmd = cmd.arg(format!("-l{lib}"));
        }
        cmd = cmd.args(self.flags.iter().cloned());

        let command_line = cmd.render();
        tracing::debug!(command = %command_line, "link");

        match cmd.exec_combined() {
            Ok((status, output)) => {
                BuildReport::from_process(command_line, status.success(), &output)
            }
            Err(e) => BuildReport::failed_invocation(
                command_line,
                format!("Failed to execute linker command: {e}"),
            ),
        }
    }

    /// Execute the linked binary with no arguments from `run_dir`, capturing
    /// its combined output.
    fn run(&self, run_dir: &Path) -> TestRun {
        let cmd = CommandBuilder::new(self.output.display().to_string())
            .cwd(run_dir.display().to_string());
        tracing::debug!(test = %self.name, "running test binary");

        match cmd.exec_combined() {
            Ok((status, output)) => TestRun {
                passed: status.success(),
                output,
            },
            Err(e) => TestRun {
                passed: false,
                output: format!("Failed to execute test command: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(root: &Path) -> (UnitRegistry, Artifact) {
        std::fs::write(root.join("a.cpp"), "").unwrap();
        std::fs::write(root.join("b.cpp"), "").unwrap();
        let mut units = UnitRegistry::new(root, Path::new(".out"), &[]);
        let a = units.intern("a.cpp");
        let b = units.intern("b.cpp");
        let mut artifact = Artifact::new("app", root, "g++", ArtifactKind::Binary);
        artifact.add_unit(a, &mut units);
        artifact.add_unit(b, &mut units);
        (units, artifact)
    }

    fn create(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    #[test]
    fn can_build_requires_all_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let (units, artifact) = setup(tmp.path());

        assert!(!artifact.can_build(&units));
        create(&units.unit(artifact.units[0]).object);
        assert!(!artifact.can_build(&units));
        create(&units.unit(artifact.units[1]).object);
        assert!(artifact.can_build(&units));
    }

    #[test]
    fn missing_output_needs_relink() {
        let tmp = tempfile::tempdir().unwrap();
        let (units, artifact) = setup(tmp.path());
        assert!(artifact.needs_recompilation(&units));
    }

    #[test]
    fn tests_always_need_rebuilding() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("t.cpp"), "").unwrap();
        let mut units = UnitRegistry::new(tmp.path(), Path::new(".out"), &[]);
        let t = units.intern("t.cpp");
        let mut test = Artifact::new("t", tmp.path(), "g++", ArtifactKind::Test);
        test.add_unit(t, &mut units);

        create(&units.unit(t).object);
        create(&test.output);
        assert!(test.needs_recompilation(&units));
    }

    #[test]
    fn attach_propagates_flags_and_compiler() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("x.cpp"), "").unwrap();
        let mut units = UnitRegistry::new(tmp.path(), Path::new(".out"), &[]);
        let x = units.intern("x.cpp");

        let mut artifact = Artifact::new("app", tmp.path(), "clang++", ArtifactKind::Binary);
        artifact.add_flag("-O2");
        artifact.add_include_dir(tmp.path().join("inc"));
        artifact.add_unit(x, &mut units);

        let unit = units.unit(x);
        assert_eq!(unit.compiler, "clang++");
        assert!(unit.flags.contains(&"-O2".to_string()));
        assert!(unit.include_dirs.contains(&tmp.path().join("inc")));

        // Attach-time only: later artifact changes do not reach the unit.
        artifact.add_flag("-O3");
        assert!(!units.unit(x).flags.contains(&"-O3".to_string()));
    }

    #[test]
    fn build_fails_fast_without_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let (units, artifact) = setup(tmp.path());

        let report = artifact.build(&units, tmp.path());
        assert!(!report.success);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("cannot link"));
    }

    #[test]
    fn failed_test_link_skips_execution() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("t.cpp"), "").unwrap();
        let mut units = UnitRegistry::new(tmp.path(), Path::new(".out"), &[]);
        let t = units.intern("t.cpp");
        let mut test = Artifact::new("t", tmp.path(), "g++", ArtifactKind::Test);
        test.add_unit(t, &mut units);

        // No object file: link fails fast, the test must not run.
        let report = test.build(&units, tmp.path());
        assert!(!report.success);
        let run = report.test.as_ref().unwrap();
        assert!(!run.passed);
        assert!(run.output.is_empty());
    }
}
