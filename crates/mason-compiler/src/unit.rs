//! Compile unit: one source file compiled to one object file.

use std::collections::BTreeSet;
use std::path::PathBuf;

use mason_util::process::CommandBuilder;

use crate::registry::UnitId;
use crate::report::BuildReport;

/// A single source file, its object file, and everything needed to compile it.
///
/// Units are created through [`crate::registry::UnitRegistry::intern`], which
/// deduplicates them by normalized source path and discovers the header
/// closure eagerly. Setters are only called during project assembly; a unit
/// is never mutated once scheduling has started.
#[derive(Debug)]
pub struct CompileUnit {
    /// Project-relative display name (the normalized source path).
    pub name: String,
    /// Absolute path to the source file.
    pub source: PathBuf,
    /// Absolute path to the object file this unit produces.
    pub object: PathBuf,
    /// Include search directories, in search order.
    pub include_dirs: Vec<PathBuf>,
    /// Extra compile flags.
    pub flags: Vec<String>,
    /// Compiler driver (e.g. `g++`, `clang++`).
    pub compiler: String,
    /// Transitively discovered header dependencies.
    pub headers: BTreeSet<PathBuf>,
    /// Object-level dependencies on other compile units.
    pub dependencies: Vec<UnitId>,
    /// Warnings produced while scanning headers (unresolved quoted includes).
    pub scan_warnings: Vec<String>,
}

impl CompileUnit {
    pub fn add_include_dir(&mut self, dir: PathBuf) {
        self.include_dirs.push(dir);
    }

    pub fn add_flag(&mut self, flag: impl Into<String>) {
        self.flags.push(flag.into());
    }

    pub fn add_flags(&mut self, flags: impl IntoIterator<Item = impl Into<String>>) {
        self.flags.extend(flags.into_iter().map(Into::into));
    }

    pub fn add_dependency(&mut self, dep: UnitId) {
        self.dependencies.push(dep);
    }

    pub fn set_compiler(&mut self, compiler: impl Into<String>) {
        self.compiler = compiler.into();
    }

    /// Compile this unit's source into its object file.
    ///
    /// Creates the object's parent directory if missing, invokes the
    /// compiler, and classifies the combined output. Failure to even start
    /// the process is reported in the result rather than returned as an
    /// error, so the scheduler handles every outcome the same way.
    pub fn compile(&self) -> BuildReport {
        if let Some(parent) = self.object.parent() {
            if let Err(e) = mason_util::fs::ensure_dir(parent) {
                return BuildReport::failed_invocation(
                    self.compiler.clone(),
                    format!("Failed to create {}: {e}", parent.display()),
                );
            }
        }

        let mut cmd = CommandBuilder::new(&self.compiler)
            .arg("-c")
            .arg(self.source.display().to_string())
            .arg("-o")
            .arg(self.object.display().to_string());
        for dir in &self.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }
        cmd = cmd.args(self.flags.iter().cloned());

        let command_line = cmd.render();
        tracing::debug!(command = %command_line, "compile");

        match cmd.exec_combined() {
            Ok((status, output)) => {
                BuildReport::from_process(command_line, status.success(), &output)
            }
            Err(e) => BuildReport::failed_invocation(
                command_line,
                format!("Failed to execute compile command: {e}"),
            ),
        }
    }
}
