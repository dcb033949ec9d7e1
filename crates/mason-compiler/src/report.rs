//! Outcome records for compile, link, and test-execution steps.

/// The result of building one compile unit or artifact.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Whether the compiler/linker process exited successfully.
    pub success: bool,
    /// Output lines containing `warning:`.
    pub warnings: Vec<String>,
    /// Output lines containing `error:`.
    pub errors: Vec<String>,
    /// Raw combined process output, prefixed by the invoked command line.
    pub output: String,
    /// Present only for test artifacts: the runtime outcome, captured
    /// separately from the link output.
    pub test: Option<TestRun>,
}

/// Runtime outcome of executing a freshly linked test binary.
#[derive(Debug, Clone)]
pub struct TestRun {
    /// True iff the test process exited with code 0.
    pub passed: bool,
    /// Combined stdout+stderr of the test process.
    pub output: String,
}

impl BuildReport {
    /// Report for an item that required no work.
    pub fn up_to_date() -> Self {
        Self {
            success: true,
            warnings: Vec::new(),
            errors: Vec::new(),
            output: String::new(),
            test: None,
        }
    }

    /// Build a report from a finished toolchain process: classify each output
    /// line as a warning or error by substring, keep the raw output with the
    /// command line prepended.
    pub fn from_process(command: String, success: bool, output: &str) -> Self {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        for line in output.lines() {
            if line.contains("warning:") {
                warnings.push(line.to_string());
            } else if line.contains("error:") {
                errors.push(line.to_string());
            }
        }
        if !success && errors.is_empty() {
            // Some toolchains fail without an "error:" line; keep the raw
            // output as the error so the failure is never silent.
            let raw = output.trim();
            errors.push(if raw.is_empty() {
                "process exited with a failure status".to_string()
            } else {
                raw.to_string()
            });
        }
        Self {
            success,
            warnings,
            errors,
            output: format!("{command}\n{output}"),
            test: None,
        }
    }

    /// Report for a process that could not be started at all.
    pub fn failed_invocation(command: String, message: String) -> Self {
        Self {
            success: false,
            warnings: Vec::new(),
            errors: vec![message.clone()],
            output: format!("{command}\n{message}"),
            test: None,
        }
    }
}
