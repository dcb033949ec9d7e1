//! The `build` operation: load the manifest, assemble the project graph and
//! drive the scheduler with a live progress display.

use std::path::Path;
use std::time::Instant;

use console::style;
use mason_compiler::report::BuildReport;
use mason_core::manifest::Manifest;
use mason_util::errors::{MasonError, MasonResult};
use mason_util::progress::{status, status_warn};

use crate::assemble;
use crate::display::BuildDisplay;
use crate::schedule::{BuildManager, BuildSummary, ProgressSnapshot};

#[derive(Debug, Default)]
pub struct BuildOptions {
    /// Worker thread count; defaults to the machine's parallelism.
    pub jobs: Option<usize>,
}

/// Build the project rooted at `root` (the directory holding `Mason.toml`).
///
/// Returns the scheduler summary on success. Only a non-test compile or link
/// failure makes this an error; failed tests are reported in the summary and
/// tallied, but leave the invocation successful.
pub fn build(root: &Path, options: &BuildOptions) -> MasonResult<BuildSummary> {
    let started = Instant::now();

    let manifest = Manifest::from_path(&root.join(mason_core::MANIFEST_FILE))?;
    status("Compiling", &format!("{} ({})", manifest.project.name, root.display()));

    let spinner = mason_util::progress::spinner("scanning sources");
    let project = assemble::assemble(root, &manifest)?;
    spinner.finish_and_clear();

    for warning in project.units.scan_warnings() {
        status_warn("Warning", warning);
    }

    let manager = BuildManager::new(&project, options.jobs);
    let mut display = BuildDisplay::new(manager.total_steps());
    let summary = manager.run(|snapshot| {
        let (tests, problems) = summary_lines(snapshot);
        display.update(snapshot.current_step, &snapshot.last_step, &tests, &problems);
    });
    display.finish();

    report_tests(&summary);

    if let Some(fatal) = &summary.fatal {
        if !fatal.output.is_empty() {
            eprintln!("{}", fatal.output.trim_end());
        }
        let message = format!("could not build '{}'", fatal.name);
        return Err(if fatal.link {
            MasonError::Link { message }.into()
        } else {
            MasonError::Compile { message }.into()
        });
    }

    status(
        "Finished",
        &format!(
            "{} step(s) in {:.2}s",
            summary.total_steps,
            started.elapsed().as_secs_f64()
        ),
    );

    Ok(summary)
}

fn summary_lines(snapshot: &ProgressSnapshot) -> (String, String) {
    let tests = format!(
        "Tests: {} {} {}",
        style(format!("{} passed", snapshot.tests_passed)).green(),
        style(format!("{} failed", snapshot.tests_failed)).red(),
        style(format!("{} pending", snapshot.tests_pending)).dim(),
    );
    let problems = format!(
        "{}, {}",
        style(format!("{} warning(s)", snapshot.warnings)).yellow(),
        style(format!("{} error(s)", snapshot.errors)).red(),
    );
    (tests, problems)
}

/// Print each test's verdict and captured output once the build is done.
fn report_tests(summary: &BuildSummary) {
    for (name, report) in &summary.completed {
        let Some(test) = &report.test else { continue };
        if test.passed {
            status("Test", &format!("{name} ... {}", style("ok").green()));
        } else {
            status_warn("Test", &format!("{name} ... {}", style("FAILED").red()));
        }
        let output = test_output(report);
        if !output.is_empty() {
            eprintln!("{}", output.trim_end());
        }
    }
}

/// What to show for one test: the runtime capture, or the link diagnostics
/// when the binary could not be built (the runtime capture is empty then).
fn test_output(report: &BuildReport) -> &str {
    match &report.test {
        Some(test) if report.success => &test.output,
        Some(_) => &report.output,
        None => "",
    }
}
