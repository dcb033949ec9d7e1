//! The parallel build scheduler.
//!
//! A fixed pool of worker threads repeatedly selects buildable work under a
//! single lock and runs the compile/link/test step outside it. Every work
//! item moves through exactly one path: `to_build -> building -> built`; a
//! failed build still ends in `built`, carrying a failing report. Dependency
//! ordering is not sequenced explicitly; it falls out of the
//! `needs_recompilation`/`can_build` gating, so a unit with unmet
//! dependencies is simply never selected until they are done.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use mason_compiler::project::{ArtifactId, Project};
use mason_compiler::registry::UnitId;
use mason_compiler::report::BuildReport;

/// How long a worker backs off when all remaining work is blocked on
/// in-flight dependencies.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// How often the monitor thread refreshes the progress display.
const MONITOR_INTERVAL: Duration = Duration::from_millis(20);

/// One schedulable item: a compile unit or a linked artifact (tests are
/// artifacts too).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem {
    Unit(UnitId),
    Artifact(ArtifactId),
}

/// Counter snapshot pushed to the progress display.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub current_step: usize,
    pub total_steps: usize,
    pub warnings: usize,
    pub errors: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    pub tests_pending: usize,
    pub last_step: String,
}

/// A non-test build failure that aborts the whole build.
#[derive(Debug, Clone)]
pub struct FatalFailure {
    pub name: String,
    pub output: String,
    /// True when the failing step was a link rather than a compile.
    pub link: bool,
}

/// Final report of one scheduler run.
#[derive(Debug)]
pub struct BuildSummary {
    /// Every completed item with its report, in completion order.
    pub completed: Vec<(String, BuildReport)>,
    pub warnings: usize,
    pub errors: usize,
    pub tests_passed: usize,
    pub tests_failed: usize,
    /// Set iff a non-test item failed; the build stopped scheduling new work
    /// once this was recorded.
    pub fatal: Option<FatalFailure>,
    pub total_steps: usize,
}

struct SchedulerState {
    to_build: Vec<WorkItem>,
    building: Vec<WorkItem>,
    built: Vec<(WorkItem, BuildReport)>,
    total_steps: usize,
    current_step: usize,
    warnings: usize,
    errors: usize,
    tests_passed: usize,
    tests_failed: usize,
    tests_pending: usize,
    last_step: String,
    fatal: Option<FatalFailure>,
}

/// Orchestrates one build of a [`Project`] across a worker pool.
pub struct BuildManager<'p> {
    project: &'p Project,
    state: Mutex<SchedulerState>,
    workers: usize,
}

impl<'p> BuildManager<'p> {
    /// Prepare a build: deduplicated units reachable from every artifact,
    /// plus the artifacts themselves, all starting in `to_build`. Artifacts
    /// that are already fresh move straight to `built` and pre-advance the
    /// step counter; tests never do (they always re-run).
    pub fn new(project: &'p Project, jobs: Option<usize>) -> Self {
        let workers = jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        });

        let mut unit_set: Vec<UnitId> = Vec::new();
        for id in project.artifact_ids() {
            for &unit in &project.artifact(id).units {
                if !unit_set.contains(&unit) {
                    unit_set.push(unit);
                }
            }
        }

        let mut state = SchedulerState {
            to_build: unit_set.into_iter().map(WorkItem::Unit).collect(),
            building: Vec::new(),
            built: Vec::new(),
            total_steps: 0,
            current_step: 0,
            warnings: 0,
            errors: 0,
            tests_passed: 0,
            tests_failed: 0,
            tests_pending: 0,
            last_step: "Building...".to_string(),
            fatal: None,
        };

        for id in project.artifact_ids() {
            let artifact = project.artifact(id);
            if artifact.is_test() {
                state.tests_pending += 1;
            }
            // An artifact is only settled up front when neither it nor any
            // of its units has pending work; a recompiled unit makes the
            // artifact stale again mid-build.
            let settled = !artifact.needs_recompilation(&project.units)
                && artifact
                    .units
                    .iter()
                    .all(|&unit| !project.units.needs_recompilation(unit));
            if settled {
                state.built.push((WorkItem::Artifact(id), BuildReport::up_to_date()));
                state.current_step += 1;
            } else {
                state.to_build.push(WorkItem::Artifact(id));
            }
        }
        state.total_steps = state.to_build.len() + state.built.len();

        Self {
            project,
            state: Mutex::new(state),
            workers,
        }
    }

    pub fn total_steps(&self) -> usize {
        self.locked().total_steps
    }

    /// Run the build to completion. `on_progress` is called from the calling
    /// thread every [`MONITOR_INTERVAL`] with fresh counters; the returned
    /// summary reflects the final state after all workers have joined.
    pub fn run(self, mut on_progress: impl FnMut(&ProgressSnapshot)) -> BuildSummary {
        std::thread::scope(|scope| {
            for _ in 0..self.workers {
                scope.spawn(|| self.worker());
            }

            loop {
                let snapshot = {
                    let state = self.locked();
                    if state.current_step >= state.total_steps || state.fatal.is_some() {
                        break;
                    }
                    snapshot(&state)
                };
                on_progress(&snapshot);
                std::thread::sleep(MONITOR_INTERVAL);
            }
        });

        // Workers are joined; the final snapshot is stable.
        let project = self.project;
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        on_progress(&snapshot(&state));

        debug_assert!(state.building.is_empty());
        debug_assert!(state.fatal.is_some() || state.to_build.is_empty());

        let name_of = |item: WorkItem| match item {
            WorkItem::Unit(id) => project.units.unit(id).name.clone(),
            WorkItem::Artifact(id) => project.artifact(id).name.clone(),
        };
        BuildSummary {
            completed: state
                .built
                .into_iter()
                .map(|(item, report)| (name_of(item), report))
                .collect(),
            warnings: state.warnings,
            errors: state.errors,
            tests_passed: state.tests_passed,
            tests_failed: state.tests_failed,
            fatal: state.fatal,
            total_steps: state.total_steps,
        }
    }

    fn worker(&self) {
        loop {
            let selected = {
                let mut state = self.locked();
                if state.to_build.is_empty() || state.fatal.is_some() {
                    return;
                }
                self.select(&mut state)
            };

            let Some(item) = selected else {
                // Everything left is waiting on an in-flight dependency.
                std::thread::sleep(RETRY_BACKOFF);
                continue;
            };

            let outcome = catch_unwind(AssertUnwindSafe(|| self.build_item(item)));

            let mut state = self.locked();
            state.building.retain(|other| *other != item);
            match outcome {
                Ok(report) => self.complete(&mut state, item, report),
                Err(panic) => {
                    let message = panic_message(panic);
                    let name = self.item_name(item);
                    tracing::warn!(item = %name, %message, "build step panicked");
                    let report = BuildReport::failed_invocation(name, message);
                    self.complete(&mut state, item, report);
                }
            }
        }
    }

    /// Selection under the lock. Artifacts are preferred over units whenever
    /// one is eligible, to unblock link steps (and the tests behind them) as
    /// early as possible. Units that turn out fresh are retired on the spot
    /// without a build.
    fn select(&self, state: &mut SchedulerState) -> Option<WorkItem> {
        let units = &self.project.units;

        if let Some(pos) = state.to_build.iter().position(|item| match item {
            WorkItem::Artifact(id) => {
                let artifact = self.project.artifact(*id);
                artifact.needs_recompilation(units) && artifact.can_build(units)
            }
            WorkItem::Unit(_) => false,
        }) {
            let item = state.to_build.remove(pos);
            state.building.push(item);
            return Some(item);
        }

        let mut i = 0;
        while i < state.to_build.len() {
            let item = state.to_build[i];
            if let WorkItem::Unit(id) = item {
                state.to_build.remove(i);
                if units.needs_recompilation(id) {
                    state.building.push(item);
                    return Some(item);
                }
                // Fresh unit: already complete, no compiler invocation.
                state.built.push((item, BuildReport::up_to_date()));
                state.current_step += 1;
                continue;
            }
            i += 1;
        }
        None
    }

    /// The expensive step, run outside the lock.
    fn build_item(&self, item: WorkItem) -> BuildReport {
        match item {
            WorkItem::Unit(id) => self.project.units.unit(id).compile(),
            WorkItem::Artifact(id) => self
                .project
                .artifact(id)
                .build(&self.project.units, &self.project.root),
        }
    }

    fn complete(&self, state: &mut SchedulerState, item: WorkItem, report: BuildReport) {
        state.current_step += 1;
        state.warnings += report.warnings.len();
        state.errors += report.errors.len();

        let name = self.item_name(item);
        let is_test = matches!(item, WorkItem::Artifact(id) if self.project.artifact(id).is_test());

        if is_test {
            state.tests_pending -= 1;
            let passed = report.test.as_ref().is_some_and(|t| t.passed);
            if passed {
                state.tests_passed += 1;
                state.last_step = format!("Test {name} OK");
            } else {
                state.tests_failed += 1;
                state.last_step = format!("Test {name} failed");
            }
        } else if report.errors.is_empty() {
            state.last_step = format!("Built {name}");
        } else {
            // Fatal: no new work is handed out after this.
            tracing::error!(item = %name, "build failed");
            state.last_step = format!("Failed to build {name}");
            state.fatal = Some(FatalFailure {
                name,
                output: report.output.clone(),
                link: matches!(item, WorkItem::Artifact(_)),
            });
        }

        state.built.push((item, report));
    }

    fn item_name(&self, item: WorkItem) -> String {
        match item {
            WorkItem::Unit(id) => self.project.units.unit(id).name.clone(),
            WorkItem::Artifact(id) => self.project.artifact(id).name.clone(),
        }
    }

    fn locked(&self) -> MutexGuard<'_, SchedulerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn snapshot(state: &SchedulerState) -> ProgressSnapshot {
    ProgressSnapshot {
        current_step: state.current_step,
        total_steps: state.total_steps,
        warnings: state.warnings,
        errors: state.errors,
        tests_passed: state.tests_passed,
        tests_failed: state.tests_failed,
        tests_pending: state.tests_pending,
        last_step: state.last_step.clone(),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
