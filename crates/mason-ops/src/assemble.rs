//! Project assembly: manifest + source tree -> build graph.
//!
//! Scans the configured source directories for the main artifact, turns each
//! file under the jobs/tests directories into its own binary/test artifact,
//! applies in-source directives, and layers the manifest-wide flags onto
//! every artifact and unit. Ends by rejecting dependency cycles.

use std::path::{Path, PathBuf};

use mason_compiler::artifact::{Artifact, ArtifactKind};
use mason_compiler::graph;
use mason_compiler::project::{ArtifactId, Project};
use mason_compiler::registry::UnitRegistry;
use mason_core::directives::Directives;
use mason_core::manifest::Manifest;
use mason_util::errors::MasonResult;

/// Assemble the full build graph for the project rooted at `root`.
pub fn assemble(root: &Path, manifest: &Manifest) -> MasonResult<Project> {
    let include_dirs: Vec<PathBuf> = manifest
        .build
        .include_paths
        .iter()
        .map(PathBuf::from)
        .collect();
    let units = UnitRegistry::new(
        root,
        Path::new(&manifest.project.output_dir),
        &include_dirs,
    );
    let mut project = Project::new(root, units);

    // Main artifact: every source under source-dirs, skipping jobs/ and
    // tests/ subtrees, which get their own artifacts below.
    let main_id = project.add_artifact(Artifact::new(
        &manifest.project.name,
        root,
        &manifest.project.compiler,
        ArtifactKind::Binary,
    ));
    let mut main_sources = Vec::new();
    for dir in &manifest.build.source_dirs {
        collect_sources(&root.join(dir), true, &mut main_sources);
    }
    main_sources.sort();
    for source in &main_sources {
        let unit = project.units.intern(source);
        project.attach_unit(main_id, unit);
    }

    if let Some(jobs_dir) = &manifest.build.jobs_dir {
        add_standalone_artifacts(&mut project, manifest, jobs_dir, ArtifactKind::Binary)?;
    }
    if let Some(tests_dir) = &manifest.build.tests_dir {
        add_standalone_artifacts(&mut project, manifest, tests_dir, ArtifactKind::Test)?;
    }

    // Manifest-wide configuration: flags and library paths go to every
    // artifact, flags to every unit (units got the include dirs when they
    // were interned), libraries only to the main artifact.
    let artifact_ids: Vec<ArtifactId> = project.artifact_ids().collect();
    for id in artifact_ids {
        let artifact = project.artifact_mut(id);
        for flag in &manifest.build.flags {
            artifact.add_flag(flag);
        }
        for path in &manifest.build.library_paths {
            artifact.add_library_path(root.join(path));
        }
    }
    let unit_ids: Vec<_> = project.units.ids().collect();
    for id in unit_ids {
        let unit = project.units.unit_mut(id);
        unit.add_flags(manifest.build.flags.iter().cloned());
        unit.set_compiler(&manifest.project.compiler);
    }
    for lib in &manifest.build.libraries {
        project.artifact_mut(main_id).add_library(lib);
    }

    graph::validate_acyclic(&project.units)?;
    Ok(project)
}

/// One artifact per source file under `dir`, named by its path relative to
/// `dir`'s parent with the extension stripped (so `app/jobs/reindex.cpp`
/// becomes the binary `jobs/reindex`).
fn add_standalone_artifacts(
    project: &mut Project,
    manifest: &Manifest,
    dir: &str,
    kind: ArtifactKind,
) -> MasonResult<()> {
    let dir_path = project.root.join(dir);
    let name_base = project.root.join(Path::new(dir).parent().unwrap_or(Path::new("")));

    let mut sources = Vec::new();
    collect_sources(&dir_path, false, &mut sources);
    sources.sort();

    for source in sources {
        let name = source
            .strip_prefix(&name_base)
            .unwrap_or(&source)
            .with_extension("")
            .display()
            .to_string();

        let root = project.root.clone();
        let id = project.add_artifact(Artifact::new(
            name,
            &root,
            &manifest.project.compiler,
            kind,
        ));

        let main_unit = project.units.intern(&source);
        project.attach_unit(id, main_unit);

        let directives = Directives::from_file(&source)?;
        for extra in &directives.sources {
            let unit = project.units.intern(extra);
            project.attach_unit(id, unit);
        }

        {
            let artifact = project.artifact_mut(id);
            for flag in &directives.flags {
                artifact.add_flag(flag);
            }
            for lib in &directives.libraries {
                artifact.add_library(lib);
            }
            for path in &directives.library_paths {
                artifact.add_library_path(root.join(path));
            }
            for inc in &directives.include_paths {
                artifact.add_include_dir(root.join(inc));
            }
        }

        // Directive flags and include paths also reach the units directly;
        // attach-time propagation has already happened by this point.
        let unit_ids = project.artifact(id).units.clone();
        for unit_id in unit_ids {
            let unit = project.units.unit_mut(unit_id);
            unit.add_flags(directives.flags.iter().cloned());
            for inc in &directives.include_paths {
                unit.add_include_dir(root.join(inc));
            }
        }
    }
    Ok(())
}

/// Recursively collect C++ sources. With `skip_special`, directories named
/// `jobs` or `tests` are not descended into.
fn collect_sources(dir: &Path, skip_special: bool, out: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if skip_special
                && path
                    .file_name()
                    .is_some_and(|n| n == "jobs" || n == "tests")
            {
                continue;
            }
            collect_sources(&path, skip_special, out);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "cpp" || ext == "cc" || ext == "cxx")
        {
            out.push(path);
        }
    }
}
