//! Unit interning and cross-unit staleness walks.
//!
//! The registry owns every [`CompileUnit`] in a project and guarantees one
//! unit per lexically normalized source path, so two artifacts naming the
//! same file share a single compilation. It is passed around explicitly;
//! there is no process-wide unit cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mason_util::fs;

use crate::headers;
use crate::unit::CompileUnit;

/// Opaque handle to a compile unit inside a [`UnitRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

pub struct UnitRegistry {
    root: PathBuf,
    object_root: PathBuf,
    default_include_dirs: Vec<PathBuf>,
    units: Vec<CompileUnit>,
    by_path: HashMap<PathBuf, UnitId>,
}

impl UnitRegistry {
    /// Create a registry for a project rooted at `root`. Object files go
    /// under `object_root`, mirroring the source tree; `include_dirs` are
    /// the project-wide include directories (root-relative or absolute) used
    /// both for header discovery and as `-I` flags on every unit.
    pub fn new(root: &Path, object_root: &Path, include_dirs: &[PathBuf]) -> Self {
        let abs = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                fs::normalize_lexically(&root.join(p))
            }
        };
        Self {
            root: root.to_path_buf(),
            object_root: root.join(object_root),
            default_include_dirs: include_dirs.iter().map(abs).collect(),
            units: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    /// Intern a source file, returning the existing unit if the normalized
    /// path was seen before. New units get the project-wide include
    /// directories and an eagerly discovered header closure.
    pub fn intern(&mut self, source: impl AsRef<Path>) -> UnitId {
        let source = source.as_ref();
        let rel = match source.strip_prefix(&self.root) {
            Ok(stripped) => fs::normalize_lexically(stripped),
            Err(_) => fs::normalize_lexically(source),
        };

        if let Some(&id) = self.by_path.get(&rel) {
            return id;
        }

        let name = rel.display().to_string();
        let source_abs = if rel.is_absolute() {
            rel.clone()
        } else {
            self.root.join(&rel)
        };
        let object = self.object_root.join(format!("{name}.o"));

        let scan = headers::scan(&source_abs, &self.default_include_dirs);

        let id = UnitId(self.units.len());
        self.units.push(CompileUnit {
            name,
            source: source_abs,
            object,
            include_dirs: self.default_include_dirs.clone(),
            flags: Vec::new(),
            compiler: "g++".to_string(),
            headers: scan.headers,
            dependencies: Vec::new(),
            scan_warnings: scan.warnings,
        });
        self.by_path.insert(rel, id);
        id
    }

    pub fn unit(&self, id: UnitId) -> &CompileUnit {
        &self.units[id.0]
    }

    pub fn unit_mut(&mut self, id: UnitId) -> &mut CompileUnit {
        &mut self.units[id.0]
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitId> {
        (0..self.units.len()).map(UnitId)
    }

    /// Header-scan warnings from every interned unit, in intern order.
    pub fn scan_warnings(&self) -> impl Iterator<Item = &String> {
        self.units.iter().flat_map(|unit| unit.scan_warnings.iter())
    }

    /// Whether a unit must be recompiled. Checked fresh on every call:
    /// object missing, source newer than object, any object-level dependency
    /// stale (or its object newer than ours), or any header in the closure
    /// newer than the object.
    pub fn needs_recompilation(&self, id: UnitId) -> bool {
        let unit = self.unit(id);

        let Some(object_time) = fs::modified(&unit.object) else {
            return true;
        };

        if fs::modified(&unit.source).is_some_and(|t| t > object_time) {
            return true;
        }

        for &dep in &unit.dependencies {
            if self.needs_recompilation(dep) {
                return true;
            }
            if fs::modified(&self.unit(dep).object).is_some_and(|t| t > object_time) {
                return true;
            }
        }

        unit.headers
            .iter()
            .any(|h| fs::modified(h).is_some_and(|t| t > object_time))
    }

    /// Whether a unit may attempt to build: all of its object-level
    /// dependencies must themselves be buildable. A unit with no
    /// dependencies always can.
    pub fn can_build(&self, id: UnitId) -> bool {
        self.unit(id)
            .dependencies
            .iter()
            .all(|&dep| self.can_build(dep))
    }
}
