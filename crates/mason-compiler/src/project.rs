//! A fully assembled project: the unit registry plus all artifacts.

use std::path::{Path, PathBuf};

use crate::artifact::Artifact;
use crate::registry::{UnitId, UnitRegistry};

/// Opaque handle to an artifact inside a [`Project`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(usize);

/// Everything the scheduler needs: the interned units and the flat list of
/// artifacts (tests included). Immutable once scheduling starts.
pub struct Project {
    pub root: PathBuf,
    pub units: UnitRegistry,
    artifacts: Vec<Artifact>,
}

impl Project {
    pub fn new(root: &Path, units: UnitRegistry) -> Self {
        Self {
            root: root.to_path_buf(),
            units,
            artifacts: Vec::new(),
        }
    }

    pub fn add_artifact(&mut self, artifact: Artifact) -> ArtifactId {
        let id = ArtifactId(self.artifacts.len());
        self.artifacts.push(artifact);
        id
    }

    pub fn artifact(&self, id: ArtifactId) -> &Artifact {
        &self.artifacts[id.0]
    }

    pub fn artifact_mut(&mut self, id: ArtifactId) -> &mut Artifact {
        &mut self.artifacts[id.0]
    }

    pub fn artifact_ids(&self) -> impl Iterator<Item = ArtifactId> {
        (0..self.artifacts.len()).map(ArtifactId)
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Attach a unit to an artifact, with the usual attach-time propagation
    /// of the artifact's include directories, flags, and compiler.
    pub fn attach_unit(&mut self, artifact: ArtifactId, unit: UnitId) {
        self.artifacts[artifact.0].add_unit(unit, &mut self.units);
    }
}
