use serde::{Deserialize, Serialize};
use std::path::Path;

use mason_util::errors::{MasonError, MasonResult};

/// The parsed representation of a `Mason.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub project: ProjectMetadata,

    #[serde(default)]
    pub build: BuildConfig,
}

/// Project identity from the `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Output path of the main artifact, relative to the project root
    /// (e.g. `index.cgi`).
    pub name: String,

    /// Compiler/linker driver used for every unit and artifact.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// Directory holding object files, mirroring the source tree.
    #[serde(default = "default_output_dir", rename = "output-dir")]
    pub output_dir: String,
}

/// Build inputs from the `[build]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Compile/link flags applied to every unit and artifact.
    #[serde(default)]
    pub flags: Vec<String>,

    /// Include search directories applied to every unit.
    #[serde(default, rename = "include-paths")]
    pub include_paths: Vec<String>,

    /// Library search directories applied to every artifact.
    #[serde(default, rename = "library-paths")]
    pub library_paths: Vec<String>,

    /// Libraries linked into the main artifact.
    #[serde(default)]
    pub libraries: Vec<String>,

    /// Directories scanned recursively for the main artifact's sources.
    /// `jobs` and `tests` path components are skipped during this scan.
    #[serde(default, rename = "source-dirs")]
    pub source_dirs: Vec<String>,

    /// Directory whose `.cpp` files each become a standalone binary artifact.
    #[serde(default, rename = "jobs-dir")]
    pub jobs_dir: Option<String>,

    /// Directory whose `.cpp` files each become a test artifact.
    #[serde(default, rename = "tests-dir")]
    pub tests_dir: Option<String>,
}

fn default_compiler() -> String {
    "g++".to_string()
}

fn default_output_dir() -> String {
    ".out".to_string()
}

impl Manifest {
    /// Load and parse a `Mason.toml` file from the given path.
    pub fn from_path(path: &Path) -> MasonResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MasonError::Manifest {
                message: format!("Failed to read {}: {e}", path.display()),
            }
        })?;
        Self::parse_toml(&content)
    }

    /// Parse a `Mason.toml` from a string.
    pub fn parse_toml(content: &str) -> MasonResult<Self> {
        toml::from_str(content).map_err(|e| {
            MasonError::Manifest {
                message: format!("Failed to parse Mason.toml: {e}"),
            }
            .into()
        })
    }
}
