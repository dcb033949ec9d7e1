//! The `clean` operation: remove the manifest's output directory.

use std::path::{Path, PathBuf};

use mason_core::manifest::Manifest;
use mason_util::errors::{MasonError, MasonResult};
use mason_util::progress::status;

pub enum CleanResult {
    /// The output directory was removed.
    Removed(PathBuf),
    /// There was nothing to remove.
    AlreadyClean,
}

/// Delete all build artifacts for the project rooted at `root`.
pub fn clean(root: &Path) -> MasonResult<CleanResult> {
    let manifest = Manifest::from_path(&root.join(mason_core::MANIFEST_FILE))?;
    let output_dir = root.join(&manifest.project.output_dir);

    if !output_dir.exists() {
        status("Clean", "nothing to do");
        return Ok(CleanResult::AlreadyClean);
    }

    std::fs::remove_dir_all(&output_dir).map_err(MasonError::Io)?;
    status("Removed", &output_dir.display().to_string());
    Ok(CleanResult::Removed(output_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with_manifest() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(mason_core::MANIFEST_FILE),
            "[project]\nname = \"app\"\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn removes_output_directory() {
        let dir = project_with_manifest();
        let out = dir.path().join(".out");
        std::fs::create_dir_all(out.join("objects")).unwrap();
        std::fs::write(out.join("objects/main.o"), b"o").unwrap();

        let result = clean(dir.path()).unwrap();
        assert!(matches!(result, CleanResult::Removed(_)));
        assert!(!out.exists());
    }

    #[test]
    fn clean_without_output_is_a_no_op() {
        let dir = project_with_manifest();
        let result = clean(dir.path()).unwrap();
        assert!(matches!(result, CleanResult::AlreadyClean));
    }
}
