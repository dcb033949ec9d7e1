use miette::Result;

use mason_util::errors::MasonError;
use mason_util::fs::find_ancestor_with;

pub fn exec() -> Result<()> {
    let cwd = std::env::current_dir().map_err(MasonError::Io)?;
    let project_root =
        find_ancestor_with(&cwd, mason_core::MANIFEST_FILE).ok_or_else(|| MasonError::Manifest {
            message: "Could not find Mason.toml in current or parent directories".to_string(),
        })?;

    mason_ops::ops_clean::clean(&project_root)?;
    Ok(())
}
