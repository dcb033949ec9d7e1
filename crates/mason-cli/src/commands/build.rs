use miette::Result;

use mason_ops::ops_build::{self, BuildOptions};
use mason_util::errors::MasonError;
use mason_util::fs::find_ancestor_with;

pub fn exec(jobs: Option<usize>) -> Result<()> {
    let cwd = std::env::current_dir().map_err(MasonError::Io)?;
    let project_root =
        find_ancestor_with(&cwd, mason_core::MANIFEST_FILE).ok_or_else(|| MasonError::Manifest {
            message: "Could not find Mason.toml in current or parent directories".to_string(),
        })?;

    ops_build::build(&project_root, &BuildOptions { jobs })?;
    Ok(())
}
