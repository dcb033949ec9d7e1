//! Command dispatch and handler modules.

mod build;
mod clean;
mod init;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build { jobs } => build::exec(jobs),
        Command::Clean => clean::exec(),
        Command::Init { name } => init::exec(name.as_deref()),
    }
}
