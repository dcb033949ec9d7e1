//! CLI argument definitions for Mason.
//!
//! Uses `clap` derive macros to define the full command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "mason",
    version,
    about = "An incremental parallel build tool for C++ projects",
    long_about = "Mason builds C++ projects described by a Mason.toml manifest: it tracks \
                  header dependencies for incremental rebuilds, compiles units across a \
                  worker pool, links binaries and runs test executables."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project (compile stale units, link artifacts, run tests)
    Build {
        /// Number of worker threads (defaults to the number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Remove build artifacts
    Clean,

    /// Initialize a Mason project in the current directory
    Init {
        /// Output name of the main artifact
        #[arg(short, long)]
        name: Option<String>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
