//! Core data types for the Mason build tool.
//!
//! Defines the `Mason.toml` manifest and the in-source macro directives
//! (`FLAG`, `SOURCE`, ...) that job and test sources use to extend their
//! own build configuration.

pub mod directives;
pub mod manifest;

/// Name of the project manifest file Mason looks for.
pub const MANIFEST_FILE: &str = "Mason.toml";
