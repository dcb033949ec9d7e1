//! High-level operations for the Mason build tool.
//!
//! Wires the CLI to the build model: project assembly from `Mason.toml` and
//! the source tree, the parallel build scheduler, the live progress display,
//! and the clean operation.

pub mod assemble;
pub mod display;
pub mod ops_build;
pub mod ops_clean;
pub mod schedule;
