//! Shared utilities for the Mason build tool.
//!
//! This crate provides cross-cutting concerns used by all other Mason crates:
//! error types, filesystem helpers, process spawning, and terminal status
//! output.

pub mod errors;
pub mod fs;
pub mod process;
pub mod progress;
