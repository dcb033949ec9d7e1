//! Build model for the Mason build tool.
//!
//! A project is a set of [`unit::CompileUnit`]s (one source file compiled to
//! one object file) owned by [`artifact::Artifact`]s (linked outputs, some of
//! which are tests). Units are interned in a [`registry::UnitRegistry`] so a
//! source file shared by several artifacts is compiled exactly once.
//! Staleness is decided from file modification times and the transitively
//! discovered header closure; nothing is cached between checks.

pub mod artifact;
pub mod graph;
pub mod headers;
pub mod project;
pub mod registry;
pub mod report;
pub mod unit;
