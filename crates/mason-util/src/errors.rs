use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Mason operations.
#[derive(Debug, Error, Diagnostic)]
pub enum MasonError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Mason.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Mason.toml for syntax errors"))]
    Manifest { message: String },

    /// Compilation of a source file failed.
    #[error("Compilation failed: {message}")]
    Compile { message: String },

    /// Linking an output artifact failed.
    #[error("Link failed: {message}")]
    Link { message: String },

    /// The compile-unit dependency graph is not buildable (e.g. a cycle).
    #[error("Dependency graph error: {message}")]
    Graph { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type MasonResult<T> = miette::Result<T>;
