//! Error types for Cascade
//!
//! Uses `thiserror` for the library error enum; the CLI boundary wraps
//! everything in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Cascade operations
pub type CascadeResult<T> = Result<T, CascadeError>;

/// Main error type for Cascade operations
#[derive(Error, Debug)]
pub enum CascadeError {
    /// Source root is missing at startup. Fatal: the watch cannot be set up.
    #[error("source directory not found: {path}")]
    SourceRootMissing { path: PathBuf },

    /// A single unit failed to compile. Recoverable: the staged output for
    /// that unit is left stale until the next successful compile.
    #[error("failed to compile {file}: {message}")]
    Compile { file: PathBuf, message: String },

    /// Invalid cascade.toml
    #[error("invalid config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Watch backend error
    #[error("watch error: {0}")]
    Notify(#[from] notify::Error),
}
