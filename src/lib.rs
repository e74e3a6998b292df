//! Cascade - incremental stylesheet build watcher
//!
//! Cascade watches a tree of SCSS sources, compiles each changed unit
//! independently into a staging area that mirrors the source layout, and
//! concatenates every staged unit into one output stylesheet whenever the
//! staging area changes. The staging area acts as a cache of
//! independently-compiled units: editing one source recompiles one unit,
//! only the concatenation is redone in full.

pub mod aggregate;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fs;
pub mod staging;
pub mod watcher;

// Re-exports for convenience
pub use compiler::{Compiler, ScssCompiler};
pub use config::Config;
pub use error::{CascadeError, CascadeResult};
pub use staging::{Applied, BuildSummary, Staging};
pub use watcher::{watch, ChangeKind, WatchEvent, WatchOptions};
