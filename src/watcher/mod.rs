//! File watcher for the continuous build pipeline
//!
//! Implements the `watch` command with:
//! - Debouncing (100ms)
//! - Per-unit incremental compilation into the staging area
//! - Full re-aggregation on every staging change
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

mod event;
mod run;

pub use event::{ChangeKind, WatchEvent, WatchOptions, DEBOUNCE_MS};
pub use run::watch;
