//! Watch event types, change kinds, and debounce state

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::Config;

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

/// Tagged source-change kind, mapped from the notify backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Modified,
    Removed,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "Added"),
            ChangeKind::Modified => write!(f, "Modified"),
            ChangeKind::Removed => write!(f, "Removed"),
        }
    }
}

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Resolved configuration (paths, extensions)
    pub config: Config,
    /// Output as NDJSON
    pub json: bool,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        source: String,
    },
    FileChanged {
        kind: ChangeKind,
        path: String,
    },
    BuildComplete {
        compiled: usize,
        removed: usize,
        errors: usize,
    },
    AggregateWritten {
        units: usize,
    },
    Error {
        message: String,
    },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Watcher state for debouncing
///
/// Pending changes are keyed by path; a later event for the same path
/// supersedes the earlier one (a removal after a modify collapses to one
/// removal, a re-add after a removal collapses to one add).
pub(crate) struct WatcherState {
    pending_changes: HashMap<PathBuf, ChangeKind>,
    last_change: Option<Instant>,
}

impl WatcherState {
    pub(crate) fn new() -> Self {
        Self {
            pending_changes: HashMap::new(),
            last_change: None,
        }
    }

    pub(crate) fn add_change(&mut self, path: PathBuf, kind: ChangeKind) {
        self.pending_changes.insert(path, kind);
        self.last_change = Some(Instant::now());
    }

    pub(crate) fn should_flush(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty() && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
        } else {
            false
        }
    }

    pub(crate) fn take_changes(&mut self) -> Vec<(PathBuf, ChangeKind)> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}
