//! Watch loop: source watcher + staging watcher, single-threaded dispatch
//!
//! Two independent notify watchers feed one cooperative poll loop: source
//! events drive per-unit compiles into the staging area, staging events
//! drive a full re-aggregation of the output. No worker threads; all work
//! runs on this loop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::aggregate::write_aggregate;
use crate::compiler::ScssCompiler;
use crate::error::{CascadeError, CascadeResult};
use crate::fs::content_hash;
use crate::staging::{Applied, Staging};

use super::event::{ChangeKind, WatchEvent, WatchOptions, WatcherState, DEBOUNCE_MS};

/// Startup settle window: notify sometimes replays events for existing
/// files right after a watcher is registered. Replayed no-op events are
/// suppressed by the content hashes recorded during the initial build;
/// real edits in this window queue like any other change.
const STARTUP_COOLDOWN_MS: u64 = 500;

/// Start watching for source changes
///
/// Fails fast when the source root is absent. Wipes and recreates the
/// staging root, runs one full build plus aggregation, then processes
/// change events until `running` is cleared.
pub fn watch(
    options: WatchOptions,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> CascadeResult<()> {
    let paths = &options.config.paths;
    if !paths.source.is_dir() {
        return Err(CascadeError::SourceRootMissing {
            path: paths.source.clone(),
        });
    }

    event_callback(WatchEvent::WatchStarted {
        source: paths.source.display().to_string(),
    });

    // Staging cleanup must finish before any watcher is registered, else a
    // freshly compiled unit could be deleted by the startup wipe.
    let staging = Staging::from_config(&options.config);
    staging.reset()?;
    let staging = staging.canonicalized()?;

    let compiler = ScssCompiler::new();

    // Initial full build + first aggregate
    let summary = staging.compile_all(&compiler)?;
    for message in &summary.errors {
        event_callback(WatchEvent::Error {
            message: message.clone(),
        });
    }
    event_callback(WatchEvent::BuildComplete {
        compiled: summary.compiled,
        removed: 0,
        errors: summary.errors.len(),
    });
    match write_aggregate(
        staging.staging_root(),
        &paths.output,
        &options.config.build.output_extension,
    ) {
        Ok(units) => event_callback(WatchEvent::AggregateWritten { units }),
        Err(e) => event_callback(WatchEvent::Error {
            message: e.to_string(),
        }),
    }

    // Source watcher: change kinds + paths. Backend errors travel the same
    // channel so the loop can surface them through the event callback.
    let (source_tx, source_rx) = channel();
    let mut source_watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                let kind = match event.kind {
                    EventKind::Create(_) => ChangeKind::Added,
                    EventKind::Modify(_) => ChangeKind::Modified,
                    EventKind::Remove(_) => ChangeKind::Removed,
                    _ => return,
                };
                for path in event.paths {
                    let _ = source_tx.send(Ok((kind, path)));
                }
            }
            Err(e) => {
                let _ = source_tx.send(Err(e.to_string()));
            }
        },
        Config::default(),
    )?;
    source_watcher.watch(staging.source_root(), RecursiveMode::Recursive)?;

    // Staging watcher: any mutation retriggers a full concatenation
    let (staging_tx, staging_rx) = channel();
    let mut staging_watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    let _ = staging_tx.send(Ok(()));
                }
            }
            Err(e) => {
                let _ = staging_tx.send(Err(e.to_string()));
            }
        },
        Config::default(),
    )?;
    staging_watcher.watch(staging.staging_root(), RecursiveMode::Recursive)?;

    let mut state = WatcherState::new();
    // Change detection starts from the hashes the initial build recorded:
    // replayed registration-time events for unchanged files are dropped,
    // while an edit made at any point after its compile is a new hash.
    let mut content_hashes = summary.hashes;

    let handle_source_event = |state: &mut WatcherState,
                               content_hashes: &mut HashMap<PathBuf, String>,
                               kind: ChangeKind,
                               path: PathBuf| {
        // Unit files by extension; removals always pass, so deleted
        // directories of any name lose their staged counterpart.
        let relevant = staging.is_source(&path) || kind == ChangeKind::Removed;
        if relevant && accepts_change(content_hashes, kind, &path) {
            event_callback(WatchEvent::FileChanged {
                kind,
                path: path.display().to_string(),
            });
            state.add_change(path, kind);
        }
    };

    // Startup settle: queue real source edits, drop replayed staging noise
    // (nothing writes the staging area until the loop below flushes).
    let cooldown_end = Instant::now() + Duration::from_millis(STARTUP_COOLDOWN_MS);
    while Instant::now() < cooldown_end {
        match source_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(Ok((kind, path))) => {
                handle_source_event(&mut state, &mut content_hashes, kind, path);
            }
            Ok(Err(message)) => event_callback(WatchEvent::Error {
                message: format!("watch error: {message}"),
            }),
            Err(_) => {}
        }
        while let Ok(signal) = staging_rx.try_recv() {
            if let Err(message) = signal {
                event_callback(WatchEvent::Error {
                    message: format!("watch error: {message}"),
                });
            }
        }
    }

    let mut aggregate_pending: Option<Instant> = None;

    while running.load(Ordering::SeqCst) {
        // Source changes (non-blocking with timeout)
        match source_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(Ok((kind, path))) => {
                handle_source_event(&mut state, &mut content_hashes, kind, path);
            }
            Ok(Err(message)) => event_callback(WatchEvent::Error {
                message: format!("watch error: {message}"),
            }),
            Err(_) => {}
        }

        // Apply debounced source changes through the unit compiler
        if state.should_flush() {
            let mut compiled = 0;
            let mut removed = 0;
            let mut errors = 0;
            for (path, kind) in state.take_changes() {
                match staging.apply_change(&compiler, kind, &path) {
                    Ok(Applied::Compiled(_)) => compiled += 1,
                    Ok(Applied::Removed(_)) => removed += 1,
                    Err(e) => {
                        errors += 1;
                        event_callback(WatchEvent::Error {
                            message: e.to_string(),
                        });
                    }
                }
            }
            event_callback(WatchEvent::BuildComplete {
                compiled,
                removed,
                errors,
            });
        }

        // Staging changes: debounce, then rebuild the aggregate in full
        while let Ok(signal) = staging_rx.try_recv() {
            match signal {
                Ok(()) => aggregate_pending = Some(Instant::now()),
                Err(message) => event_callback(WatchEvent::Error {
                    message: format!("watch error: {message}"),
                }),
            }
        }
        if let Some(last) = aggregate_pending {
            if last.elapsed() >= Duration::from_millis(DEBOUNCE_MS) {
                aggregate_pending = None;
                match write_aggregate(
                    staging.staging_root(),
                    &paths.output,
                    &options.config.build.output_extension,
                ) {
                    Ok(units) => event_callback(WatchEvent::AggregateWritten { units }),
                    Err(e) => event_callback(WatchEvent::Error {
                        message: e.to_string(),
                    }),
                }
            }
        }
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

/// Decide whether a change is worth queueing, updating the hash tracker.
///
/// Add/modify events whose content hash is unchanged are dropped; removal
/// always passes and forgets the hash.
fn accepts_change(
    content_hashes: &mut HashMap<PathBuf, String>,
    kind: ChangeKind,
    path: &Path,
) -> bool {
    match kind {
        ChangeKind::Removed => {
            content_hashes.remove(path);
            true
        }
        ChangeKind::Added | ChangeKind::Modified => match std::fs::read(path) {
            Ok(content) => {
                let new_hash = content_hash(&content);
                if content_hashes.get(path) == Some(&new_hash) {
                    return false;
                }
                content_hashes.insert(path.to_path_buf(), new_hash);
                true
            }
            // Unreadable now (e.g. removed mid-event); let the unit
            // compiler surface the error.
            Err(_) => true,
        },
    }
}
