use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;

use cascade::watcher::{watch, ChangeKind, WatchEvent, WatchOptions};

use crate::cli::PathArgs;
use crate::commands::resolve_config;

pub fn cmd_watch(paths: PathArgs, json: bool) -> Result<()> {
    let config = resolve_config(paths);

    let options = WatchOptions { config, json };

    // Ctrl+C clears the running flag; the loop drains and shuts down
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();
    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })?;

    watch(options, running, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
            let rendered = render_watch_event(&timestamp, &event);
            match event {
                WatchEvent::Error { .. } => eprint!("{rendered}"),
                _ => print!("{rendered}"),
            }
        }
    })?;

    Ok(())
}

/// One timestamped line per event
fn render_watch_event(timestamp: &str, event: &WatchEvent) -> String {
    let prefix = format!("[{timestamp}]");

    match event {
        WatchEvent::WatchStarted { source } => {
            format!("{prefix} Watching: {source} (Ctrl+C to stop)\n")
        }
        WatchEvent::FileChanged { kind, path } => {
            let label = match kind {
                ChangeKind::Added => "Added",
                ChangeKind::Modified => "Changed",
                ChangeKind::Removed => "Removed",
            };
            format!("{prefix} {label}: {path}\n")
        }
        WatchEvent::BuildComplete {
            compiled,
            removed,
            errors,
        } => {
            if *errors > 0 {
                format!("{prefix} Build: {compiled} compiled, {removed} removed, {errors} errors\n")
            } else {
                format!("{prefix} Build: {compiled} compiled, {removed} removed\n")
            }
        }
        WatchEvent::AggregateWritten { units } => {
            format!("{prefix} Aggregated {units} units\n")
        }
        WatchEvent::Error { message } => format!("{prefix} Error: {message}\n"),
        WatchEvent::Shutdown => format!("\n{prefix} Watch stopped.\n"),
    }
}
