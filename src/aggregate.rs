//! Full-rebuild aggregation of staged units
//!
//! Every staging-area change triggers a complete re-concatenation of all
//! staged units into the single output file. No incremental patching:
//! correctness over efficiency, the aggregate is a derived view that is
//! always safe to regenerate from scratch.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::CascadeResult;
use crate::fs::atomic_write;

/// List all staged unit files under the staging root, sorted.
///
/// Sorting replaces the host filesystem's unspecified listing order with a
/// deterministic one, so the aggregate is byte-stable across platforms.
pub fn list_units(staging_root: &Path, output_extension: &str) -> CascadeResult<Vec<PathBuf>> {
    if !staging_root.is_dir() {
        return Ok(Vec::new());
    }
    let mut units = Vec::new();
    for entry in WalkBuilder::new(staging_root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
    {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let is_unit = entry
            .path()
            .extension()
            .map(|e| e == output_extension)
            .unwrap_or(false);
        if is_file && is_unit {
            units.push(entry.path().to_path_buf());
        }
    }
    units.sort();
    Ok(units)
}

/// Concatenate every staged unit into the output file, overwriting it in
/// full. Returns the number of units aggregated.
///
/// Unit contents are joined verbatim, with no separator between them: the
/// aggregate is exactly the bytes of the staged units in sorted order. An
/// empty staging root produces an empty output. The write is atomic, so a
/// failure leaves the previous aggregate in its last-good state.
pub fn write_aggregate(
    staging_root: &Path,
    output: &Path,
    output_extension: &str,
) -> CascadeResult<usize> {
    let units = list_units(staging_root, output_extension)?;

    let mut combined = String::new();
    for unit in &units {
        let css = std::fs::read_to_string(unit)?;
        combined.push_str(&css);
    }

    atomic_write(output, combined.as_bytes())?;
    Ok(units.len())
}
