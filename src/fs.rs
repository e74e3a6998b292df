//! Atomic file writes and content hashing

use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::CascadeResult;

/// Write content to a file atomically
///
/// Uses tempfile-in-parent + rename so readers never observe a partial file.
/// Intermediate directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> CascadeResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Compute SHA-256 hash of content
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}
