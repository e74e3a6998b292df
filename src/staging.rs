//! Staged unit lifecycle
//!
//! One staged unit per source file, stored at the source's mirrored path
//! under the staging root (root-prefix swap + extension swap). The staging
//! root is fully owned by this module: wiped on startup, written by the unit
//! compiler, read only by the aggregator.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::compiler::Compiler;
use crate::config::{BuildConfig, Config};
use crate::error::CascadeResult;
use crate::fs::{atomic_write, content_hash};
use crate::watcher::ChangeKind;

/// Outcome of applying one source change to the staging area
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Compiled(PathBuf),
    Removed(PathBuf),
}

/// Counters for a full or incremental build pass
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub compiled: usize,
    pub removed: usize,
    pub errors: Vec<String>,
    /// Content hash of each source as this pass saw it. Seeds the watch
    /// loop's change detection, so an edit landing after the build is
    /// always observed as a change.
    pub hashes: HashMap<PathBuf, String>,
}

/// The staging area and its path mapping
#[derive(Debug, Clone)]
pub struct Staging {
    source_root: PathBuf,
    staging_root: PathBuf,
    source_extension: String,
    output_extension: String,
}

impl Staging {
    pub fn new(source_root: PathBuf, staging_root: PathBuf, build: &BuildConfig) -> Self {
        Self {
            source_root,
            staging_root,
            source_extension: build.source_extension.clone(),
            output_extension: build.output_extension.clone(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.paths.source.clone(),
            config.paths.staging.clone(),
            &config.build,
        )
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn staging_root(&self) -> &Path {
        &self.staging_root
    }

    /// Whether a path qualifies as a source unit (extension filter)
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension()
            .map(|e| e == self.source_extension.as_str())
            .unwrap_or(false)
    }

    /// Mirror a source path into the staging tree.
    ///
    /// The source-root prefix is replaced with the staging root; the source
    /// extension is replaced with the output extension. Directory paths (no
    /// source extension) map with their name unchanged, so removal events
    /// for directories resolve to the mirrored staged directory.
    pub fn unit_path(&self, source: &Path) -> PathBuf {
        let rel = match source.strip_prefix(&self.source_root) {
            Ok(rel) => rel.to_path_buf(),
            Err(_) => PathBuf::from(source.file_name().unwrap_or_default()),
        };
        let mut staged = self.staging_root.join(rel);
        if self.is_source(source) {
            staged.set_extension(&self.output_extension);
        }
        staged
    }

    /// Wipe and recreate the staging root.
    ///
    /// Must complete before any watcher is registered: a compile racing the
    /// startup cleanup could have its freshly staged unit deleted.
    pub fn reset(&self) -> CascadeResult<()> {
        if self.staging_root.exists() {
            std::fs::remove_dir_all(&self.staging_root)?;
        }
        std::fs::create_dir_all(&self.staging_root)?;
        Ok(())
    }

    /// Canonicalize both roots so that watcher-delivered absolute paths
    /// strip cleanly against the source root. Both directories must exist.
    pub fn canonicalized(mut self) -> CascadeResult<Self> {
        self.source_root = self.source_root.canonicalize()?;
        self.staging_root = self.staging_root.canonicalize()?;
        Ok(self)
    }

    /// Compile one source unit into its staged counterpart.
    ///
    /// The staged file is replaced in full via an atomic write. On failure
    /// any prior staged content is left untouched (stale) until the next
    /// successful compile.
    pub fn compile_unit(&self, compiler: &dyn Compiler, source: &Path) -> CascadeResult<PathBuf> {
        let css = compiler.compile(source)?;
        let staged = self.unit_path(source);
        atomic_write(&staged, css.as_bytes())?;
        Ok(staged)
    }

    /// Delete the staged counterpart of a removed source path.
    ///
    /// Recursive for directories; an already-absent target is success.
    pub fn remove_unit(&self, source: &Path) -> CascadeResult<PathBuf> {
        let staged = self.unit_path(source);
        let result = if staged.is_dir() {
            std::fs::remove_dir_all(&staged)
        } else {
            std::fs::remove_file(&staged)
        };
        match result {
            Ok(()) => Ok(staged),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(staged),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply one change event: compile on add/modify, delete on removal
    pub fn apply_change(
        &self,
        compiler: &dyn Compiler,
        kind: ChangeKind,
        path: &Path,
    ) -> CascadeResult<Applied> {
        match kind {
            ChangeKind::Added | ChangeKind::Modified => {
                self.compile_unit(compiler, path).map(Applied::Compiled)
            }
            ChangeKind::Removed => self.remove_unit(path).map(Applied::Removed),
        }
    }

    /// List all source units under the source root, sorted
    pub fn list_sources(&self) -> CascadeResult<Vec<PathBuf>> {
        let mut sources = Vec::new();
        for entry in WalkBuilder::new(&self.source_root)
            .hidden(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .build()
        {
            let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file && self.is_source(entry.path()) {
                sources.push(entry.path().to_path_buf());
            }
        }
        sources.sort();
        Ok(sources)
    }

    /// Compile every source unit; per-unit failures are collected, not fatal
    pub fn compile_all(&self, compiler: &dyn Compiler) -> CascadeResult<BuildSummary> {
        let mut summary = BuildSummary::default();
        for source in self.list_sources()? {
            // hash before compiling: if the file changes mid-pass the stored
            // hash is the older one and the next event recompiles
            if let Ok(content) = std::fs::read(&source) {
                summary.hashes.insert(source.clone(), content_hash(&content));
            }
            match self.compile_unit(compiler, &source) {
                Ok(_) => summary.compiled += 1,
                Err(e) => summary.errors.push(e.to_string()),
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::FakeCompiler;
    use std::fs;
    use tempfile::tempdir;

    fn staging_at(root: &Path) -> Staging {
        Staging::new(
            root.join("src"),
            root.join("stage"),
            &BuildConfig::default(),
        )
    }

    #[test]
    fn unit_path_swaps_root_and_extension() {
        let staging = staging_at(Path::new("/project"));
        assert_eq!(
            staging.unit_path(Path::new("/project/src/a.scss")),
            PathBuf::from("/project/stage/a.css")
        );
    }

    #[test]
    fn unit_path_mirrors_nested_directories() {
        let staging = staging_at(Path::new("/project"));
        assert_eq!(
            staging.unit_path(Path::new("/project/src/widgets/button.scss")),
            PathBuf::from("/project/stage/widgets/button.css")
        );
    }

    #[test]
    fn unit_path_keeps_directory_names_unchanged() {
        let staging = staging_at(Path::new("/project"));
        assert_eq!(
            staging.unit_path(Path::new("/project/src/widgets")),
            PathBuf::from("/project/stage/widgets")
        );
    }

    #[test]
    fn reset_wipes_stale_units() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        fs::create_dir_all(staging.staging_root()).unwrap();
        fs::write(staging.staging_root().join("stale.css"), "old{}").unwrap();

        staging.reset().unwrap();

        assert!(staging.staging_root().exists());
        assert!(!staging.staging_root().join("stale.css").exists());
    }

    #[test]
    fn compile_unit_writes_mirrored_output() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        let source = dir.path().join("src/cards/hero.scss");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "hero{}").unwrap();

        let staged = staging.compile_unit(&FakeCompiler, &source).unwrap();

        assert_eq!(staged, dir.path().join("stage/cards/hero.css"));
        assert_eq!(fs::read_to_string(&staged).unwrap(), "hero{}");
    }

    #[test]
    fn compile_unit_is_idempotent() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        let source = dir.path().join("src/a.scss");
        fs::create_dir_all(source.parent().unwrap()).unwrap();
        fs::write(&source, "a{}").unwrap();

        let first = staging.compile_unit(&FakeCompiler, &source).unwrap();
        let before = fs::read(&first).unwrap();
        staging.compile_unit(&FakeCompiler, &source).unwrap();

        assert_eq!(fs::read(&first).unwrap(), before);
    }

    #[test]
    fn compile_failure_leaves_staged_unit_stale() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        let source = dir.path().join("src/a.scss");
        fs::create_dir_all(source.parent().unwrap()).unwrap();

        fs::write(&source, "a{good}").unwrap();
        let staged = staging.compile_unit(&FakeCompiler, &source).unwrap();

        fs::write(&source, "!error").unwrap();
        assert!(staging.compile_unit(&FakeCompiler, &source).is_err());

        // last good content survives
        assert_eq!(fs::read_to_string(&staged).unwrap(), "a{good}");
    }

    #[test]
    fn remove_unit_is_idempotent() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();

        // nothing staged yet: still success
        staging
            .remove_unit(&dir.path().join("src/ghost.scss"))
            .unwrap();
    }

    #[test]
    fn remove_unit_deletes_staged_file_only() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        fs::write(staging.staging_root().join("a.css"), "a{}").unwrap();
        fs::write(staging.staging_root().join("b.css"), "b{}").unwrap();

        staging.remove_unit(&dir.path().join("src/a.scss")).unwrap();

        assert!(!staging.staging_root().join("a.css").exists());
        assert!(staging.staging_root().join("b.css").exists());
    }

    #[test]
    fn remove_unit_deletes_staged_directory_recursively() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        let nested = staging.staging_root().join("widgets");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("button.css"), "b{}").unwrap();

        staging.remove_unit(&dir.path().join("src/widgets")).unwrap();

        assert!(!nested.exists());
    }

    #[test]
    fn compile_all_collects_per_unit_errors() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        fs::create_dir_all(dir.path().join("src/b")).unwrap();
        fs::write(dir.path().join("src/a.scss"), "a{}").unwrap();
        fs::write(dir.path().join("src/b/c.scss"), "c{}").unwrap();
        fs::write(dir.path().join("src/bad.scss"), "!error").unwrap();
        fs::write(dir.path().join("src/notes.txt"), "ignored").unwrap();

        let summary = staging.compile_all(&FakeCompiler).unwrap();

        assert_eq!(summary.compiled, 2);
        assert_eq!(summary.errors.len(), 1);
        assert!(staging.staging_root().join("a.css").exists());
        assert!(staging.staging_root().join("b/c.css").exists());
        assert!(!staging.staging_root().join("notes.css").exists());
    }

    #[test]
    fn compile_all_records_content_hashes() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        let source = dir.path().join("src/a.scss");
        fs::write(&source, "a{}").unwrap();

        let summary = staging.compile_all(&FakeCompiler).unwrap();

        assert_eq!(
            summary.hashes.get(&source),
            Some(&crate::fs::content_hash(b"a{}"))
        );
    }

    #[test]
    fn remove_unit_deletes_dotted_directory() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        let nested = staging.staging_root().join("v1.2");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("theme.css"), "t{}").unwrap();

        staging.remove_unit(&dir.path().join("src/v1.2")).unwrap();

        assert!(!nested.exists());
    }

    #[test]
    fn staged_units_mirror_current_sources() {
        let dir = tempdir().unwrap();
        let staging = staging_at(dir.path());
        staging.reset().unwrap();
        fs::create_dir_all(dir.path().join("src/b")).unwrap();
        fs::write(dir.path().join("src/a.scss"), "a{}").unwrap();
        fs::write(dir.path().join("src/b/c.scss"), "c{}").unwrap();

        staging.compile_all(&FakeCompiler).unwrap();

        let expected: Vec<PathBuf> = staging
            .list_sources()
            .unwrap()
            .iter()
            .map(|s| staging.unit_path(s))
            .collect();
        for staged in &expected {
            assert!(staged.exists(), "missing staged unit {}", staged.display());
        }
    }
}
