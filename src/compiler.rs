//! Stylesheet compiler collaborator
//!
//! The build pipeline treats compilation as a black box behind the
//! [`Compiler`] trait: one source path in, one CSS string out. The
//! production implementation delegates to `grass`.

use std::path::Path;

use crate::error::{CascadeError, CascadeResult};

/// Per-unit stylesheet compiler
pub trait Compiler {
    /// Compile a single source file to CSS text
    fn compile(&self, source: &Path) -> CascadeResult<String>;
}

/// SCSS compiler backed by `grass`
#[derive(Debug, Clone, Copy, Default)]
pub struct ScssCompiler;

impl ScssCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl Compiler for ScssCompiler {
    fn compile(&self, source: &Path) -> CascadeResult<String> {
        grass::from_path(source, &grass::Options::default()).map_err(|e| {
            CascadeError::Compile {
                file: source.to_path_buf(),
                message: e.to_string(),
            }
        })
    }
}

/// Test double: returns the source file's contents verbatim, or fails when
/// the contents start with `!error`.
#[cfg(test)]
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FakeCompiler;

#[cfg(test)]
impl Compiler for FakeCompiler {
    fn compile(&self, source: &Path) -> CascadeResult<String> {
        let content = std::fs::read_to_string(source)?;
        if content.starts_with("!error") {
            return Err(CascadeError::Compile {
                file: source.to_path_buf(),
                message: "forced failure".to_string(),
            });
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn scss_compiler_compiles_simple_rule() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.scss");
        fs::write(&source, "a { color: red; }").unwrap();

        let css = ScssCompiler::new().compile(&source).unwrap();

        assert!(css.contains("color: red"));
    }

    #[test]
    fn scss_compiler_flattens_nesting() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("nav.scss");
        fs::write(&source, "nav { ul { margin: 0; } }").unwrap();

        let css = ScssCompiler::new().compile(&source).unwrap();

        assert!(css.contains("nav ul"));
        assert!(css.contains("margin: 0"));
    }

    #[test]
    fn scss_compiler_reports_syntax_error() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("broken.scss");
        fs::write(&source, "a { color: ").unwrap();

        let err = ScssCompiler::new().compile(&source).unwrap_err();

        assert!(matches!(err, CascadeError::Compile { .. }));
    }

    #[test]
    fn scss_compiler_missing_file_is_compile_error() {
        let err = ScssCompiler::new()
            .compile(Path::new("/nonexistent/missing.scss"))
            .unwrap_err();
        assert!(matches!(err, CascadeError::Compile { .. }));
    }

    #[test]
    fn fake_compiler_fails_on_marker() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("bad.scss");
        fs::write(&source, "!error").unwrap();

        assert!(FakeCompiler.compile(&source).is_err());
    }
}
