//! Specification loading: read, tokenize, and parse every file.
//!
//! A file that cannot be read or does not parse contributes one error and
//! no declarations; the remaining files are still loaded.

use crate::ast::Declaration;
use crate::error::Diagnostic;
use crate::source::{FileSystemProvider, SourceProvider};
use crate::syntax;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Declarations from every file that parsed, plus the problems of those
/// that did not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadedSpecs {
    pub declarations: Vec<Declaration>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadedSpecs {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Load `paths` from the filesystem.
pub fn load_spec_files(paths: &[PathBuf]) -> LoadedSpecs {
    load_specs(paths, &FileSystemProvider)
}

pub fn load_specs(paths: &[PathBuf], provider: &dyn SourceProvider) -> LoadedSpecs {
    let mut loaded = LoadedSpecs::default();
    for path in paths {
        match load_file(path, provider) {
            Ok(declarations) => {
                debug!(file = %path.display(), count = declarations.len(), "loaded");
                loaded.declarations.extend(declarations);
            }
            Err(diagnostic) => loaded.diagnostics.push(diagnostic),
        }
    }
    info!(
        files = paths.len(),
        declarations = loaded.declarations.len(),
        failed = loaded.diagnostics.len(),
        "specifications loaded"
    );
    loaded
}

fn load_file(path: &Path, provider: &dyn SourceProvider) -> Result<Vec<Declaration>, Diagnostic> {
    let file = path.to_string_lossy();
    let src = provider.read_source(path).map_err(|e| {
        Diagnostic::error(
            &file,
            0,
            format!("cannot read file '{}': {}", path.display(), e),
        )
    })?;
    syntax::parse_spec(&src, &file).map_err(|e| Diagnostic::syntax(&file, &e))
}
