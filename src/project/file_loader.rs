//! Finding, reading and parsing level source files.
//!
//! ```text
//! directory ──walkdir──► sorted paths ──rayon──► (path, text) in input order
//!                                                    │
//!                            FileSet ids ──rayon──► parsed units
//! ```
//!
//! Reading and parsing fan out over the rayon pool; every result is put
//! back into input order before anything reaches the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use super::ProjectError;
use crate::base::FileSet;
use crate::hir::diagnostics::Diagnostic;
use crate::hir::pipeline::SourceInput;
use crate::levels::Level;
use crate::parser::parse_unit;
use crate::syntax::ast::CompilationUnit;

/// Level selected by the extension of `path`.
pub fn level_of(path: &Path) -> Option<Level> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(Level::from_extension)
}

/// Like [`level_of`], but an unknown extension is an error.
pub fn require_level(path: &Path) -> Result<Level, ProjectError> {
    level_of(path).ok_or_else(|| ProjectError::UnsupportedExtension(path.to_path_buf()))
}

/// Every level source file below `dir`, sorted by path. Symlinks are
/// followed; an entry that cannot be walked is an error.
pub fn collect_source_paths(dir: &Path) -> Result<Vec<PathBuf>, ProjectError> {
    if !dir.is_dir() {
        return Err(ProjectError::NotADirectory(dir.to_path_buf()));
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(dir).to_path_buf();
            warn!("cannot walk '{}': {}", path.display(), err);
            ProjectError::Read {
                path,
                source: err.into(),
            }
        })?;
        if entry.file_type().is_file() && level_of(entry.path()).is_some() {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    debug!("found {} source files in '{}'", paths.len(), dir.display());
    Ok(paths)
}

/// Read every file in parallel. The first failure in input order wins.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<SourceInput>, ProjectError> {
    paths
        .par_iter()
        .map(|path| {
            trace!("reading '{}'", path.display());
            fs::read_to_string(path)
                .map(|text| SourceInput::new(path.clone(), text))
                .map_err(|source| ProjectError::Read {
                    path: path.clone(),
                    source,
                })
        })
        .collect()
}

/// A batch parsed ahead of the pipeline.
#[derive(Debug)]
pub struct ParsedBatch {
    pub files: FileSet,
    pub units: Vec<CompilationUnit>,
    pub parse_failures: Vec<Diagnostic>,
}

/// Register every input and parse them in parallel.
///
/// File ids follow input order and so do units and failures.
pub fn parse_sources(inputs: &[SourceInput]) -> ParsedBatch {
    let mut files = FileSet::new();
    let ids: Vec<_> = inputs.iter().map(|input| files.add(input.path.clone())).collect();

    let parsed: Vec<_> = inputs
        .par_iter()
        .zip(ids.par_iter())
        .map(|(input, &file)| parse_unit(file, &input.text))
        .collect();

    let mut units = Vec::with_capacity(parsed.len());
    let mut parse_failures = Vec::new();
    for (input, result) in inputs.iter().zip(parsed) {
        match result {
            Ok(unit) => units.push(unit),
            Err(err) => {
                debug!("parse failure in '{}': {}", input.path.display(), err);
                parse_failures.push(Diagnostic::parse(err.span, err.message));
            }
        }
    }
    ParsedBatch {
        files,
        units,
        parse_failures,
    }
}

#[cfg(test)]
#[path = "file_loader/tests/tests_file_loader.rs"]
mod tests;
