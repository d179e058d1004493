//! Failures of the on-disk batch layer.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::hir::InvariantViolation;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("directory not found: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("unsupported file extension: {}", .0.display())]
    UnsupportedExtension(PathBuf),
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}
