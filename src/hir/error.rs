//! Internal invariant violations.
//!
//! These signal a defect in the converter, never a problem with the input.
//! They abort the run and are returned to the caller of the pipeline.

use smol_str::SmolStr;
use thiserror::Error;

use super::symbols::ScopeId;
use crate::base::Span;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("partial package '{0}' used as a resolved type")]
    PartialPackage(SmolStr),
    #[error("scope {0:?} has no enclosing class")]
    NoEnclosingClass(ScopeId),
    #[error("library class '{0}' is missing from the symbol table")]
    MissingLibraryClass(SmolStr),
    #[error("malformed library signature '{0}'")]
    MalformedLibrarySignature(SmolStr),
    #[error("declaration at {0:?} was never cataloged")]
    Uncataloged(Span),
    #[error("generated member '{0}' has no template")]
    UnknownGenerated(SmolStr),
}
