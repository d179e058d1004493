//! Semantic model: symbol table, checking passes and the conversion pipeline.
//!
//! ## Key Types
//!
//! - [`symbols::SymbolTable`] — arena of classes, scopes and variables
//! - [`Converter`] — runs a batch of sources through every pass
//! - [`Diagnostic`] — one user-facing failure with its location
//! - [`InvariantViolation`] — an internal defect that aborts the run
//!
//! ## Pass Order
//!
//! ```text
//! parse(file)            ← per file, failures collected separately
//!     │
//!     ▼
//! catalog                ← type names, packages, continuations
//!     │
//!     ▼
//! supertypes             ← extends / implements
//!     │
//!     ▼
//! members                ← fields, methods, generated members
//!     │
//!     ▼
//! bodies                 ← expression types, definite assignment
//!     │
//!     ▼
//! augment                ← explicit source for clean files
//! ```

mod error;
mod library;

pub mod diagnostics;
pub mod passes;
pub mod pipeline;
pub mod resolve;
pub mod symbols;

pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticKind};
pub use error::InvariantViolation;
pub use pipeline::{ConversionResult, Converter, SourceInput, output_path};
