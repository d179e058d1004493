//! # levels-base
//!
//! Semantic analysis and source augmentation for the language levels of a
//! Java teaching subset: Elementary (`.dj0`), Intermediate (`.dj1`),
//! Advanced (`.dj2`) and Full (`.java`).
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project   → Directory loading, parallel parsing, writing outputs
//!   ↓
//! hir       → Symbol table, diagnostics, passes, pipeline
//!   ↓
//! levels    → Level selector and per-level rule tables
//!   ↓
//! syntax    → AST types, source printer, literal escaping
//!   ↓
//! parser    → Logos lexer, recursive-descent parser
//!   ↓
//! base      → Primitives (FileId, Position, Span, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → levels → hir → project)
// ============================================================================

/// Foundation types: FileId, FileSet, Span, TextRange
pub mod base;

/// Parser: Logos lexer, recursive-descent parser
pub mod parser;

/// Syntax: AST types, printer, literal escaping
pub mod syntax;

/// Language levels and their rule tables
pub mod levels;

/// Semantic model and conversion pipeline
pub mod hir;

/// Batch conversion of files on disk
pub mod project;

// Re-export the conversion entry points
pub use hir::{ConversionResult, Converter, Diagnostic, DiagnosticKind, InvariantViolation, SourceInput};
pub use levels::{Level, LevelConfig};
pub use project::{BatchConverter, ConvertOptions, ProjectError};

// Re-export foundation types
pub use base::{FileId, FileSet, LineCol, LineIndex, Position, Span, TextRange, TextSize};
