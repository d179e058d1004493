//! Syntax layer: AST, source printer and literal escaping.
//!
//! The parser in [`crate::parser`] produces [`ast::CompilationUnit`] values;
//! the passes in [`crate::hir`] annotate them and [`printer`] writes them back
//! out as explicit source.

pub mod ast;
pub mod literals;
pub mod printer;

pub use ast::CompilationUnit;
pub use printer::{PrintOptions, print_expr, print_unit};

// Re-export Position and Span from base for convenience
pub use crate::base::{Position, Span};
