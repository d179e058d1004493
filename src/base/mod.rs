//! Foundation types for the language-level toolchain.
//!
//! This module provides fundamental types used throughout the converter:
//! - [`FileId`], [`FileSet`] - File handles and their paths
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`] - Line/column positions for AST nodes
//!
//! This module has NO dependencies on other crate modules.

mod file_id;
mod position;
mod span;

pub use file_id::{FileId, FileSet};
pub use position::{Position, Span};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
