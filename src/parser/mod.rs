//! Parser for level source files
//!
//! This module turns source text into the AST of [`crate::syntax::ast`]:
//! - **logos** for fast lexing
//! - a hand-written recursive-descent parser on top of the token stream
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with TokenKind
//!     ↓
//! Parser → CompilationUnit (spans are 0-based line/column)
//!     ↓
//! HIR → Symbol table and checking passes
//! ```
//!
//! Parsing stops at the first syntax error of a file.

#[allow(clippy::module_inception)]
mod parser;

mod error;
mod lexer;
mod token_kind;

pub use error::ParseError;
pub use lexer::{Lexer, Token, tokenize};
pub use parser::parse_unit;
pub use token_kind::TokenKind;
