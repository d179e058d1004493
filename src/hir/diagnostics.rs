//! Diagnostics — user-facing conversion failures.
//!
//! Every problem with the input is a [`Diagnostic`] appended to a
//! [`DiagnosticCollector`]; the run continues. Defects of the converter
//! itself are [`InvariantViolation`](super::InvariantViolation)s instead.

use std::fmt;
use std::sync::Arc;

use crate::base::{FileId, FileSet, Span};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Which stage detected the problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Malformed input text.
    Parse,
    /// Unresolved name, circular inheritance, duplicate declaration,
    /// package/type ambiguity.
    Resolution,
    /// Duplicate signatures, modifiers illegal for the level.
    MemberBinding,
    /// Type mismatch, unassigned finals, shorthand illegal for the level.
    TypeCheck,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Parse => "parse",
            DiagnosticKind::Resolution => "resolution",
            DiagnosticKind::MemberBinding => "member binding",
            DiagnosticKind::TypeCheck => "type check",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn parse(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(DiagnosticKind::Parse, span, message)
    }

    pub fn resolution(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(DiagnosticKind::Resolution, span, message)
    }

    pub fn member_binding(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(DiagnosticKind::MemberBinding, span, message)
    }

    pub fn type_check(span: Span, message: impl Into<Arc<str>>) -> Self {
        Self::new(DiagnosticKind::TypeCheck, span, message)
    }

    pub fn file(&self) -> FileId {
        self.span.file
    }

    /// `[fileName: (startLine,startCol)-(endLine,endCol)] message`, with
    /// 1-based lines and columns.
    pub fn render(&self, files: &FileSet) -> String {
        let Span { file, start, end } = self.span;
        format!(
            "[{}: ({},{})-({},{})] {}",
            files.display_name(file),
            start.line + 1,
            start.column + 1,
            end.line + 1,
            end.column + 1,
            self.message
        )
    }
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Ordered diagnostics of one run.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn resolution(&mut self, span: Span, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::resolution(span, message));
    }

    pub fn member_binding(&mut self, span: Span, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::member_binding(span, message));
    }

    pub fn type_check(&mut self, span: Span, message: impl Into<Arc<str>>) {
        self.add(Diagnostic::type_check(span, message));
    }

    /// Add a duplicate declaration error.
    pub fn duplicate(&mut self, kind: DiagnosticKind, span: Span, what: &str, name: &str) {
        self.add(Diagnostic::new(
            kind,
            span,
            format!("duplicate {}: '{}' is already defined", what, name),
        ));
    }

    /// Add a type mismatch error.
    pub fn type_mismatch(&mut self, span: Span, expected: &str, found: &str) {
        self.type_check(
            span,
            format!("incompatible types: '{}' cannot be converted to '{}'", found, expected),
        );
    }

    /// Add an illegal-at-level error.
    pub fn not_allowed(&mut self, kind: DiagnosticKind, span: Span, what: &str, level: &str) {
        self.add(Diagnostic::new(
            kind,
            span,
            format!("{} is not allowed at the {} level", what, level),
        ));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics located in `file`.
    pub fn for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file() == file).collect()
    }

    pub fn has_errors_in(&self, file: FileId) -> bool {
        self.diagnostics.iter().any(|d| d.file() == file)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_is_one_based() {
        let mut files = FileSet::default();
        let file = files.add(PathBuf::from("Shape.dj0"));
        let diag = Diagnostic::resolution(
            Span::from_coords(file, 0, 6, 0, 11),
            "cannot find class 'Shap'",
        );
        assert_eq!(
            diag.render(&files),
            "[Shape.dj0: (1,7)-(1,12)] cannot find class 'Shap'"
        );
    }

    #[test]
    fn test_collector_by_file() {
        let mut collector = DiagnosticCollector::new();
        let a = FileId::new(0);
        let b = FileId::new(1);
        collector.type_check(Span::empty(a), "first");
        collector.member_binding(Span::empty(b), "second");
        collector.type_mismatch(Span::empty(a), "int", "boolean");

        assert_eq!(collector.len(), 3);
        assert_eq!(collector.for_file(a).len(), 2);
        assert!(collector.has_errors_in(b));
        assert!(!collector.has_errors_in(FileId::new(2)));
        assert_eq!(
            collector.diagnostics()[2].message.as_ref(),
            "incompatible types: 'boolean' cannot be converted to 'int'"
        );
    }

    #[test]
    fn test_take_empties() {
        let mut collector = DiagnosticCollector::new();
        collector.duplicate(DiagnosticKind::Resolution, Span::empty(FileId::new(0)), "class", "A");
        let taken = collector.take();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].kind, DiagnosticKind::Resolution);
        assert!(collector.is_empty());
    }
}
