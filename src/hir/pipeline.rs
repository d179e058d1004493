//! The conversion pipeline.
//!
//! ```text
//! SourceInput* ──parse──► CompilationUnit*      (failures → parse list)
//!                              │
//!               one SymbolTable, one Environment
//!                              │
//!    catalog → supertypes → members → bodies   (failures → semantic list)
//!                              │
//!                           augment            (clean files only)
//!                              │
//!                     ConversionResult
//! ```
//!
//! Every run owns its table, so independent conversions never share state.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, info};

use super::InvariantViolation;
use super::diagnostics::Diagnostic;
use super::passes::{self, Environment};
use super::symbols::SymbolTable;
use crate::base::FileSet;
use crate::levels::{Level, LevelConfig, OUTPUT_EXTENSION};
use crate::parser::parse_unit;
use crate::syntax::ast::CompilationUnit;

type Pass = fn(&mut [CompilationUnit], &mut Environment) -> Result<(), InvariantViolation>;

const PASSES: [(&str, Pass); 5] = [
    ("catalog", passes::catalog::run),
    ("supertypes", passes::supertypes::run),
    ("members", passes::members::run),
    ("bodies", passes::bodies::run),
    ("augment", passes::augment::run),
];

/// One file of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInput {
    pub path: PathBuf,
    pub text: String,
}

impl SourceInput {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub files: FileSet,
    /// The table the passes built, for callers inspecting declarations.
    pub table: SymbolTable,
    /// Malformed inputs, in input order.
    pub parse_failures: Vec<Diagnostic>,
    /// Problems found by the passes, in report order.
    pub semantic_failures: Vec<Diagnostic>,
    /// Input path → augmented source, in input order.
    pub outputs: IndexMap<PathBuf, String>,
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        self.parse_failures.is_empty() && self.semantic_failures.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.parse_failures.len() + self.semantic_failures.len()
    }

    /// Rendered failures, parse failures first.
    pub fn render_failures(&self) -> Vec<String> {
        self.parse_failures
            .iter()
            .chain(&self.semantic_failures)
            .map(|d| d.render(&self.files))
            .collect()
    }

    pub fn output(&self, path: &Path) -> Option<&str> {
        self.outputs.get(path).map(String::as_str)
    }
}

/// Where the augmented source of `path` is written.
pub fn output_path(path: &Path) -> PathBuf {
    path.with_extension(OUTPUT_EXTENSION)
}

/// Converts batches of sources at one language level.
#[derive(Debug, Clone)]
pub struct Converter {
    config: LevelConfig,
}

impl Converter {
    pub fn new(level: Level) -> Self {
        Self::with_config(level.config())
    }

    pub fn with_config(config: LevelConfig) -> Self {
        Self { config }
    }

    pub fn level(&self) -> Level {
        self.config.level
    }

    /// Parse and convert `inputs` as one batch.
    ///
    /// Input problems end up in the result; only an internal defect
    /// returns `Err`.
    pub fn convert(&self, inputs: &[SourceInput]) -> Result<ConversionResult, InvariantViolation> {
        let mut files = FileSet::new();
        let mut units = Vec::with_capacity(inputs.len());
        let mut parse_failures = Vec::new();
        for input in inputs {
            let file = files.add(input.path.clone());
            match parse_unit(file, &input.text) {
                Ok(unit) => units.push(unit),
                Err(err) => {
                    debug!("parse failure in '{}': {}", input.path.display(), err);
                    parse_failures.push(Diagnostic::parse(err.span, err.message));
                }
            }
        }
        self.convert_parsed(files, units, parse_failures)
    }

    /// Run the passes over units parsed elsewhere. `files` must contain
    /// every unit's file.
    pub fn convert_parsed(
        &self,
        files: FileSet,
        mut units: Vec<CompilationUnit>,
        parse_failures: Vec<Diagnostic>,
    ) -> Result<ConversionResult, InvariantViolation> {
        info!(
            "converting {} files at the {} level",
            units.len(),
            self.config.level
        );
        let mut env = Environment::new(self.config.clone(), files)?;
        for (name, pass) in PASSES {
            debug!("running pass '{}'", name);
            pass(&mut units, &mut env)?;
        }

        let Environment {
            table,
            files,
            mut diagnostics,
            outputs,
            ..
        } = env;
        let outputs = outputs
            .into_iter()
            .filter_map(|(file, text)| files.path(file).map(|p| (p.to_path_buf(), text)))
            .collect();
        let semantic_failures = diagnostics.take();
        info!(
            "{} parse failures, {} semantic failures",
            parse_failures.len(),
            semantic_failures.len()
        );
        Ok(ConversionResult {
            files,
            table,
            parse_failures,
            semantic_failures,
            outputs,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::hir::diagnostics::DiagnosticKind;

    #[test]
    fn test_parse_failure_does_not_stop_batch() {
        let result = Converter::new(Level::Elementary)
            .convert(&[
                SourceInput::new("Bad.dj0", "class {"),
                SourceInput::new("Good.dj0", "class Good {}"),
            ])
            .unwrap();
        assert_eq!(result.parse_failures.len(), 1);
        assert_eq!(result.parse_failures[0].kind, DiagnosticKind::Parse);
        assert!(result.semantic_failures.is_empty());
        assert!(result.output(Path::new("Good.dj0")).is_some());
        assert!(result.output(Path::new("Bad.dj0")).is_none());
        assert!(!result.is_success());
    }

    #[test]
    fn test_failures_rendered_with_file_names() {
        let result = Converter::new(Level::Full)
            .convert(&[SourceInput::new("A.java", "class A extends Shap {}")])
            .unwrap();
        assert_eq!(
            result.render_failures(),
            vec!["[A.java: (1,17)-(1,21)] cannot find class 'Shap'"]
        );
        assert_eq!(result.failure_count(), 1);
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn test_outputs_follow_input_order() {
        let result = Converter::new(Level::Intermediate)
            .convert(&[
                SourceInput::new("b/Z.dj1", "class Z {}"),
                SourceInput::new("a/A.dj1", "class A {}"),
            ])
            .unwrap();
        let paths: Vec<&PathBuf> = result.outputs.keys().collect();
        assert_eq!(paths, vec![&PathBuf::from("b/Z.dj1"), &PathBuf::from("a/A.dj1")]);
    }

    #[test]
    fn test_output_path_uses_java_extension() {
        assert_eq!(output_path(Path::new("src/Shape.dj0")), PathBuf::from("src/Shape.java"));
    }
}
