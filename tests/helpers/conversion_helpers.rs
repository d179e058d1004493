//! Conversion helpers for end-to-end tests.

#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::path::Path;

use levels::hir::symbols::ClassId;
use levels::{ConversionResult, Converter, Level, SourceInput};

/// Convert `(path, text)` pairs as one batch at `level`.
pub fn convert(level: Level, files: &[(&str, &str)]) -> ConversionResult {
    let inputs: Vec<SourceInput> = files
        .iter()
        .map(|(path, text)| SourceInput::new(*path, *text))
        .collect();
    Converter::new(level)
        .convert(&inputs)
        .expect("conversion hit an internal invariant violation")
}

/// Failure messages in report order, parse failures first.
pub fn messages(result: &ConversionResult) -> Vec<String> {
    result
        .parse_failures
        .iter()
        .chain(&result.semantic_failures)
        .map(|d| d.message.to_string())
        .collect()
}

/// Assert the batch converted without any failure.
pub fn assert_clean(result: &ConversionResult) {
    assert!(
        result.is_success(),
        "Expected no failures, got {}:\n  {}",
        result.failure_count(),
        result.render_failures().join("\n  ")
    );
}

/// Augmented text of one input.
pub fn output<'r>(result: &'r ConversionResult, path: &str) -> &'r str {
    result
        .output(Path::new(path))
        .unwrap_or_else(|| panic!("no output for '{}'", path))
}

/// The declared class named `qname`.
pub fn declared(result: &ConversionResult, qname: &str) -> ClassId {
    result
        .table
        .lookup_declared(qname)
        .unwrap_or_else(|| panic!("class '{}' was not declared", qname))
}
