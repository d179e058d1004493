//! End-to-end conversions of small batches.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use rstest::rstest;

use levels::hir::symbols::ClassState;
use levels::parser::parse_unit;
use levels::{DiagnosticKind, FileId, Level};

use crate::helpers::conversion_helpers::*;
use crate::helpers::source_fixtures::*;

// =============================================================================
// GENERATED CONSTRUCTORS
// =============================================================================

#[test]
fn test_empty_class_gets_exactly_one_public_constructor() {
    let result = convert(Level::Elementary, &[("Empty.dj0", "class Empty {}")]);
    assert_clean(&result);

    let text = output(&result, "Empty.dj0");
    assert_eq!(text.matches("public Empty(").count(), 1);
    assert!(text.contains("public Empty() {"));
    let empty = declared(&result, "Empty");
    assert_eq!(result.table.class(empty).state, ClassState::Augmented);
}

#[test]
fn test_augmented_output_is_valid_full_source() {
    let result = convert(Level::Elementary, &[("Point.dj0", "class Point { int x; int y; }")]);
    assert_clean(&result);

    let text = output(&result, "Point.dj0").to_string();
    let again = convert(Level::Full, &[("Point.java", &text)]);
    assert_clean(&again);
    assert_eq!(output(&again, "Point.java"), text);
    assert!(parse_unit(FileId::new(0), &text).is_ok());
}

// =============================================================================
// CROSS-FILE RESOLUTION
// =============================================================================

#[rstest]
#[case(&[("A.dj1", "class A extends B {}"), ("B.dj1", "class B {}")])]
#[case(&[("B.dj1", "class B {}"), ("A.dj1", "class A extends B {}")])]
fn test_superclass_in_other_file_either_order(#[case] files: &[(&str, &str)]) {
    let result = convert(Level::Intermediate, files);
    assert_clean(&result);

    let a = declared(&result, "A");
    let b = declared(&result, "B");
    assert_eq!(result.table.class(a).superclass, Some(b));
    assert_eq!(result.outputs.len(), 2);
}

#[test]
fn test_packages_and_imports_across_files() {
    let result = convert(Level::Intermediate, SHAPES);
    assert_clean(&result);

    let square = declared(&result, "shapes.Square");
    let shape = declared(&result, "shapes.Shape");
    assert_eq!(result.table.class(square).superclass, Some(shape));

    let square_text = output(&result, "shapes/Square.dj1");
    assert!(square_text.contains("public int side() {"));
    assert!(square_text.contains("public Square(int side) {"));
    let main_text = output(&result, "app/Main.dj1");
    assert!(main_text.contains("import shapes.*;"));
}

// =============================================================================
// CIRCULAR INHERITANCE
// =============================================================================

#[test]
fn test_self_extension_rejected_once() {
    let result = convert(
        Level::Full,
        &[("A.java", "class A extends A {}"), ("Ok.java", "class Ok {}")],
    );
    assert_eq!(messages(&result), vec!["cyclic inheritance involving 'A'"]);
    assert_eq!(result.semantic_failures[0].kind, DiagnosticKind::Resolution);
    assert!(result.output(std::path::Path::new("A.java")).is_none());
    assert!(result.output(std::path::Path::new("Ok.java")).is_some());
}

#[test]
fn test_two_class_cycle_rejected_once() {
    let result = convert(
        Level::Full,
        &[
            ("A.java", "class A extends B {}"),
            ("B.java", "class B extends A {}"),
        ],
    );
    assert_eq!(result.failure_count(), 1);
    assert!(messages(&result)[0].starts_with("cyclic inheritance involving"));
    assert!(result.outputs.is_empty());
}

// =============================================================================
// LEVEL DIFFERENCES
// =============================================================================

#[test]
fn test_accessor_is_the_only_difference_between_levels() {
    let intermediate = convert(Level::Intermediate, &[("Point.dj1", POINT_WITHOUT_ACCESSOR)]);
    let advanced = convert(Level::Advanced, &[("Point.dj2", POINT_WITHOUT_ACCESSOR)]);
    assert_clean(&intermediate);
    assert_clean(&advanced);

    let with_accessor = output(&intermediate, "Point.dj1");
    let without = output(&advanced, "Point.dj2");
    assert_eq!(without, POINT_WITHOUT_ACCESSOR);

    let body = without.strip_suffix("}\n").unwrap();
    assert_eq!(with_accessor, format!("{}{}}}\n", body, POINT_ACCESSOR));
}

#[rstest]
#[case(Level::Elementary, "Thing.dj0", true)]
#[case(Level::Intermediate, "Thing.dj1", true)]
#[case(Level::Advanced, "Thing.dj2", false)]
#[case(Level::Full, "Thing.java", false)]
fn test_generated_members_per_level(
    #[case] level: Level,
    #[case] path: &str,
    #[case] generates: bool,
) {
    let result = convert(level, &[(path, "class Thing { Thing() {} }")]);
    assert_clean(&result);
    let text = output(&result, path);
    assert_eq!(text.contains("public String toString()"), generates);
    assert_eq!(text.contains("public int hashCode()"), generates);
}

// =============================================================================
// FAILURE REPORTING
// =============================================================================

#[test]
fn test_failures_block_only_their_file() {
    let result = convert(
        Level::Elementary,
        &[
            ("Bad.dj0", "class Bad { int f() { return true; } }"),
            ("Broken.dj0", "class Broken {"),
            ("Good.dj0", "class Good { int g; }"),
        ],
    );
    assert_eq!(result.parse_failures.len(), 1);
    assert_eq!(
        messages(&result)[1],
        "incompatible types: 'boolean' cannot be converted to 'int'"
    );
    let keys: Vec<String> = result
        .outputs
        .keys()
        .map(|p| p.display().to_string())
        .collect();
    assert_eq!(keys, vec!["Good.dj0"]);
}

#[test]
fn test_rendered_positions_are_one_based() {
    let result = convert(Level::Full, &[("A.java", "class A {\n  Missing m;\n}")]);
    assert_eq!(
        result.render_failures(),
        vec!["[A.java: (2,3)-(2,10)] cannot find class 'Missing'"]
    );
}
