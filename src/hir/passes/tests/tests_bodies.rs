#![allow(clippy::unwrap_used)]

use rstest::rstest;

use super::*;
use crate::hir::passes::tests_support::{environment, environment_at, messages, run_passes};
use crate::levels::Level;

/// Messages after type-checking one source file at the full level.
fn check(source: &str) -> Vec<String> {
    let (mut units, mut env) = environment(&[("A.java", source)]);
    run_passes(&mut units, &mut env, 4);
    messages(&env)
}

// ============================================================================
// DEFINITE ASSIGNMENT
// ============================================================================

#[test]
fn test_unassigned_local_read() {
    assert_eq!(
        check("class A { int f() { int x; return x; } }"),
        vec!["variable 'x' might not have been initialized"]
    );
}

#[test]
fn test_both_branches_assign() {
    assert!(check("class A { int f(boolean c) { int x; if (c) { x = 1; } else { x = 2; } return x; } }").is_empty());
    assert_eq!(
        check("class A { int f(boolean c) { int x; if (c) { x = 1; } return x; } }"),
        vec!["variable 'x' might not have been initialized"]
    );
}

#[test]
fn test_abrupt_branch_does_not_block_merge() {
    assert!(check("class A { int f(boolean c) { int x; if (c) { return 0; } else { x = 2; } return x; } }").is_empty());
}

#[test]
fn test_final_local_assignments() {
    assert_eq!(
        check("class A { void f() { final int x = 1; x = 2; final int y; y = 1; y = 2; } }"),
        vec![
            "cannot assign a value to final variable 'x'",
            "variable 'y' might already have been assigned",
        ]
    );
}

#[test]
fn test_final_parameter_and_loop_assignment() {
    assert_eq!(
        check("class A { void f(final int p) { p = 1; } void g(boolean c) { final int x; while (c) { x = 1; } } }"),
        vec![
            "final parameter p may not be assigned",
            "variable 'x' might be assigned in loop",
        ]
    );
}

#[test]
fn test_compound_assignment_reads_target() {
    assert_eq!(
        check("class A { void f() { int x; x += 1; } }"),
        vec!["variable 'x' might not have been initialized"]
    );
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

#[test]
fn test_constructor_must_assign_finals() {
    assert_eq!(
        check("class A { final int x; A(boolean c) { if (c) { x = 1; } } }"),
        vec!["variable 'x' might not have been initialized"]
    );
    assert!(check("class A { final int x; A(int v) { this.x = v; } }").is_empty());
}

#[test]
fn test_this_call_assigns_finals() {
    assert!(check("class B { final int x; B() { this(1); } B(int v) { x = v; } }").is_empty());
}

#[test]
fn test_recursive_constructor_invocation() {
    assert_eq!(
        check("class R { R() { this(); } }"),
        vec!["recursive constructor invocation"]
    );
}

#[test]
fn test_default_constructor_leaves_final_unassigned() {
    assert_eq!(
        check("class C { final int x; final int y = 2; }"),
        vec!["variable 'x' not initialized in the default constructor"]
    );
}

#[test]
fn test_implicit_super_needs_nullary_constructor() {
    assert_eq!(
        check("class P { P(int a) {} } class Q extends P { Q() {} }"),
        vec!["constructor 'P' in class 'P' cannot be applied to given types"]
    );
    assert!(check("class P { P(int a) {} } class Q extends P { Q() { super(1); } }").is_empty());
}

#[test]
fn test_constructor_call_not_first() {
    assert_eq!(
        check("class P { P() {} P(int a) { int b = a; this(); } }"),
        vec!["call to this must be first statement in constructor"]
    );
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[test]
fn test_missing_return_and_unreachable() {
    let (mut units, mut env) = environment(&[(
        "A.java",
        "class A { int f() { } int g() { return 1; int y = 2; int z = 3; } }",
    )]);
    run_passes(&mut units, &mut env, 4);
    assert_eq!(
        messages(&env),
        vec!["missing return statement", "unreachable statement"]
    );
    let span = env.diagnostics.diagnostics()[0].span;
    assert_eq!(span.start.line, span.end.line);
    assert_eq!(span.start.column + 1, span.end.column);
}

#[test]
fn test_infinite_loop_needs_no_return() {
    assert!(check("class A { int f() { while (true) { } } }").is_empty());
    assert_eq!(
        check("class A { int f() { while (true) { break; } } }"),
        vec!["missing return statement"]
    );
}

#[rstest]
#[case("void f() { break; }", "break outside switch or loop")]
#[case("void f() { continue; }", "continue outside of loop")]
#[case("void f() { 1 + 2; }", "not a statement")]
#[case("void f() { return 1; }", "incompatible types: unexpected return value")]
#[case("int f() { return; }", "missing return value")]
fn test_statement_errors(#[case] method: &str, #[case] expected: &str) {
    let source = format!("class A {{ {} }}", method);
    assert_eq!(check(&source), vec![expected]);
}

#[test]
fn test_loops_not_allowed_at_elementary() {
    let (mut units, mut env) = environment_at(
        Level::Elementary,
        &[(
            "A.dj0",
            "class A { int f() { int i = 0; while (i < 3) { i = i + 1; } return i; } }",
        )],
    );
    run_passes(&mut units, &mut env, 4);
    assert_eq!(
        messages(&env),
        vec!["'while' loop is not allowed at the elementary level"]
    );
    assert_eq!(
        env.diagnostics.diagnostics()[0].kind,
        DiagnosticKind::TypeCheck
    );
}

#[test]
fn test_local_redeclaration() {
    assert_eq!(
        check("class A { int x; void f(int a) { int x = 1; int a = 2; } }"),
        vec!["variable 'a' is already defined in method 'f(int)'"]
    );
}

// ============================================================================
// NAMES
// ============================================================================

#[test]
fn test_println_through_class_and_package_prefix() {
    assert!(check(
        "class A { void f() { System.out.println(\"hi\"); java.lang.System.out.println(1); } }"
    )
    .is_empty());
}

#[test]
fn test_unknown_prefixes() {
    assert_eq!(
        check("class A { void f() { foo.bar.baz(); int y = z; } }"),
        vec![
            "package 'foo' does not exist",
            "cannot find symbol: variable 'z'",
        ]
    );
}

#[rstest]
#[case("int y = foo.bar.Baz.x;", "package 'foo' does not exist")]
#[case("int y = java.lang.Nope.x;", "package 'java.lang.Nope' does not exist")]
#[case("int y = java.lang.x;", "cannot find symbol: class 'x' in package 'java.lang'")]
#[case("foo.bar.Baz.x = 1;", "package 'foo' does not exist")]
fn test_unknown_package_prefix_names_first_missing_part(
    #[case] statement: &str,
    #[case] expected: &str,
) {
    let source = format!("class A {{ void f() {{ {} }} }}", statement);
    assert_eq!(check(&source), vec![expected]);
}

#[test]
fn test_static_context() {
    assert_eq!(
        check("class A { int x; static int f() { return x; } static void g() { h(); } void h() {} }"),
        vec![
            "non-static variable 'x' cannot be referenced from a static context",
            "non-static method 'h()' cannot be referenced from a static context",
        ]
    );
}

#[test]
fn test_field_selection_through_instance() {
    assert_eq!(
        check("class P { int x; } class A { int f(P p, int k) { k.y = 1; return p.x + p.y; } }"),
        vec![
            "int cannot be dereferenced",
            "cannot find symbol: variable 'y' in 'P'",
        ]
    );
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[test]
fn test_assignment_conversions() {
    assert_eq!(
        check("class A { void f() { int x = \"s\"; byte k = 10; byte z = 300; long w = 1; } }"),
        vec![
            "incompatible types: 'String' cannot be converted to 'int'",
            "incompatible types: 'int' cannot be converted to 'byte'",
        ]
    );
}

#[test]
fn test_integer_literal_range() {
    assert_eq!(
        check("class A { void f() { int a = 2147483648; int b = -2147483648; long c = 9223372036854775808L; int d = 0xFFFFFFFF; } }"),
        vec!["integer number too large", "integer number too large"]
    );
}

#[test]
fn test_operator_errors() {
    assert_eq!(
        check("class A { void f(boolean b, String s) { int x = b + 1; boolean y = !1; boolean z = s == 1; String t = s + 1; } }"),
        vec![
            "bad operand types for binary operator '+': 'boolean' and 'int'",
            "bad operand type 'int' for unary operator '!'",
            "incomparable types: 'String' and 'int'",
        ]
    );
}

#[test]
fn test_error_type_does_not_cascade() {
    assert_eq!(
        check("class A { void f() { int x = missing + 1; int y = missing.length(); } }"),
        vec![
            "cannot find symbol: variable 'missing'",
            "cannot find symbol: variable 'missing'",
        ]
    );
}

#[test]
fn test_instantiation_errors() {
    assert_eq!(
        check("abstract class S {} class P { P(int a) {} } class A { void f() { new S(); new P(); } }"),
        vec![
            "'S' is abstract; cannot be instantiated",
            "constructor 'P' in class 'P' cannot be applied to given types",
        ]
    );
}

#[test]
fn test_overload_selection() {
    assert!(check("class A { void k(long a) {} void k(int a) {} void f() { k(1); } }").is_empty());
    assert_eq!(
        check("class A { void m(int a, long b) {} void m(long a, int b) {} void f() { m(1, 1); } }"),
        vec!["reference to 'm' is ambiguous"]
    );
    assert_eq!(
        check("class A { void m(int a) {} void m(boolean a) {} void f() { m(\"s\"); g(); } }"),
        vec![
            "no suitable method found for m(String)",
            "cannot find symbol: method g()",
        ]
    );
}

#[test]
fn test_super_abstract_call() {
    assert_eq!(
        check("abstract class S { abstract void m(); } class T extends S { void m() { super.m(); } }"),
        vec!["abstract method 'm()' in 'S' cannot be accessed directly"]
    );
}

#[test]
fn test_casts() {
    assert_eq!(
        check("interface I {} final class F {} class A { void f(Object o, String s) { I i = (I) o; A a = (A) s; int n = (int) 2.5; F g = (F) i; } }"),
        vec![
            "incompatible types: 'String' cannot be converted to 'A'",
            "incompatible types: 'I' cannot be converted to 'F'",
        ]
    );
}

#[test]
fn test_arrays_at_full_level() {
    assert_eq!(
        check("class A { int f(int[] xs, int k) { int[] ys = new int[3]; return xs[0] + ys.length + k[0]; } }"),
        vec!["array required, but 'int' found"]
    );
}

#[test]
fn test_bad_escape_reported() {
    assert_eq!(
        check("class A { String s = \"a\\qb\"; }"),
        vec!["illegal escape character '\\q'"]
    );
}

#[rstest]
#[case("2147483647", false, false, true)]
#[case("2147483648", false, false, false)]
#[case("2147483648", true, false, true)]
#[case("0x7fff_ffff", false, false, true)]
#[case("0xFFFFFFFF", false, false, true)]
#[case("0x1FFFFFFFF", false, false, false)]
#[case("017", false, false, true)]
#[case("0b101", false, false, true)]
#[case("9223372036854775807L", false, true, true)]
#[case("9223372036854775808L", true, true, true)]
fn test_integer_fits(
    #[case] text: &str,
    #[case] negated: bool,
    #[case] long: bool,
    #[case] expected: bool,
) {
    assert_eq!(integer_fits(text, negated, long), expected);
}
