#![allow(clippy::unwrap_used)]

use super::*;
use crate::hir::passes::tests_support::{environment, environment_at, messages, run_passes};
use crate::hir::symbols::CONSTRUCTOR_NAME;
use crate::levels::Level;
use crate::syntax::ast::Member;

fn field_modifiers(unit: &CompilationUnit, idx: usize) -> Vec<Modifier> {
    match &unit.types[0].members[idx] {
        Member::Field(field) => field.modifiers.iter().collect(),
        other => panic!("expected a field, found {:?}", other),
    }
}

fn method_modifiers(unit: &CompilationUnit, idx: usize) -> Vec<Modifier> {
    match &unit.types[0].members[idx] {
        Member::Method(method) => method.modifiers.iter().collect(),
        other => panic!("expected a method, found {:?}", other),
    }
}

#[test]
fn test_elementary_appends_implied_modifiers() {
    let (mut units, mut env) = environment_at(
        Level::Elementary,
        &[("Point.dj0", "class Point { int x; int getX() { return x; } }")],
    );
    run_passes(&mut units, &mut env, 3);
    assert!(env.diagnostics.is_empty(), "{:?}", messages(&env));
    assert_eq!(
        field_modifiers(&units[0], 0),
        vec![Modifier::Private, Modifier::Final]
    );
    assert_eq!(method_modifiers(&units[0], 1), vec![Modifier::Public]);
}

#[test]
fn test_written_visibility_suppresses_implied_one() {
    let (mut units, mut env) = environment_at(
        Level::Intermediate,
        &[("A.dj1", "class A { protected int x; private int f() { return 1; } }")],
    );
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        field_modifiers(&units[0], 0),
        vec![Modifier::Protected, Modifier::Final]
    );
    assert_eq!(method_modifiers(&units[0], 1), vec![Modifier::Private]);
}

#[test]
fn test_interface_members_implied() {
    let (mut units, mut env) =
        environment(&[("I.java", "interface I { int SIZE = 3; int size(); }")]);
    run_passes(&mut units, &mut env, 3);
    assert!(env.diagnostics.is_empty(), "{:?}", messages(&env));
    assert_eq!(
        field_modifiers(&units[0], 0),
        vec![Modifier::Public, Modifier::Static, Modifier::Final]
    );
    assert_eq!(
        method_modifiers(&units[0], 1),
        vec![Modifier::Public, Modifier::Abstract]
    );
}

#[test]
fn test_modifiers_illegal_at_level() {
    let (mut units, mut env) = environment_at(
        Level::Elementary,
        &[("A.dj0", "public class A { static int x = 1; }")],
    );
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec![
            "modifier 'public' is not allowed at the elementary level",
            "modifier 'static' is not allowed at the elementary level",
        ]
    );
    assert!(
        env.diagnostics
            .diagnostics()
            .iter()
            .all(|d| d.kind == DiagnosticKind::MemberBinding)
    );
}

#[test]
fn test_constructs_illegal_at_level() {
    let (mut units, mut env) = environment_at(
        Level::Intermediate,
        &[("A.dj1", "class A { class B {} int[] xs() { return null; } }")],
    );
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec![
            "nested type is not allowed at the intermediate level",
            "array type is not allowed at the intermediate level",
        ]
    );
}

#[test]
fn test_illegal_combinations() {
    let (mut units, mut env) = environment(&[(
        "A.java",
        "abstract class A { public private int x; abstract final void f(); abstract void g() {} void h(); }",
    )]);
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec![
            "illegal combination of modifiers: 'public' and 'private'",
            "illegal combination of modifiers: 'abstract' and 'final'",
            "abstract methods cannot have a body",
            "missing method body, or declare abstract",
        ]
    );
}

#[test]
fn test_duplicates() {
    let (mut units, mut env) = environment(&[(
        "A.java",
        "class A { int x; int x; void f(int a) {} void f(int b) {} void g(int a, int a) {} }",
    )]);
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec![
            "variable 'x' is already defined in class 'A'",
            "method 'f(int)' is already defined in class 'A'",
            "variable 'a' is already defined in method 'g(int, int)'",
        ]
    );
}

#[test]
fn test_incompatible_override() {
    let (mut units, mut env) = environment(&[(
        "A.java",
        "class B { int f() { return 1; } public void g() {} final void h() {} } \
         class A extends B { boolean f() { return true; } void g() {} void h() {} }",
    )]);
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec![
            "'f()' in 'A' cannot override 'f()' in 'B'; return type 'boolean' is not compatible with 'int'",
            "'g()' in 'A' cannot override 'g()' in 'B'; attempting to assign weaker access privileges; was public",
            "'h()' in 'A' cannot override 'h()' in 'B'; overridden method is final",
        ]
    );
}

#[test]
fn test_abstract_method_not_implemented() {
    let (mut units, mut env) = environment(&[(
        "A.java",
        "interface Shape { double area(); } class Square implements Shape {}",
    )]);
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec!["'Square' is not abstract and does not override abstract method 'area()' in 'Shape'"]
    );
}

#[test]
fn test_generated_members_in_order() {
    let (mut units, mut env) = environment_at(
        Level::Elementary,
        &[("Point.dj0", "class Point { int x; int y; }")],
    );
    run_passes(&mut units, &mut env, 3);
    assert!(env.diagnostics.is_empty(), "{:?}", messages(&env));
    let point = env.table.lookup_declared("Point").unwrap();
    let names: Vec<String> = env
        .table
        .class(point)
        .methods
        .keys()
        .map(|sig| sig.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            format!("{}/2", CONSTRUCTOR_NAME),
            "x/0".to_string(),
            "y/0".to_string(),
            "toString/0".to_string(),
            "equals/1".to_string(),
            "hashCode/0".to_string(),
        ]
    );
    assert!(
        env.table
            .class(point)
            .methods
            .values()
            .all(|scope| env.table.method(*scope).unwrap().origin == MethodOrigin::Generated)
    );
}

#[test]
fn test_generated_constructor_forwards_super_parameters() {
    let (mut units, mut env) = environment_at(
        Level::Elementary,
        &[
            ("Shape.dj0", "class Shape { String name; }"),
            ("Square.dj0", "class Square extends Shape { double side; }"),
        ],
    );
    run_passes(&mut units, &mut env, 3);
    assert!(env.diagnostics.is_empty(), "{:?}", messages(&env));
    let square = env.table.lookup_declared("Square").unwrap();
    let (_, ctor) = env.table.class(square).constructors().next().unwrap();
    let params: Vec<String> = env
        .table
        .method(ctor)
        .unwrap()
        .params
        .iter()
        .map(|p| env.table.var(*p).name.to_string())
        .collect();
    assert_eq!(params, vec!["super_name", "side"]);
    assert_eq!(env.super_args.get(&ctor), Some(&1));
}

#[test]
fn test_user_members_are_not_regenerated() {
    let (mut units, mut env) = environment_at(
        Level::Intermediate,
        &[(
            "A.dj1",
            "class A { int x; A(int x) { this.x = x; } int x() { return x; } \
             String toString() { return \"A\"; } }",
        )],
    );
    run_passes(&mut units, &mut env, 3);
    assert!(env.diagnostics.is_empty(), "{:?}", messages(&env));
    let a = env.table.lookup_declared("A").unwrap();
    let generated: Vec<String> = env
        .table
        .class(a)
        .methods
        .iter()
        .filter(|(_, scope)| env.table.method(**scope).unwrap().generated())
        .map(|(sig, _)| sig.to_string())
        .collect();
    assert_eq!(generated, vec!["equals/1", "hashCode/0"]);
}

#[test]
fn test_full_level_adds_implicit_constructor_only() {
    let (mut units, mut env) = environment(&[(
        "A.java",
        "class B { B(int x) {} } class A extends B {}",
    )]);
    run_passes(&mut units, &mut env, 3);
    assert_eq!(
        messages(&env),
        vec!["constructor 'B' in class 'B' cannot be applied to given types"]
    );
    let a = env.table.lookup_declared("A").unwrap();
    let (_, ctor) = env.table.class(a).constructors().next().unwrap();
    assert_eq!(env.table.method(ctor).unwrap().origin, MethodOrigin::Implicit);
    assert_eq!(env.table.class(a).methods.len(), 1);
}
