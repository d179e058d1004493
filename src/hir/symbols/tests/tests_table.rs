#![allow(clippy::unwrap_used)]

use super::*;
use crate::base::{FileId, Position};
use crate::hir::symbols::MethodOrigin;
use crate::syntax::ast::{Modifier, Modifiers, PrimitiveType};

fn span() -> Span {
    Span::empty(FileId::new(0))
}

fn mods(list: &[Modifier]) -> Modifiers {
    let mut modifiers = Modifiers::empty(span());
    for m in list {
        modifiers.push(*m);
    }
    modifiers
}

fn declare(table: &mut SymbolTable, qname: &str) -> ClassId {
    let id = table.declare_class(
        qname,
        ClassKind::Class,
        mods(&[]),
        ClassOrigin::Source(span()),
        None,
    );
    let object = table.well_known().object;
    table.class_mut(id).superclass = Some(object);
    id
}

fn method_scope(table: &mut SymbolTable, class: ClassId, name: &str) -> ScopeId {
    let method = MethodScope {
        name: name.into(),
        modifiers: mods(&[Modifier::Public]),
        params: Vec::new(),
        return_type: None,
        class,
        origin: MethodOrigin::Source,
        span: span(),
    };
    table.add_method(MethodSig::new(name, vec![]), method).unwrap()
}

fn int_var(table: &SymbolTable, name: &str, owner: ScopeId) -> VariableData {
    let int = table.well_known().primitive(PrimitiveType::Int);
    VariableData::new(name, mods(&[]), InstanceType::new(int), owner, span())
}

/// Nearest enclosing class is found through any number of block scopes
#[test]
fn test_nearest_enclosing_class_through_deep_nesting() {
    let mut table = SymbolTable::new().unwrap();
    let class = declare(&mut table, "shapes.Square");
    let method = method_scope(&mut table, class, "area");
    for depth in [0usize, 1, 5, 40] {
        let mut scope = method;
        for _ in 0..depth {
            scope = table.add_block(scope);
        }
        assert_eq!(table.nearest_enclosing_class(scope), Ok(class));
    }
}

/// A nested class scope stops the walk at the innermost class
#[test]
fn test_nearest_enclosing_class_prefers_inner_class() {
    let mut table = SymbolTable::new().unwrap();
    let outer = declare(&mut table, "Outer");
    let inner = table.declare_class(
        "Outer.Inner",
        ClassKind::Class,
        mods(&[]),
        ClassOrigin::Source(span()),
        Some(outer),
    );
    let method = method_scope(&mut table, inner, "f");
    let block = table.add_block(method);
    assert_eq!(table.nearest_enclosing_class(block), Ok(inner));
    assert_eq!(table.class(inner).name, "Inner");
    assert_eq!(table.class(outer).nested.get("Inner"), Some(&inner));
}

/// The root scope has no enclosing class; the walk fails fast
#[test]
fn test_nearest_enclosing_class_fails_at_root() {
    let table = SymbolTable::new().unwrap();
    let root = table.root_scope();
    assert_eq!(
        table.nearest_enclosing_class(root),
        Err(InvariantViolation::NoEnclosingClass(root))
    );
}

/// Lookup searches the local scope, then outward; first match wins
#[test]
fn test_lookup_var_shadowing() {
    let mut table = SymbolTable::new().unwrap();
    let class = declare(&mut table, "A");
    let class_scope = table.class(class).scope;
    let field = int_var(&table, "x", class_scope);
    let field = table.add_var(class_scope, field).unwrap();
    table.class_mut(class).fields.push(field);

    let method = method_scope(&mut table, class, "f");
    let block = table.add_block(method);
    assert_eq!(table.lookup_var(block, "x"), Some(field));

    let local = int_var(&table, "x", block);
    let local = table.add_var(block, local).unwrap();
    assert_eq!(table.lookup_var(block, "x"), Some(local));
    assert_eq!(table.lookup_var(method, "x"), Some(field));
    assert_eq!(table.lookup_var(block, "y"), None);
}

/// Names are unique per scope only
#[test]
fn test_add_var_rejects_duplicate_in_same_scope() {
    let mut table = SymbolTable::new().unwrap();
    let class = declare(&mut table, "A");
    let method = method_scope(&mut table, class, "f");
    let first = int_var(&table, "x", method);
    let first = table.add_var(method, first).unwrap();
    let again = int_var(&table, "x", method);
    assert_eq!(table.add_var(method, again), Err(first));

    let block = table.add_block(method);
    let inner = int_var(&table, "x", block);
    assert!(table.add_var(block, inner).is_ok());
}

/// Promotion keeps the handle of the continuation
#[test]
fn test_continuation_promotion_preserves_identity() {
    let mut table = SymbolTable::new().unwrap();
    let first_use = Span::new(FileId::new(1), Position::new(0, 10), Position::new(0, 11));
    let placeholder = table.continuation("B", first_use);
    assert!(table.class(placeholder).is_continuation());
    assert_eq!(table.lookup_declared("B"), None);
    assert_eq!(table.continuation("B", span()), placeholder);

    let decl_span = Span::new(FileId::new(2), Position::new(0, 0), Position::new(0, 9));
    table.promote(placeholder, ClassKind::Class, mods(&[Modifier::Final]), decl_span, None);
    assert_eq!(table.lookup_declared("B"), Some(placeholder));
    let class = table.class(placeholder);
    assert_eq!(class.state, ClassState::Declared);
    assert_eq!(class.origin, ClassOrigin::Source(decl_span));
    assert!(class.is_final());
}

/// Packages of declared classes are registered with their prefixes
#[test]
fn test_packages_registered() {
    let mut table = SymbolTable::new().unwrap();
    declare(&mut table, "edu.rice.shapes.Square");
    assert!(table.is_package("edu"));
    assert!(table.is_package("edu.rice"));
    assert!(table.is_package("edu.rice.shapes"));
    assert!(!table.is_package("edu.rice.shapes.Square"));
}

#[test]
fn test_assignability() {
    let mut table = SymbolTable::new().unwrap();
    let known = table.well_known().clone();
    let int = known.primitive(PrimitiveType::Int);
    let double = known.primitive(PrimitiveType::Double);
    let boolean = known.primitive(PrimitiveType::Boolean);
    let shape = declare(&mut table, "Shape");
    let square = declare(&mut table, "Square");
    table.class_mut(square).superclass = Some(shape);

    assert!(table.is_assignable(int, double));
    assert!(!table.is_assignable(double, int));
    assert!(!table.is_assignable(boolean, int));
    assert!(table.is_assignable(square, shape));
    assert!(!table.is_assignable(shape, square));
    assert!(table.is_assignable(known.null, square));
    assert!(!table.is_assignable(known.null, int));
    assert!(table.is_assignable(known.string, known.object));
    assert!(table.is_assignable(known.error, int));

    let squares = table.array_of(square);
    let shapes = table.array_of(shape);
    assert_eq!(table.array_of(square), squares);
    assert!(table.is_assignable(squares, shapes));
    assert!(table.is_assignable(squares, known.object));
    let ints = table.array_of(int);
    let doubles = table.array_of(double);
    assert!(!table.is_assignable(ints, doubles));
    assert_eq!(table.type_name(squares), "Square[]");
    assert!(table.find_field(squares, "length").is_some());
}
