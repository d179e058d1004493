//! Symbol table properties, exercised through the public API.

#![allow(clippy::unwrap_used)]

use rstest::rstest;

use levels::hir::InvariantViolation;
use levels::hir::symbols::{
    AssignError, ClassKind, ClassOrigin, InstanceType, MethodOrigin, MethodScope, MethodSig,
    ScopeId, SymbolTable, VariableData,
};
use levels::syntax::ast::{Modifier, Modifiers, PrimitiveType};
use levels::{FileId, Span};

fn span() -> Span {
    Span::empty(FileId::new(0))
}

fn method_in(table: &mut SymbolTable, qname: &str) -> ScopeId {
    let class = table.declare_class(
        qname,
        ClassKind::Class,
        Modifiers::empty(span()),
        ClassOrigin::Source(span()),
        None,
    );
    let method = MethodScope {
        name: "run".into(),
        modifiers: Modifiers::empty(span()),
        params: Vec::new(),
        return_type: None,
        class,
        origin: MethodOrigin::Source,
        span: span(),
    };
    table.add_method(MethodSig::new("run", vec![]), method).unwrap()
}

fn local(table: &SymbolTable, name: &str, owner: ScopeId, modifiers: &[Modifier]) -> VariableData {
    let mut mods = Modifiers::empty(span());
    for m in modifiers {
        mods.push(*m);
    }
    let int = table.well_known().primitive(PrimitiveType::Int);
    VariableData::new(name, mods, InstanceType::new(int), owner, span())
}

// =============================================================================
// SCOPE CHAINS
// =============================================================================

#[rstest]
#[case(0)]
#[case(1)]
#[case(7)]
#[case(200)]
fn test_enclosing_class_independent_of_depth(#[case] depth: usize) {
    let mut table = SymbolTable::new().unwrap();
    let method = method_in(&mut table, "deep.Nest");
    let class = table.lookup_declared("deep.Nest").unwrap();

    let mut scope = method;
    for _ in 0..depth {
        scope = table.add_block(scope);
    }
    assert_eq!(table.nearest_enclosing_class(scope), Ok(class));
    assert_eq!(table.enclosing_method(scope), Some(method));
}

#[test]
fn test_chain_without_class_fails_fast() {
    let mut table = SymbolTable::new().unwrap();
    let root = table.root_scope();
    let stray = table.add_block(root);
    assert_eq!(
        table.nearest_enclosing_class(stray),
        Err(InvariantViolation::NoEnclosingClass(stray))
    );
}

// =============================================================================
// VARIABLE RECORDS
// =============================================================================

#[test]
fn test_variable_equality_depends_on_owner() {
    let mut table = SymbolTable::new().unwrap();
    let first = method_in(&mut table, "A");
    let second = method_in(&mut table, "B");

    let a = local(&table, "n", first, &[Modifier::Final]);
    assert_eq!(a, local(&table, "n", first, &[Modifier::Final]));
    assert_ne!(a, local(&table, "n", second, &[Modifier::Final]));
    assert_ne!(a, local(&table, "m", first, &[Modifier::Final]));
    assert_ne!(a, local(&table, "n", first, &[]));
}

#[test]
fn test_obtain_and_release_through_table() {
    let mut table = SymbolTable::new().unwrap();
    let method = method_in(&mut table, "A");
    let data = local(&table, "n", method, &[Modifier::Final]);
    let var = table.add_var(method, data).unwrap();

    assert_eq!(table.var_mut(var).obtain_value(), Ok(()));
    assert_eq!(
        table.var_mut(var).obtain_value(),
        Err(AssignError::AlreadyAssigned("n".into()))
    );
    assert!(table.var(var).assigned);
    assert_eq!(table.var_mut(var).release_value(), Ok(()));
    assert!(!table.var(var).assigned);
    assert_eq!(table.var_mut(var).obtain_value(), Ok(()));
    assert_eq!(table.lookup_var(method, "n"), Some(var));
}
