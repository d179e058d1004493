//! Pass 2: resolve superclasses and interfaces.
//!
//! Direct supertypes are resolved first for every class of the batch; the
//! inheritance graph is then walked depth-first. A class is `Resolving`
//! while it is on the walk stack, so meeting a `Resolving` class again
//! closes a cycle. Every cycle is reported once and its members fall back
//! to the root type so later passes see a finite hierarchy.

use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::Environment;
use crate::base::{FileId, Span};
use crate::hir::InvariantViolation;
use crate::hir::resolve::TypeLookup;
use crate::hir::symbols::{ClassId, ClassState, SymbolTable};
use crate::syntax::ast::{CompilationUnit, TypeDecl, TypeExpr};

pub fn run(units: &mut [CompilationUnit], env: &mut Environment) -> Result<(), InvariantViolation> {
    debug!("supertypes: {} files", units.len());
    for unit in units.iter() {
        check_imports(env, unit);
    }

    let mut order: Vec<(ClassId, Span)> = Vec::new();
    for unit in units.iter() {
        for decl in super::all_type_decls(unit) {
            let Some(id) = env.class_of(decl) else {
                continue;
            };
            let blame = resolve_direct(env, unit.file, decl, id);
            order.push((id, blame));
        }
    }
    break_cycles(env, &order);
    Ok(())
}

// ============================================================================
// IMPORTS
// ============================================================================

fn check_imports(env: &mut Environment, unit: &CompilationUnit) {
    let package = unit.package_name();
    let mut seen: FxHashMap<SmolStr, SmolStr> = FxHashMap::default();
    for import in &unit.imports {
        let path = import.path.dotted();
        if import.on_demand {
            if !env.table.is_package(&path) && env.table.lookup_declared(&path).is_none() {
                env.diagnostics.resolution(
                    import.path.span,
                    format!("package '{}' does not exist", path),
                );
            }
            continue;
        }
        if env.table.lookup_declared(&path).is_none() {
            env.diagnostics
                .resolution(import.path.span, format!("cannot find class '{}'", path));
            continue;
        }
        let simple = import.path.last().text.clone();
        if let Some(previous) = seen.get(&simple) {
            if *previous != path {
                env.diagnostics.resolution(
                    import.span,
                    format!("'{}' is already defined in a single-type import", simple),
                );
            }
            continue;
        }
        let local = if package.is_empty() {
            simple.clone()
        } else {
            SmolStr::new(format!("{}.{}", package, simple))
        };
        if local != path && unit.types.iter().any(|decl| decl.name.text == simple) {
            env.diagnostics.resolution(
                import.span,
                format!("'{}' is already defined in this compilation unit", simple),
            );
        }
        seen.insert(simple, path);
    }
}

// ============================================================================
// DIRECT SUPERTYPES
// ============================================================================

enum Supertype {
    Found(ClassId),
    /// Unresolved; the continuation stands in.
    Placeholder(ClassId),
    Failed,
}

fn supertype(env: &mut Environment, file: FileId, ty: &TypeExpr, id: ClassId) -> Supertype {
    let TypeExpr::Named(name) = ty else {
        env.diagnostics
            .resolution(ty.span(), format!("unexpected type '{}'", ty));
        return Supertype::Failed;
    };
    let dotted = name.dotted();
    let enclosing = env.table.class(id).enclosing;
    match env.lookup_type(file, &dotted, enclosing) {
        TypeLookup::Found(sup) => {
            trace!("'{}' resolved to '{}'", dotted, env.table.class(sup).qname);
            Supertype::Found(sup)
        }
        TypeLookup::Ambiguous(candidates) => {
            env.report_ambiguous(name.span, &dotted, &candidates);
            Supertype::Failed
        }
        TypeLookup::NotFound => {
            env.diagnostics
                .resolution(name.span, format!("cannot find class '{}'", dotted));
            let guess = env.placeholder_name(file, name);
            Supertype::Placeholder(env.table.continuation(&guess, name.span))
        }
    }
}

/// Set the direct supertypes of `id`. Returns the span blamed when a cycle
/// closes at this class.
fn resolve_direct(env: &mut Environment, file: FileId, decl: &TypeDecl, id: ClassId) -> Span {
    let object = env.table.well_known().object;
    let mut blame = decl.name.span;
    let mut superclass = object;
    let mut interfaces: Vec<ClassId> = Vec::new();

    if decl.is_interface() {
        for ty in &decl.extends {
            match supertype(env, file, ty, id) {
                Supertype::Found(sup) if !env.table.class(sup).is_interface() => {
                    let name = env.table.type_name(sup);
                    env.diagnostics.resolution(
                        ty.span(),
                        format!("interface '{}' cannot extend class '{}'", decl.name.text, name),
                    );
                }
                Supertype::Found(sup) | Supertype::Placeholder(sup) => {
                    if !interfaces.contains(&sup) {
                        interfaces.push(sup);
                    }
                    blame = ty.span();
                }
                Supertype::Failed => {}
            }
        }
    } else {
        if let Some(ty) = decl.extends.first() {
            blame = ty.span();
            match supertype(env, file, ty, id) {
                Supertype::Found(sup) if env.table.class(sup).is_interface() => {
                    env.diagnostics
                        .resolution(ty.span(), "no interface expected here");
                }
                Supertype::Found(sup) => {
                    if env.table.class(sup).is_final() {
                        let name = env.table.type_name(sup);
                        env.diagnostics.resolution(
                            ty.span(),
                            format!("cannot inherit from final class '{}'", name),
                        );
                    }
                    superclass = sup;
                }
                Supertype::Placeholder(sup) => superclass = sup,
                Supertype::Failed => {}
            }
        }
        for ty in &decl.implements {
            match supertype(env, file, ty, id) {
                Supertype::Found(sup) if !env.table.class(sup).is_interface() => {
                    env.diagnostics.resolution(ty.span(), "interface expected here");
                }
                Supertype::Found(sup) | Supertype::Placeholder(sup) => {
                    if interfaces.contains(&sup) {
                        let name = env.table.type_name(sup);
                        env.diagnostics
                            .resolution(ty.span(), format!("repeated interface '{}'", name));
                    } else {
                        interfaces.push(sup);
                    }
                }
                Supertype::Failed => {}
            }
        }
    }

    let class = env.table.class_mut(id);
    class.superclass = Some(superclass);
    class.interfaces = interfaces;
    blame
}

// ============================================================================
// CYCLES
// ============================================================================

fn direct_supertypes(table: &SymbolTable, id: ClassId) -> Vec<ClassId> {
    let class = table.class(id);
    class
        .superclass
        .into_iter()
        .chain(class.interfaces.iter().copied())
        .collect()
}

fn break_cycles(env: &mut Environment, order: &[(ClassId, Span)]) {
    let blame: FxHashMap<ClassId, Span> = order.iter().copied().collect();
    let mut cyclic: FxHashSet<ClassId> = FxHashSet::default();

    for &(root, _) in order {
        if env.table.class(root).state != ClassState::Declared {
            continue;
        }
        env.table.class_mut(root).state = ClassState::Resolving;
        let mut stack: Vec<(ClassId, usize)> = vec![(root, 0)];
        loop {
            let Some(top) = stack.last_mut() else {
                break;
            };
            let (id, next) = *top;
            top.1 += 1;
            let edges = direct_supertypes(&env.table, id);
            let Some(&target) = edges.get(next) else {
                env.table.class_mut(id).state = ClassState::Resolved;
                stack.pop();
                continue;
            };
            match env.table.class(target).state {
                ClassState::Resolving => {
                    let start = stack
                        .iter()
                        .position(|(member, _)| *member == target)
                        .unwrap_or(0);
                    let members: Vec<ClassId> = stack[start..].iter().map(|(m, _)| *m).collect();
                    report_cycle(env, id, target, &members, &blame);
                    cyclic.extend(members);
                }
                ClassState::Declared => {
                    env.table.class_mut(target).state = ClassState::Resolving;
                    stack.push((target, 0));
                }
                _ => {}
            }
        }
    }

    let object = env.table.well_known().object;
    for id in &cyclic {
        let class = env.table.class_mut(*id);
        class.superclass = Some(object);
        class.interfaces.retain(|iface| !cyclic.contains(iface));
    }
}

fn report_cycle(
    env: &mut Environment,
    closing: ClassId,
    target: ClassId,
    members: &[ClassId],
    blame: &FxHashMap<ClassId, Span>,
) {
    let name = env.table.type_name(target);
    debug!("cycle through '{}' ({} classes)", name, members.len());
    if let Some(span) = blame.get(&closing) {
        env.diagnostics
            .resolution(*span, format!("cyclic inheritance involving '{}'", name));
    }
    for member in members {
        if let Some(span) = env.table.class(*member).span() {
            env.blocked_files.insert(span.file);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::passes::tests_support::{environment, messages, run_passes};

    #[test]
    fn test_superclass_across_files_either_order() {
        for files in [
            [("A.java", "class A extends B {}"), ("B.java", "class B {}")],
            [("B.java", "class B {}"), ("A.java", "class A extends B {}")],
        ] {
            let (mut units, mut env) = environment(&files);
            run_passes(&mut units, &mut env, 2);
            let a = env.table.lookup_declared("A").unwrap();
            let b = env.table.lookup_declared("B").unwrap();
            assert_eq!(env.table.class(a).superclass, Some(b));
            assert_eq!(env.table.class(a).state, ClassState::Resolved);
            assert!(env.diagnostics.is_empty());
        }
    }

    #[test]
    fn test_self_cycle_reported_once() {
        let (mut units, mut env) = environment(&[("A.java", "class A extends A {}")]);
        run_passes(&mut units, &mut env, 2);
        assert_eq!(messages(&env), vec!["cyclic inheritance involving 'A'"]);
        let a = env.table.lookup_declared("A").unwrap();
        assert_eq!(env.table.class(a).superclass, Some(env.table.well_known().object));
    }

    #[test]
    fn test_two_class_cycle_blocks_both_files() {
        let (mut units, mut env) = environment(&[
            ("A.java", "class A extends B {}"),
            ("B.java", "class B extends A {}"),
        ]);
        run_passes(&mut units, &mut env, 2);
        assert_eq!(env.diagnostics.len(), 1);
        assert!(messages(&env)[0].starts_with("cyclic inheritance"));
        assert!(!env.is_clean(units[0].file));
        assert!(!env.is_clean(units[1].file));
    }

    #[test]
    fn test_unresolved_superclass_keeps_placeholder() {
        let (mut units, mut env) = environment(&[("A.java", "class A extends Missing {}")]);
        run_passes(&mut units, &mut env, 2);
        assert_eq!(messages(&env), vec!["cannot find class 'Missing'"]);
        let a = env.table.lookup_declared("A").unwrap();
        let placeholder = env.table.lookup_class("Missing").unwrap();
        assert_eq!(env.table.class(a).superclass, Some(placeholder));
        assert!(env.table.class(placeholder).is_continuation());
    }

    #[test]
    fn test_illegal_supertypes() {
        let (mut units, mut env) = environment(&[(
            "A.java",
            "interface I {} final class F {} class C {} \
             class A extends I {} class B extends F {} class D implements C {} \
             interface J extends C {}",
        )]);
        run_passes(&mut units, &mut env, 2);
        assert_eq!(
            messages(&env),
            vec![
                "no interface expected here",
                "cannot inherit from final class 'F'",
                "interface expected here",
                "interface 'J' cannot extend class 'C'",
            ]
        );
    }

    #[test]
    fn test_imports_checked() {
        let (mut units, mut env) = environment(&[
            ("p/P.java", "package p; public class P {}"),
            (
                "A.java",
                "import p.P; import p.Q; import nowhere.*; import java.util.*; class A {}",
            ),
        ]);
        run_passes(&mut units, &mut env, 2);
        assert_eq!(
            messages(&env),
            vec![
                "cannot find class 'p.Q'",
                "package 'nowhere' does not exist",
                "package 'java.util' does not exist",
            ]
        );
    }
}
