//! Pass 1: register every declared type.
//!
//! Files are visited in batch order. A supertype name that does not resolve
//! yet gets a continuation record, which a later declaration of that name
//! promotes in place.

use smol_str::SmolStr;
use tracing::{debug, trace};

use super::Environment;
use crate::base::FileId;
use crate::hir::InvariantViolation;
use crate::hir::diagnostics::DiagnosticKind;
use crate::hir::resolve::{FileContext, TypeLookup};
use crate::hir::symbols::{ClassId, ClassKind, ClassOrigin};
use crate::syntax::ast::{CompilationUnit, Member, TypeDecl, TypeExpr};

pub fn run(units: &mut [CompilationUnit], env: &mut Environment) -> Result<(), InvariantViolation> {
    debug!("catalog: {} files", units.len());
    for unit in units.iter() {
        let ctx = FileContext::of_unit(unit);
        if !ctx.package.is_empty() {
            env.table.add_package(&ctx.package);
        }
        env.contexts.insert(unit.file, ctx);
    }

    for unit in units.iter() {
        let package = unit.package_name();
        for decl in &unit.types {
            let qname = if package.is_empty() {
                decl.name.text.clone()
            } else {
                SmolStr::new(format!("{}.{}", package, decl.name.text))
            };
            catalog_type(env, unit.file, decl, qname, None);
        }
    }

    for unit in units.iter() {
        for decl in super::all_type_decls(unit) {
            let Some(id) = env.class_of(decl) else {
                continue;
            };
            let qname = env.table.class(id).qname.clone();
            if env.table.is_package(&qname) {
                env.diagnostics.resolution(
                    decl.name.span,
                    format!("class '{}' clashes with package of same name", qname),
                );
            }
        }
    }
    Ok(())
}

fn catalog_type(
    env: &mut Environment,
    file: FileId,
    decl: &TypeDecl,
    qname: SmolStr,
    enclosing: Option<ClassId>,
) {
    let kind = if decl.is_interface() {
        ClassKind::Interface
    } else {
        ClassKind::Class
    };
    let id = match env.table.lookup_class(&qname) {
        Some(existing) if env.table.class(existing).is_continuation() => {
            env.table
                .promote(existing, kind, decl.modifiers.clone(), decl.span, enclosing);
            existing
        }
        Some(_) => {
            env.diagnostics
                .duplicate(DiagnosticKind::Resolution, decl.name.span, "class", &qname);
            return;
        }
        None => {
            trace!("declared '{}'", qname);
            env.table.declare_class(
                qname.clone(),
                kind,
                decl.modifiers.clone(),
                ClassOrigin::Source(decl.span),
                enclosing,
            )
        }
    };
    env.decl_classes.insert(decl.span, id);

    for sup in decl.extends.iter().chain(&decl.implements) {
        let TypeExpr::Named(name) = sup else {
            continue;
        };
        if env.lookup_type(file, &name.dotted(), Some(id)) != TypeLookup::NotFound {
            continue;
        }
        let guess = env.placeholder_name(file, name);
        env.table.continuation(&guess, name.span);
    }

    for member in &decl.members {
        if let Member::Type(inner) = member {
            let inner_qname = SmolStr::new(format!("{}.{}", qname, inner.name.text));
            catalog_type(env, file, inner, inner_qname, Some(id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::passes::tests_support::{environment, messages, run_passes};
    use crate::hir::symbols::ClassState;

    #[test]
    fn test_forward_reference_is_promoted() {
        let (mut units, mut env) = environment(&[
            ("A.java", "class A extends B {}"),
            ("B.java", "class B {}"),
        ]);
        run(&mut units, &mut env).unwrap();
        let a = env.class_of(&units[0].types[0]).unwrap();
        let b = env.class_of(&units[1].types[0]).unwrap();
        assert_ne!(a, b);
        assert_eq!(env.table.lookup_class("B"), Some(b));
        assert_eq!(env.table.class(b).state, ClassState::Declared);
        assert!(env.diagnostics.is_empty());
    }

    #[test]
    fn test_duplicate_class_reported_once() {
        let (mut units, mut env) = environment(&[
            ("A.java", "class A {}"),
            ("A2.java", "class A {}"),
        ]);
        run(&mut units, &mut env).unwrap();
        assert_eq!(env.diagnostics.len(), 1);
        assert_eq!(env.diagnostics.diagnostics()[0].kind, DiagnosticKind::Resolution);
        assert!(env.class_of(&units[1].types[0]).is_none());
    }

    #[test]
    fn test_nested_types_cataloged() {
        let (mut units, mut env) =
            environment(&[("Outer.java", "package p; class Outer { class Inner {} }")]);
        run(&mut units, &mut env).unwrap();
        let inner = env.table.lookup_declared("p.Outer.Inner").unwrap();
        assert_eq!(env.table.class(inner).name, "Inner");
        assert_eq!(env.table.class(inner).package, "p");
    }

    #[test]
    fn test_class_package_clash() {
        let (mut units, mut env) = environment(&[
            ("a/b.java", "package a; class b {}"),
            ("a/b/C.java", "package a.b; class C {}"),
        ]);
        run(&mut units, &mut env).unwrap();
        assert_eq!(env.diagnostics.len(), 1);
        assert!(env.diagnostics.diagnostics()[0].message.contains("clashes with package"));
    }

    #[test]
    fn test_forward_reference_to_nested_type_either_order() {
        for files in [
            [
                ("A.java", "class A extends Outer.Inner {}"),
                ("Outer.java", "class Outer { int k; static class Inner { int f() { return 1; } } }"),
            ],
            [
                ("Outer.java", "class Outer { int k; static class Inner { int f() { return 1; } } }"),
                ("A.java", "class A extends Outer.Inner {}"),
            ],
        ] {
            let (mut units, mut env) = environment(&files);
            run_passes(&mut units, &mut env, 4);
            assert!(env.diagnostics.is_empty(), "{:?}", messages(&env));
            assert!(!env.table.is_package("Outer"));

            let outer = env.table.lookup_declared("Outer").unwrap();
            let inner = env.table.lookup_declared("Outer.Inner").unwrap();
            let a = env.table.lookup_declared("A").unwrap();
            let record = env.table.class(inner);
            assert_eq!(record.name, "Inner");
            assert_eq!(record.package, "");
            assert_eq!(record.enclosing, Some(outer));
            assert_eq!(env.table.scope(record.scope).parent, Some(env.table.class(outer).scope));
            assert_eq!(env.table.class(outer).nested.get("Inner"), Some(&inner));
            assert_eq!(env.table.class(a).superclass, Some(inner));
        }
    }

    #[test]
    fn test_promoted_nested_type_keeps_declared_package() {
        let (mut units, mut env) = environment(&[
            ("A.java", "package q; class A extends p.Outer.Inner {}"),
            ("Outer.java", "package p; class Outer { static class Inner {} }"),
        ]);
        run(&mut units, &mut env).unwrap();
        assert!(env.diagnostics.is_empty());
        let inner = env.table.lookup_declared("p.Outer.Inner").unwrap();
        assert_eq!(env.table.class(inner).package, "p");
        assert!(env.table.is_package("p"));
        assert!(!env.table.is_package("p.Outer"));
    }
}
