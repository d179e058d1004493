//! Name resolution — type names to class records.
//!
//! Resolution is query-time against the shared [`SymbolTable`] plus a
//! per-file [`FileContext`] holding the package and imports.
//!
//! A simple type name is looked up in this order:
//!
//! 1. member types of the enclosing classes and their superclasses
//! 2. types of the current package
//! 3. single-type imports
//! 4. on-demand imports and the implicit `java.lang.*`
//!
//! Continuations are placeholders, not declarations, and never match.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::trace;

use super::symbols::{ClassId, SymbolTable};
use crate::base::{FileId, Span};
use crate::syntax::ast::CompilationUnit;

/// Package implicitly imported on demand by every file.
pub const IMPLICIT_PACKAGE: &str = "java.lang";

// ============================================================================
// FILE CONTEXT
// ============================================================================

/// Package and imports of one compilation unit.
#[derive(Clone, Debug, Default)]
pub struct FileContext {
    pub file: FileId,
    pub package: SmolStr,
    /// Simple name → (qualified name, import span), first import wins.
    pub single: IndexMap<SmolStr, (SmolStr, Span)>,
    /// Packages (or classes, for member types) imported with `.*`.
    pub on_demand: Vec<SmolStr>,
}

impl FileContext {
    /// Context of a unit; imports are recorded, not validated.
    pub fn of_unit(unit: &CompilationUnit) -> Self {
        let mut ctx = Self {
            file: unit.file,
            package: unit.package_name(),
            ..Self::default()
        };
        for import in &unit.imports {
            let path = import.path.dotted();
            if import.on_demand {
                if !ctx.on_demand.contains(&path) {
                    ctx.on_demand.push(path);
                }
            } else {
                let simple = import.path.last().text.clone();
                ctx.single.entry(simple).or_insert((path, import.span));
            }
        }
        ctx
    }

    /// Qualified name a top-level type `name` of this file has.
    pub fn qualify(&self, name: &str) -> SmolStr {
        if self.package.is_empty() {
            SmolStr::new(name)
        } else {
            SmolStr::new(format!("{}.{}", self.package, name))
        }
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

/// Outcome of a type-name lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeLookup {
    Found(ClassId),
    /// More than one on-demand import supplies the name.
    Ambiguous(Vec<SmolStr>),
    NotFound,
}

impl TypeLookup {
    pub fn found(&self) -> Option<ClassId> {
        match self {
            TypeLookup::Found(id) => Some(*id),
            _ => None,
        }
    }
}

/// Type-name lookup from inside one file.
pub struct Resolver<'a> {
    table: &'a SymbolTable,
    ctx: &'a FileContext,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a SymbolTable, ctx: &'a FileContext) -> Self {
        Self { table, ctx }
    }

    /// Resolve a dotted or simple type name seen inside `from`.
    pub fn resolve(&self, dotted: &str, from: Option<ClassId>) -> TypeLookup {
        let parts: Vec<&str> = dotted.split('.').collect();
        match parts.as_slice() {
            [] => TypeLookup::NotFound,
            [simple] => self.simple(simple, from),
            [first, rest @ ..] => {
                if let Some(id) = self.table.lookup_declared(dotted) {
                    return TypeLookup::Found(id);
                }
                match self.simple(first, from) {
                    TypeLookup::Found(outer) => self
                        .member_path(outer, rest)
                        .map_or(TypeLookup::NotFound, TypeLookup::Found),
                    other => other,
                }
            }
        }
    }

    /// Resolve a simple type name seen inside `from`.
    pub fn simple(&self, name: &str, from: Option<ClassId>) -> TypeLookup {
        if let Some(id) = from.and_then(|class| self.member_type(class, name)) {
            trace!("'{}' resolved as member type", name);
            return TypeLookup::Found(id);
        }
        if let Some(id) = self.table.lookup_declared(&self.ctx.qualify(name)) {
            return TypeLookup::Found(id);
        }
        if let Some((qname, _)) = self.ctx.single.get(name)
            && let Some(id) = self.table.lookup_declared(qname)
        {
            return TypeLookup::Found(id);
        }
        self.on_demand(name)
    }

    /// A member type named `name` visible inside `class`: declared by it,
    /// by an enclosing class, or inherited by either.
    pub fn member_type(&self, class: ClassId, name: &str) -> Option<ClassId> {
        let mut current = Some(class);
        while let Some(id) = current {
            let decl = self.table.class(id);
            if decl.name == name && decl.enclosing.is_some() {
                return Some(id);
            }
            for sup in self.table.superclass_chain(id) {
                if let Some(nested) = self.table.class(sup).nested.get(name) {
                    return Some(*nested);
                }
            }
            current = decl.enclosing;
        }
        None
    }

    /// Walk member types of `outer` along `path`.
    fn member_path(&self, outer: ClassId, path: &[&str]) -> Option<ClassId> {
        path.iter().try_fold(outer, |class, part| {
            self.table
                .superclass_chain(class)
                .into_iter()
                .find_map(|sup| self.table.class(sup).nested.get(*part).copied())
        })
    }

    fn on_demand(&self, name: &str) -> TypeLookup {
        let mut found: Vec<ClassId> = Vec::new();
        let implicit = SmolStr::new_static(IMPLICIT_PACKAGE);
        let packages = self
            .ctx
            .on_demand
            .iter()
            .chain(std::iter::once(&implicit));
        for package in packages {
            let qname = format!("{}.{}", package, name);
            if let Some(id) = self.table.lookup_declared(&qname)
                && !found.contains(&id)
            {
                found.push(id);
            }
        }
        match found.as_slice() {
            [] => TypeLookup::NotFound,
            [id] => TypeLookup::Found(*id),
            _ => TypeLookup::Ambiguous(
                found
                    .iter()
                    .map(|id| self.table.class(*id).qname.clone())
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::symbols::{ClassKind, ClassOrigin};
    use crate::syntax::ast::Modifiers;

    fn declare(table: &mut SymbolTable, qname: &str, enclosing: Option<ClassId>) -> ClassId {
        let object = table.well_known().object;
        let id = table.declare_class(
            qname,
            ClassKind::Class,
            Modifiers::empty(Span::empty(FileId::new(0))),
            ClassOrigin::Source(Span::empty(FileId::new(0))),
            enclosing,
        );
        table.class_mut(id).superclass = Some(object);
        id
    }

    fn ctx(package: &str, single: &[&str], on_demand: &[&str]) -> FileContext {
        let mut ctx = FileContext {
            package: SmolStr::new(package),
            ..FileContext::default()
        };
        for qname in single {
            let simple = qname.rsplit('.').next().unwrap_or(qname);
            ctx.single
                .insert(SmolStr::new(simple), (SmolStr::new(*qname), Span::empty(FileId::new(0))));
        }
        ctx.on_demand = on_demand.iter().map(|p| SmolStr::new(*p)).collect();
        ctx
    }

    #[test]
    fn test_same_package_before_java_lang() {
        let mut table = SymbolTable::new().unwrap();
        let mine = declare(&mut table, "shapes.String", None);
        let ctx = ctx("shapes", &[], &[]);
        let resolver = Resolver::new(&table, &ctx);
        assert_eq!(resolver.simple("String", None), TypeLookup::Found(mine));
        assert_eq!(
            resolver.resolve("java.lang.String", None),
            TypeLookup::Found(table.well_known().string)
        );
    }

    #[test]
    fn test_single_import_and_implicit_java_lang() {
        let mut table = SymbolTable::new().unwrap();
        let point = declare(&mut table, "geo.Point", None);
        let ctx = ctx("", &["geo.Point"], &[]);
        let resolver = Resolver::new(&table, &ctx);
        assert_eq!(resolver.simple("Point", None), TypeLookup::Found(point));
        assert_eq!(
            resolver.simple("Object", None),
            TypeLookup::Found(table.well_known().object)
        );
        assert_eq!(resolver.simple("Missing", None), TypeLookup::NotFound);
    }

    #[test]
    fn test_two_on_demand_imports_are_ambiguous() {
        let mut table = SymbolTable::new().unwrap();
        declare(&mut table, "a.Shape", None);
        declare(&mut table, "b.Shape", None);
        let ctx = ctx("", &[], &["a", "b"]);
        let resolver = Resolver::new(&table, &ctx);
        assert_eq!(
            resolver.simple("Shape", None),
            TypeLookup::Ambiguous(vec!["a.Shape".into(), "b.Shape".into()])
        );
    }

    #[test]
    fn test_member_types_of_enclosing_and_super_classes() {
        let mut table = SymbolTable::new().unwrap();
        let outer = declare(&mut table, "Outer", None);
        let inner = declare(&mut table, "Outer.Inner", Some(outer));
        let sub = declare(&mut table, "Sub", None);
        table.class_mut(sub).superclass = Some(outer);
        let ctx = ctx("", &[], &[]);
        let resolver = Resolver::new(&table, &ctx);
        assert_eq!(resolver.simple("Inner", Some(inner)), TypeLookup::Found(inner));
        assert_eq!(resolver.simple("Inner", Some(sub)), TypeLookup::Found(inner));
        assert_eq!(resolver.resolve("Sub.Inner", None), TypeLookup::Found(inner));
        assert_eq!(resolver.simple("Inner", None), TypeLookup::NotFound);
    }

    #[test]
    fn test_continuations_never_match() {
        let mut table = SymbolTable::new().unwrap();
        table.continuation("Later", Span::empty(FileId::new(0)));
        let ctx = ctx("", &[], &[]);
        let resolver = Resolver::new(&table, &ctx);
        assert_eq!(resolver.simple("Later", None), TypeLookup::NotFound);
    }
}
