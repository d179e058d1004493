//! The ordered conversion passes.
//!
//! ```text
//! catalog     → every declared type registered, continuations created
//!     │
//! supertypes  → extends/implements resolved, cycles broken
//!     │
//! members     → fields, methods and generated members bound
//!     │
//! bodies      → expressions typed, definite assignment checked
//!     │
//! augment     → explicit source for every clean file
//! ```
//!
//! Each pass runs over the whole batch before the next one starts and
//! shares one [`Environment`]. Problems with the input become diagnostics;
//! only [`InvariantViolation`]s stop a pass.

pub mod augment;
pub mod bodies;
pub mod catalog;
pub mod members;
pub mod supertypes;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::InvariantViolation;
use super::diagnostics::{DiagnosticCollector, DiagnosticKind};
use super::resolve::{FileContext, Resolver, TypeLookup};
use super::symbols::{ClassId, ScopeId, SymbolTable, VarId};
use crate::base::{FileId, FileSet, Span};
use crate::levels::LevelConfig;
use crate::syntax::ast::{CompilationUnit, Member, QualifiedName, TypeDecl, TypeExpr};

/// State threaded through every pass of one run.
pub struct Environment {
    pub table: SymbolTable,
    pub config: LevelConfig,
    pub files: FileSet,
    pub diagnostics: DiagnosticCollector,
    pub contexts: FxHashMap<FileId, FileContext>,
    /// Type declaration span → its class. Rejected duplicates have no entry.
    pub decl_classes: FxHashMap<Span, ClassId>,
    /// Method declaration span → its scope.
    pub decl_methods: FxHashMap<Span, ScopeId>,
    /// Field declarator span → its variable.
    pub decl_fields: FxHashMap<Span, VarId>,
    /// Leading parameters a generated constructor forwards to `super`.
    pub super_args: FxHashMap<ScopeId, usize>,
    /// Files excluded from augmentation besides those with diagnostics.
    pub blocked_files: FxHashSet<FileId>,
    /// Augmented source per file, in batch order.
    pub outputs: IndexMap<FileId, String>,
}

impl Environment {
    pub fn new(config: LevelConfig, files: FileSet) -> Result<Self, InvariantViolation> {
        Ok(Self {
            table: SymbolTable::new()?,
            config,
            files,
            diagnostics: DiagnosticCollector::new(),
            contexts: FxHashMap::default(),
            decl_classes: FxHashMap::default(),
            decl_methods: FxHashMap::default(),
            decl_fields: FxHashMap::default(),
            super_args: FxHashMap::default(),
            blocked_files: FxHashSet::default(),
            outputs: IndexMap::new(),
        })
    }

    pub fn class_of(&self, decl: &TypeDecl) -> Option<ClassId> {
        self.decl_classes.get(&decl.span).copied()
    }

    pub fn level_name(&self) -> &'static str {
        self.config.level.name()
    }

    /// Whether `file` may still be augmented.
    pub fn is_clean(&self, file: FileId) -> bool {
        !self.blocked_files.contains(&file) && !self.diagnostics.has_errors_in(file)
    }

    /// Look up a type name as seen from `from` inside `file`.
    pub fn lookup_type(&self, file: FileId, dotted: &str, from: Option<ClassId>) -> TypeLookup {
        let fallback;
        let ctx = match self.contexts.get(&file) {
            Some(ctx) => ctx,
            None => {
                fallback = FileContext {
                    file,
                    ..FileContext::default()
                };
                &fallback
            }
        };
        Resolver::new(&self.table, ctx).resolve(dotted, from)
    }

    /// Resolve a written type. Failures are reported and yield the error
    /// type so dependent checks stay quiet.
    pub fn resolve_type(&mut self, file: FileId, ty: &TypeExpr, from: Option<ClassId>) -> ClassId {
        let known = self.table.well_known();
        match ty {
            TypeExpr::Primitive(prim, _) => known.primitive(*prim),
            TypeExpr::Void(_) => known.void,
            TypeExpr::Named(name) => {
                let error = known.error;
                let dotted = name.dotted();
                match self.lookup_type(file, &dotted, from) {
                    TypeLookup::Found(id) => id,
                    TypeLookup::Ambiguous(candidates) => {
                        self.report_ambiguous(name.span, &dotted, &candidates);
                        error
                    }
                    TypeLookup::NotFound => {
                        self.diagnostics
                            .resolution(name.span, format!("cannot find class '{}'", dotted));
                        error
                    }
                }
            }
            TypeExpr::Array(element, _) => {
                let element = self.resolve_type(file, element, from);
                if element == self.table.well_known().error {
                    element
                } else {
                    self.table.array_of(element)
                }
            }
        }
    }

    /// Qualified name a continuation for the unresolved `name` gets:
    /// the single import naming it, else the file's package.
    pub fn placeholder_name(&self, file: FileId, name: &QualifiedName) -> SmolStr {
        let dotted = name.dotted();
        match self.contexts.get(&file) {
            Some(ctx) if name.is_simple() => match ctx.single.get(&dotted) {
                Some((imported, _)) => imported.clone(),
                None => ctx.qualify(&dotted),
            },
            _ => dotted,
        }
    }

    /// `name(T1, T2)` as used in messages.
    pub fn describe_sig(&self, name: &str, params: &[ClassId]) -> String {
        let params: Vec<SmolStr> = params.iter().map(|p| self.table.type_name(*p)).collect();
        format!("{}({})", name, params.join(", "))
    }

    /// Message form of a method; constructors use the class name.
    pub fn describe_method(&self, scope: ScopeId) -> String {
        let Some(method) = self.table.method(scope) else {
            return String::new();
        };
        let name = if method.is_constructor() {
            self.table.class(method.class).name.clone()
        } else {
            method.name.clone()
        };
        self.describe_sig(&name, &self.table.param_types(scope))
    }

    pub fn report_ambiguous(&mut self, span: Span, name: &str, candidates: &[SmolStr]) {
        let list: Vec<&str> = candidates.iter().map(|c| c.as_str()).collect();
        self.diagnostics.resolution(
            span,
            format!("reference to '{}' is ambiguous: {}", name, list.join(" and ")),
        );
    }

    /// Report an array type written where the level has no arrays.
    pub fn check_array_type(&mut self, ty: &TypeExpr, kind: DiagnosticKind) {
        if ty.is_array() && !self.config.allow_arrays {
            let level = self.level_name();
            self.diagnostics.not_allowed(kind, ty.span(), "array type", level);
        }
    }
}

/// Every type declaration of a unit, nested ones included, outer first.
pub fn all_type_decls(unit: &CompilationUnit) -> Vec<&TypeDecl> {
    fn walk<'u>(decl: &'u TypeDecl, out: &mut Vec<&'u TypeDecl>) {
        out.push(decl);
        for member in &decl.members {
            if let Member::Type(inner) = member {
                walk(inner, out);
            }
        }
    }
    let mut out = Vec::new();
    for decl in &unit.types {
        walk(decl, &mut out);
    }
    out
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use crate::levels::Level;
    use crate::parser::parse_unit;

    /// Parse `files` into units sharing a fresh environment at the full level.
    pub fn environment(files: &[(&str, &str)]) -> (Vec<CompilationUnit>, Environment) {
        environment_at(Level::Full, files)
    }

    pub fn environment_at(
        level: Level,
        files: &[(&str, &str)],
    ) -> (Vec<CompilationUnit>, Environment) {
        let mut set = FileSet::new();
        let units = files
            .iter()
            .map(|(path, text)| {
                let file = set.add(*path);
                parse_unit(file, text).unwrap()
            })
            .collect();
        let env = Environment::new(level.config(), set).unwrap();
        (units, env)
    }

    /// Run the first `count` passes.
    pub fn run_passes(units: &mut [CompilationUnit], env: &mut Environment, count: usize) {
        let passes: [fn(&mut [CompilationUnit], &mut Environment) -> Result<(), InvariantViolation>;
            5] = [
            catalog::run,
            supertypes::run,
            members::run,
            bodies::run,
            augment::run,
        ];
        for pass in passes.iter().take(count) {
            pass(units, env).unwrap();
        }
    }

    /// Diagnostic messages in report order.
    pub fn messages(env: &Environment) -> Vec<String> {
        env.diagnostics
            .diagnostics()
            .iter()
            .map(|d| d.message.to_string())
            .collect()
    }
}
