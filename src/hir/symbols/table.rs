//! The symbol table shared by every pass of one run.
//!
//! Classes, scopes and variables live in arenas owned by the table; passes
//! hold [`ClassId`], [`ScopeId`] and [`VarId`] handles into it. Classes are
//! also indexed by qualified name, so two references to the same name always
//! reach the same record.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::trace;

use super::{
    Body, ClassDecl, ClassId, ClassKind, ClassOrigin, ClassState, InstanceType, MethodScope,
    MethodSig, ScopeId, ScopeKind, ScopeNode, VarId, VariableData,
};
use crate::base::{FileId, Span};
use crate::hir::InvariantViolation;
use crate::hir::library::{self, WellKnown};
use crate::syntax::ast::{Modifier, Modifiers, PrimitiveType};

#[derive(Debug, Clone)]
pub struct SymbolTable {
    /// Arena storage for all classes - single source of truth
    classes: Vec<ClassDecl>,
    scopes: Vec<ScopeNode>,
    vars: Vec<VariableData>,
    /// Index for qualified name lookups: qname -> ClassId
    by_qname: IndexMap<SmolStr, ClassId>,
    /// Every package name seen, prefixes included.
    packages: FxHashSet<SmolStr>,
    /// Element class -> array class
    arrays: FxHashMap<ClassId, ClassId>,
    root: ScopeId,
    well_known: WellKnown,
}

impl SymbolTable {
    /// A table with the library classes loaded.
    pub fn new() -> Result<Self, InvariantViolation> {
        let mut table = Self::empty();
        table.well_known = library::preload(&mut table)?;
        Ok(table)
    }

    fn empty() -> Self {
        Self {
            classes: Vec::new(),
            scopes: vec![ScopeNode::new(None, ScopeKind::Root)],
            vars: Vec::new(),
            by_qname: IndexMap::new(),
            packages: FxHashSet::default(),
            arrays: FxHashMap::default(),
            root: ScopeId::new(0),
            well_known: WellKnown::placeholder(),
        }
    }

    pub fn root_scope(&self) -> ScopeId {
        self.root
    }

    pub fn well_known(&self) -> &WellKnown {
        &self.well_known
    }

    // ============================================================
    // Arena access
    // ============================================================

    pub fn class(&self, id: ClassId) -> &ClassDecl {
        &self.classes[id.index()]
    }

    pub fn class_mut(&mut self, id: ClassId) -> &mut ClassDecl {
        &mut self.classes[id.index()]
    }

    pub fn scope(&self, id: ScopeId) -> &ScopeNode {
        &self.scopes[id.index()]
    }

    pub fn var(&self, id: VarId) -> &VariableData {
        &self.vars[id.index()]
    }

    pub fn var_mut(&mut self, id: VarId) -> &mut VariableData {
        &mut self.vars[id.index()]
    }

    pub fn method(&self, scope: ScopeId) -> Option<&MethodScope> {
        self.scope(scope).method()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// All classes in creation order.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDecl)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, class)| (ClassId::new(idx), class))
    }

    // ============================================================
    // Classes
    // ============================================================

    /// Any record under this name, continuations included.
    pub fn lookup_class(&self, qname: &str) -> Option<ClassId> {
        self.by_qname.get(qname).copied()
    }

    /// A record under this name that is more than a placeholder.
    pub fn lookup_declared(&self, qname: &str) -> Option<ClassId> {
        self.lookup_class(qname)
            .filter(|id| !self.class(*id).is_continuation())
    }

    /// Create a declared class record. The caller checks for duplicates.
    pub fn declare_class(
        &mut self,
        qname: impl Into<SmolStr>,
        kind: ClassKind,
        modifiers: Modifiers,
        origin: ClassOrigin,
        enclosing: Option<ClassId>,
    ) -> ClassId {
        let id = self.push_class(qname.into(), kind, modifiers, origin, enclosing);
        self.class_mut(id).state = ClassState::Declared;
        let package = self.class(id).package.clone();
        self.add_package(&package);
        id
    }

    /// The record for `qname`, creating a continuation if it is unseen.
    pub fn continuation(&mut self, qname: &str, first_use: Span) -> ClassId {
        if let Some(id) = self.lookup_class(qname) {
            return id;
        }
        trace!("continuation created for '{}'", qname);
        self.push_class(
            SmolStr::new(qname),
            ClassKind::Class,
            Modifiers::empty(first_use),
            ClassOrigin::Reference(first_use),
            None,
        )
    }

    /// Turn a continuation into the declared class, keeping its handle.
    ///
    /// Members accumulated on the placeholder stay on the record.
    pub fn promote(
        &mut self,
        id: ClassId,
        kind: ClassKind,
        modifiers: Modifiers,
        span: Span,
        enclosing: Option<ClassId>,
    ) {
        trace!("continuation '{}' promoted", self.class(id).qname);
        let qname = self.class(id).qname.clone();
        let (package, name) = self.split_in(&qname, enclosing);
        self.add_package(&package);
        {
            let class = self.class_mut(id);
            class.package = package;
            class.name = name;
        }
        if let Some(outer) = enclosing {
            let (scope, parent) = (self.class(id).scope, self.class(outer).scope);
            self.reparent_scope(scope, parent);
            self.attach_nested(outer, id);
        }
        let class = self.class_mut(id);
        class.kind = kind;
        for modifier in modifiers.iter() {
            class.modifiers.push(modifier);
        }
        class.modifiers.span = modifiers.span;
        class.origin = ClassOrigin::Source(span);
        class.enclosing = enclosing;
        class.state = ClassState::Declared;
    }

    fn push_class(
        &mut self,
        qname: SmolStr,
        kind: ClassKind,
        modifiers: Modifiers,
        origin: ClassOrigin,
        enclosing: Option<ClassId>,
    ) -> ClassId {
        let id = ClassId::new(self.classes.len());
        let parent = match enclosing {
            Some(outer) => self.class(outer).scope,
            None => self.root,
        };
        let scope = self.new_scope(parent, ScopeKind::Class(id));
        let (package, name) = self.split_in(&qname, enclosing);
        self.classes.push(ClassDecl {
            qname: qname.clone(),
            name,
            package,
            kind,
            modifiers,
            superclass: None,
            interfaces: Vec::new(),
            methods: IndexMap::new(),
            fields: Vec::new(),
            nested: IndexMap::new(),
            enclosing,
            state: ClassState::Continuation,
            generated: false,
            origin,
            scope,
        });
        self.by_qname.insert(qname, id);
        if let Some(outer) = enclosing {
            self.attach_nested(outer, id);
        }
        id
    }

    /// Package and simple name of `qname` declared inside `enclosing`.
    fn split_in(&self, qname: &str, enclosing: Option<ClassId>) -> (SmolStr, SmolStr) {
        match enclosing {
            Some(outer) => {
                let outer = self.class(outer);
                let name = qname
                    .strip_prefix(outer.qname.as_str())
                    .and_then(|rest| rest.strip_prefix('.'))
                    .unwrap_or(qname);
                (outer.package.clone(), SmolStr::new(name))
            }
            None => split_qname(qname),
        }
    }

    fn reparent_scope(&mut self, scope: ScopeId, parent: ScopeId) {
        if let Some(old) = self.scopes[scope.index()].parent {
            self.scopes[old.index()].children.retain(|child| *child != scope);
        }
        self.scopes[scope.index()].parent = Some(parent);
        self.scopes[parent.index()].children.push(scope);
    }

    fn attach_nested(&mut self, outer: ClassId, inner: ClassId) {
        let name = self.class(inner).name.clone();
        self.class_mut(outer).nested.insert(name, inner);
    }

    /// The array class of `element`, created on first use.
    pub fn array_of(&mut self, element: ClassId) -> ClassId {
        if let Some(id) = self.arrays.get(&element) {
            return *id;
        }
        let qname = SmolStr::new(format!("{}[]", self.class(element).qname));
        let id = self.push_class(
            qname,
            ClassKind::Array(element),
            Modifiers::empty(Span::empty(FileId::new(0))),
            ClassOrigin::Library,
            None,
        );
        let object = self.well_known.object;
        let int = self.well_known.primitive(PrimitiveType::Int);
        let scope = self.class(id).scope;
        let mut modifiers = Modifiers::empty(Span::empty(FileId::new(0)));
        modifiers.push(Modifier::Public);
        modifiers.push(Modifier::Final);
        let length = VariableData::new(
            "length",
            modifiers,
            InstanceType::new(int),
            scope,
            Span::empty(FileId::new(0)),
        )
        .with_initializer();
        // array classes are fresh, so the name is free
        if let Ok(var) = self.add_var(scope, length) {
            self.class_mut(id).fields.push(var);
        }
        let class = self.class_mut(id);
        class.superclass = Some(object);
        class.state = ClassState::Resolved;
        self.arrays.insert(element, id);
        id
    }

    // ============================================================
    // Packages
    // ============================================================

    /// Register a package name and every prefix of it.
    pub fn add_package(&mut self, name: &str) {
        if name.is_empty() {
            return;
        }
        let mut end = 0;
        for part in name.split('.') {
            end += part.len();
            self.packages.insert(SmolStr::new(&name[..end]));
            end += 1;
        }
    }

    pub fn is_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    // ============================================================
    // Scopes and variables
    // ============================================================

    pub fn new_scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId::new(self.scopes.len());
        self.scopes.push(ScopeNode::new(Some(parent), kind));
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Create the scope of a method and register it under `sig`.
    ///
    /// Returns the existing scope as `Err` if the class already has `sig`.
    pub fn add_method(&mut self, sig: MethodSig, method: MethodScope) -> Result<ScopeId, ScopeId> {
        let class = method.class;
        if let Some(existing) = self.class(class).methods.get(&sig) {
            return Err(*existing);
        }
        let parent = self.class(class).scope;
        let scope = self.new_scope(parent, ScopeKind::Body(Body::Method(method)));
        self.class_mut(class).methods.insert(sig, scope);
        Ok(scope)
    }

    pub fn add_block(&mut self, parent: ScopeId) -> ScopeId {
        self.new_scope(parent, ScopeKind::Body(Body::Block))
    }

    /// Declare a variable in `scope`.
    ///
    /// Returns the existing variable as `Err` if the name is taken in that
    /// scope. Outer scopes are not consulted.
    pub fn add_var(&mut self, scope: ScopeId, data: VariableData) -> Result<VarId, VarId> {
        if let Some(existing) = self.scope(scope).vars.get(&data.name) {
            return Err(*existing);
        }
        let id = VarId::new(self.vars.len());
        let name = data.name.clone();
        self.vars.push(data);
        self.scopes[scope.index()].vars.insert(name, id);
        Ok(id)
    }

    /// Append a parameter to the method owning `scope`.
    pub fn push_param(&mut self, scope: ScopeId, var: VarId) {
        if let ScopeKind::Body(Body::Method(method)) = &mut self.scopes[scope.index()].kind {
            method.params.push(var);
        }
    }

    /// Lexical lookup: the local scope first, then outward. Class scopes
    /// also see inherited fields.
    pub fn lookup_var(&self, scope: ScopeId, name: &str) -> Option<VarId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.scope(id);
            if let ScopeKind::Class(class) = node.kind {
                if let Some(var) = self.find_field(class, name) {
                    return Some(var);
                }
            } else if let Some(var) = node.vars.get(name) {
                return Some(*var);
            }
            current = node.parent;
        }
        None
    }

    /// Walk enclosing scopes until a class scope is reached.
    pub fn nearest_enclosing_class(&self, scope: ScopeId) -> Result<ClassId, InvariantViolation> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.scope(id);
            if let ScopeKind::Class(class) = node.kind {
                return Ok(class);
            }
            current = node.parent;
        }
        Err(InvariantViolation::NoEnclosingClass(scope))
    }

    /// The method scope enclosing `scope`, if any.
    pub fn enclosing_method(&self, scope: ScopeId) -> Option<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let node = self.scope(id);
            match node.kind {
                ScopeKind::Body(Body::Method(_)) => return Some(id),
                ScopeKind::Class(_) | ScopeKind::Root => return None,
                ScopeKind::Body(Body::Block) => current = node.parent,
            }
        }
        None
    }

    // ============================================================
    // Hierarchy queries
    // ============================================================

    /// Superclass chain starting at `class` itself.
    pub fn superclass_chain(&self, class: ClassId) -> Vec<ClassId> {
        let mut chain = vec![class];
        let mut current = self.class(class).superclass;
        while let Some(id) = current {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self.class(id).superclass;
        }
        chain
    }

    /// `class`, its superclasses and every interface they implement.
    pub fn all_supertypes(&self, class: ClassId) -> Vec<ClassId> {
        let mut seen = Vec::new();
        let mut stack = vec![class];
        while let Some(id) = stack.pop() {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            let decl = self.class(id);
            for iface in decl.interfaces.iter().rev() {
                stack.push(*iface);
            }
            if let Some(sup) = decl.superclass {
                stack.push(sup);
            }
        }
        seen
    }

    pub fn is_subtype(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || self.all_supertypes(sub).contains(&sup)
    }

    /// Field lookup through superclasses and interfaces.
    pub fn find_field(&self, class: ClassId, name: &str) -> Option<VarId> {
        self.all_supertypes(class).into_iter().find_map(|id| {
            let scope = self.class(id).scope;
            self.scope(scope).vars.get(name).copied()
        })
    }

    /// Every method named `name` visible on `class`, nearest first.
    ///
    /// A signature overridden lower in the hierarchy is listed once.
    pub fn find_methods(&self, class: ClassId, name: &str) -> Vec<ScopeId> {
        let mut found: Vec<(MethodSig, ScopeId)> = Vec::new();
        for id in self.all_supertypes(class) {
            for (sig, scope) in &self.class(id).methods {
                if sig.name == name && !found.iter().any(|(seen, _)| seen == sig) {
                    found.push((sig.clone(), *scope));
                }
            }
        }
        found.into_iter().map(|(_, scope)| scope).collect()
    }

    /// Parameter classes of a method scope.
    pub fn param_types(&self, method: ScopeId) -> Vec<ClassId> {
        self.method(method)
            .map(|m| m.params.iter().map(|p| self.var(*p).ty.class).collect())
            .unwrap_or_default()
    }

    // ============================================================
    // Assignability
    // ============================================================

    /// Whether a value of type `from` may be assigned to `to`.
    pub fn is_assignable(&self, from: ClassId, to: ClassId) -> bool {
        if from == to {
            return true;
        }
        let (from_decl, to_decl) = (self.class(from), self.class(to));
        match (from_decl.kind, to_decl.kind) {
            (ClassKind::Error, _) | (_, ClassKind::Error) => true,
            (ClassKind::Primitive(a), ClassKind::Primitive(b)) => widens(a, b),
            (ClassKind::Null, kind) => kind.is_reference() && kind != ClassKind::Null,
            (ClassKind::Array(a), ClassKind::Array(b)) => {
                self.class(a).kind.is_reference()
                    && self.class(b).kind.is_reference()
                    && self.is_assignable(a, b)
            }
            (ClassKind::Array(_), _) => to == self.well_known.object,
            (ClassKind::Class | ClassKind::Interface, ClassKind::Class | ClassKind::Interface) => {
                to == self.well_known.object || self.is_subtype(from, to)
            }
            _ => false,
        }
    }

    /// Display name used in messages.
    pub fn type_name(&self, id: ClassId) -> SmolStr {
        let decl = self.class(id);
        match decl.kind {
            ClassKind::Array(element) => SmolStr::new(format!("{}[]", self.type_name(element))),
            _ if decl.package == "java.lang" => decl.name.clone(),
            _ if decl.package.is_empty() => decl.name.clone(),
            _ => decl.qname.clone(),
        }
    }
}

/// Primitive widening conversion (identity included).
pub fn widens(from: PrimitiveType, to: PrimitiveType) -> bool {
    use PrimitiveType::*;
    if from == to {
        return true;
    }
    match from {
        Byte => matches!(to, Short | Int | Long | Float | Double),
        Short | Char => matches!(to, Int | Long | Float | Double),
        Int => matches!(to, Long | Float | Double),
        Long => matches!(to, Float | Double),
        Float => to == Double,
        Double | Boolean => false,
    }
}

fn split_qname(qname: &str) -> (SmolStr, SmolStr) {
    match qname.rsplit_once('.') {
        Some((package, name)) => (SmolStr::new(package), SmolStr::new(name)),
        None => (SmolStr::default(), SmolStr::new(qname)),
    }
}

#[cfg(test)]
#[path = "tests/tests_table.rs"]
mod tests;
