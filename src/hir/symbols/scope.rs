//! Scope chain nodes and method bodies.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::{ClassId, InstanceType, ScopeId, VarId};
use crate::base::Span;
use crate::syntax::ast::{Modifier, Modifiers};

/// A node of the scope chain.
///
/// The parent is fixed at creation; only the root has none.
#[derive(Debug, Clone)]
pub struct ScopeNode {
    pub parent: Option<ScopeId>,
    /// Variables declared directly in this scope.
    pub vars: IndexMap<SmolStr, VarId>,
    pub children: Vec<ScopeId>,
    pub kind: ScopeKind,
}

impl ScopeNode {
    pub fn new(parent: Option<ScopeId>, kind: ScopeKind) -> Self {
        Self {
            parent,
            vars: IndexMap::new(),
            children: Vec::new(),
            kind,
        }
    }

    pub fn method(&self) -> Option<&MethodScope> {
        match &self.kind {
            ScopeKind::Body(Body::Method(method)) => Some(method),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ScopeKind {
    /// The run's root; parent of every top-level class scope.
    Root,
    Class(ClassId),
    Body(Body),
}

#[derive(Debug, Clone)]
pub enum Body {
    Method(MethodScope),
    Block,
}

/// How a method record came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodOrigin {
    /// Written by the user (or declared by the library model).
    Source,
    /// Added by the level and emitted by augmentation.
    Generated,
    /// The language's default constructor; never emitted.
    Implicit,
}

/// A method or constructor.
#[derive(Debug, Clone)]
pub struct MethodScope {
    pub name: SmolStr,
    pub modifiers: Modifiers,
    pub params: Vec<VarId>,
    /// `None` for constructors.
    pub return_type: Option<InstanceType>,
    pub class: ClassId,
    pub origin: MethodOrigin,
    pub span: Span,
}

impl MethodScope {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifier::Static)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers.contains(Modifier::Abstract)
    }

    pub fn generated(&self) -> bool {
        self.origin != MethodOrigin::Source
    }
}
