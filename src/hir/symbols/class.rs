//! Class declaration records.

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::{ClassId, ScopeId, VarId};
use crate::base::Span;
use crate::syntax::ast::{Modifier, Modifiers, PrimitiveType};

/// What a class record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    Primitive(PrimitiveType),
    /// Array of the element class.
    Array(ClassId),
    Void,
    /// Type of the `null` literal.
    Null,
    /// Stand-in for a type that failed to resolve; absorbs follow-up errors.
    Error,
}

impl ClassKind {
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            ClassKind::Class | ClassKind::Interface | ClassKind::Array(_) | ClassKind::Null
        )
    }
}

/// Resolution state of a class record.
///
/// A class absent from the table is unseen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassState {
    /// Placeholder created by a reference before the declaration was seen.
    Continuation,
    Declared,
    /// Supertypes are being computed; re-entry means circular inheritance.
    Resolving,
    Resolved,
    /// Members final, generated defaults included.
    Augmented,
}

/// Where a class record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassOrigin {
    Library,
    /// Declared in source at this span.
    Source(Span),
    /// Only referenced so far; the span of the first reference.
    Reference(Span),
}

/// Method signature: name plus erased parameter classes.
///
/// Constructors use the name `<init>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub name: SmolStr,
    pub params: Vec<ClassId>,
}

pub const CONSTRUCTOR_NAME: &str = "<init>";

impl MethodSig {
    pub fn new(name: impl Into<SmolStr>, params: Vec<ClassId>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    pub fn constructor(params: Vec<ClassId>) -> Self {
        Self::new(CONSTRUCTOR_NAME, params)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.params.len())
    }
}

/// The canonical record of one class, interface or built-in type.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub qname: SmolStr,
    pub name: SmolStr,
    pub package: SmolStr,
    pub kind: ClassKind,
    pub modifiers: Modifiers,
    /// `None` while unresolved; the root type is a real handle.
    pub superclass: Option<ClassId>,
    pub interfaces: Vec<ClassId>,
    pub methods: IndexMap<MethodSig, ScopeId>,
    pub fields: Vec<VarId>,
    pub nested: IndexMap<SmolStr, ClassId>,
    pub enclosing: Option<ClassId>,
    pub state: ClassState,
    pub generated: bool,
    pub origin: ClassOrigin,
    pub scope: ScopeId,
}

impl ClassDecl {
    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn is_abstract(&self) -> bool {
        self.is_interface() || self.modifiers.contains(Modifier::Abstract)
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifier::Final)
    }

    pub fn is_continuation(&self) -> bool {
        self.state == ClassState::Continuation
    }

    pub fn is_library(&self) -> bool {
        self.origin == ClassOrigin::Library
    }

    /// Span of the declaration, or of the first reference for continuations.
    pub fn span(&self) -> Option<Span> {
        match self.origin {
            ClassOrigin::Library => None,
            ClassOrigin::Source(span) | ClassOrigin::Reference(span) => Some(span),
        }
    }

    pub fn primitive(&self) -> Option<PrimitiveType> {
        match self.kind {
            ClassKind::Primitive(prim) => Some(prim),
            _ => None,
        }
    }

    pub fn constructors(&self) -> impl Iterator<Item = (&MethodSig, ScopeId)> + '_ {
        self.methods
            .iter()
            .filter(|(sig, _)| sig.is_constructor())
            .map(|(sig, scope)| (sig, *scope))
    }
}
