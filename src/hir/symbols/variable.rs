//! Variable records: fields, parameters and locals.

use std::hash::{Hash, Hasher};

use smol_str::SmolStr;
use thiserror::Error;

use super::{InstanceType, ScopeId};
use crate::base::Span;
use crate::syntax::ast::{Modifier, Modifiers};

/// Assignment-state transition that did not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignError {
    #[error("variable '{0}' is already assigned")]
    AlreadyAssigned(SmolStr),
    #[error("variable '{0}' is not assigned")]
    NotAssigned(SmolStr),
}

/// One declared field, parameter or local.
#[derive(Debug, Clone)]
pub struct VariableData {
    pub name: SmolStr,
    pub modifiers: Modifiers,
    pub ty: InstanceType,
    pub assigned: bool,
    pub has_initializer: bool,
    pub owner: ScopeId,
    pub generated: bool,
    pub span: Span,
}

impl VariableData {
    pub fn new(
        name: impl Into<SmolStr>,
        modifiers: Modifiers,
        ty: InstanceType,
        owner: ScopeId,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            modifiers,
            ty,
            assigned: false,
            has_initializer: false,
            owner,
            generated: false,
            span,
        }
    }

    pub fn with_initializer(mut self) -> Self {
        self.has_initializer = true;
        self.assigned = true;
        self
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.contains(Modifier::Final)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifier::Static)
    }

    /// Unassigned → assigned. Fails without a state change if already
    /// assigned.
    pub fn obtain_value(&mut self) -> Result<(), AssignError> {
        if self.assigned {
            return Err(AssignError::AlreadyAssigned(self.name.clone()));
        }
        self.assigned = true;
        Ok(())
    }

    /// Assigned → unassigned. Fails without a state change if not assigned.
    pub fn release_value(&mut self) -> Result<(), AssignError> {
        if !self.assigned {
            return Err(AssignError::NotAssigned(self.name.clone()));
        }
        self.assigned = false;
        Ok(())
    }
}

impl PartialEq for VariableData {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.modifiers.iter().eq(other.modifiers.iter())
            && self.ty == other.ty
            && self.assigned == other.assigned
            && self.owner == other.owner
    }
}

impl Eq for VariableData {}

impl Hash for VariableData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
    }
}
