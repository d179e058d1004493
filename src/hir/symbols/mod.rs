//! Symbol model: the shared table and the records it owns.
//!
//! ```text
//! ScopeNode ─┬─ Root
//!            ├─ Class(ClassId)      → ClassDecl
//!            └─ Body ─┬─ Method(MethodScope)
//!                     └─ Block
//! TypeData ──┬─ Class(ClassId)
//!            ├─ Instance(InstanceType)
//!            └─ Package(PackagePrefix)
//! ```

mod class;
mod ids;
mod scope;
mod table;
mod types;
mod variable;

pub use class::{CONSTRUCTOR_NAME, ClassDecl, ClassKind, ClassOrigin, ClassState, MethodSig};
pub use ids::{ClassId, ScopeId, VarId};
pub use scope::{Body, MethodOrigin, MethodScope, ScopeKind, ScopeNode};
pub use table::{SymbolTable, widens};
pub use types::{InstanceType, PackagePrefix, TypeData};
pub use variable::{AssignError, VariableData};
