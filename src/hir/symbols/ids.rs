//! Arena handles into the [`super::SymbolTable`].
//!
//! Handles are only minted by the table of one run, so identity of a class,
//! scope or variable is plain handle equality.

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        impl $name {
            /// Create a handle from an arena index
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Get the index into the arena
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Handle of a class declaration
    ClassId
);
arena_id!(
    /// Handle of a scope chain node
    ScopeId
);
arena_id!(
    /// Handle of a variable record
    VarId
);
