//! Language levels and their rule tables.
//!
//! A [`Level`] selects a [`LevelConfig`]: which constructs are legal, which
//! modifiers are implied when omitted and which members are generated when a
//! class does not declare them. Member binding consults the table when it
//! records declarations; augmentation consults it again when emitting source.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::syntax::ast::Modifier;

/// Extension of every augmented output file.
pub const OUTPUT_EXTENSION: &str = "java";

/// One of the ordered language levels, most restrictive first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Elementary,
    Intermediate,
    Advanced,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown language level '{0}'")]
pub struct UnknownLevel(pub String);

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Elementary,
        Level::Intermediate,
        Level::Advanced,
        Level::Full,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Level::Elementary => "elementary",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
            Level::Full => "full",
        }
    }

    /// Source file extension of the level (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            Level::Elementary => "dj0",
            Level::Intermediate => "dj1",
            Level::Advanced => "dj2",
            Level::Full => "java",
        }
    }

    /// Level selected by a source file extension, if any.
    pub fn from_extension(ext: &str) -> Option<Level> {
        Level::ALL.into_iter().find(|level| level.extension() == ext)
    }

    pub fn config(self) -> LevelConfig {
        LevelConfig::for_level(self)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Level::ALL
            .into_iter()
            .find(|level| level.name() == lower || level.extension() == lower)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

const VISIBILITY_ABSTRACT_FINAL: &[Modifier] = &[
    Modifier::Public,
    Modifier::Protected,
    Modifier::Private,
    Modifier::Abstract,
    Modifier::Final,
];

const ADVANCED_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Protected,
    Modifier::Private,
    Modifier::Abstract,
    Modifier::Static,
    Modifier::Final,
];

const ALL_MODIFIERS: &[Modifier] = &[
    Modifier::Public,
    Modifier::Protected,
    Modifier::Private,
    Modifier::Abstract,
    Modifier::Static,
    Modifier::Final,
    Modifier::Synchronized,
    Modifier::Native,
    Modifier::Transient,
    Modifier::Volatile,
    Modifier::Strictfp,
];

/// Rule table of one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelConfig {
    pub level: Level,
    /// Modifiers the user may write explicitly.
    pub explicit_modifiers: &'static [Modifier],
    pub allow_interfaces: bool,
    pub allow_abstract: bool,
    pub allow_loops: bool,
    pub allow_arrays: bool,
    pub allow_nested_types: bool,
    /// Appended to fields lacking a modifier of the same category.
    pub implied_field_modifiers: &'static [Modifier],
    /// Appended to methods and constructors lacking a visibility.
    pub implied_method_modifiers: &'static [Modifier],
    pub generate_constructor: bool,
    pub generate_accessors: bool,
    /// `toString`, `equals` and `hashCode`.
    pub generate_object_methods: bool,
}

impl LevelConfig {
    pub fn for_level(level: Level) -> Self {
        match level {
            Level::Elementary => Self {
                level,
                explicit_modifiers: &[],
                allow_interfaces: false,
                allow_abstract: false,
                allow_loops: false,
                allow_arrays: false,
                allow_nested_types: false,
                implied_field_modifiers: &[Modifier::Private, Modifier::Final],
                implied_method_modifiers: &[Modifier::Public],
                generate_constructor: true,
                generate_accessors: true,
                generate_object_methods: true,
            },
            Level::Intermediate => Self {
                level,
                explicit_modifiers: VISIBILITY_ABSTRACT_FINAL,
                allow_interfaces: true,
                allow_abstract: true,
                allow_loops: false,
                allow_arrays: false,
                allow_nested_types: false,
                implied_field_modifiers: &[Modifier::Private, Modifier::Final],
                implied_method_modifiers: &[Modifier::Public],
                generate_constructor: true,
                generate_accessors: true,
                generate_object_methods: true,
            },
            Level::Advanced => Self {
                level,
                explicit_modifiers: ADVANCED_MODIFIERS,
                ..Self::full(level)
            },
            Level::Full => Self::full(level),
        }
    }

    fn full(level: Level) -> Self {
        Self {
            level,
            explicit_modifiers: ALL_MODIFIERS,
            allow_interfaces: true,
            allow_abstract: true,
            allow_loops: true,
            allow_arrays: true,
            allow_nested_types: true,
            implied_field_modifiers: &[],
            implied_method_modifiers: &[],
            generate_constructor: false,
            generate_accessors: false,
            generate_object_methods: false,
        }
    }

    pub fn allows_modifier(&self, modifier: Modifier) -> bool {
        self.explicit_modifiers.contains(&modifier)
    }

    /// Whether any member is generated at this level.
    pub fn generates_members(&self) -> bool {
        self.generate_constructor || self.generate_accessors || self.generate_object_methods
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self::for_level(Level::Full)
    }
}
