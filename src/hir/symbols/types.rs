//! Type-data variants: class declarations, instance views and package
//! prefixes.

use smol_str::SmolStr;

use super::ClassId;
use crate::hir::InvariantViolation;

/// The type of an expression or variable: a view of the class it
/// instantiates. Freely constructible; only the handle matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceType {
    pub class: ClassId,
}

impl InstanceType {
    pub fn new(class: ClassId) -> Self {
        Self { class }
    }
}

/// A dotted prefix that has not yet been decided to be a package or a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackagePrefix {
    pub name: SmolStr,
}

impl PackagePrefix {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into() }
    }

    /// The prefix extended by one more segment.
    pub fn extend(&self, part: &str) -> Self {
        Self::new(format!("{}.{}", self.name, part))
    }

    /// A prefix is never a type; asking for one is a defect.
    pub fn as_class(&self) -> Result<ClassId, InvariantViolation> {
        Err(InvariantViolation::PartialPackage(self.name.clone()))
    }
}

/// Result of resolving a name or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// A type used by name (static member access, constructor target).
    Class(ClassId),
    /// A value of the given type.
    Instance(InstanceType),
    /// A dotted prefix still being disambiguated.
    Package(PackagePrefix),
}

impl TypeData {
    /// The class denoted or instantiated.
    pub fn class(&self) -> Result<ClassId, InvariantViolation> {
        match self {
            TypeData::Class(id) => Ok(*id),
            TypeData::Instance(instance) => Ok(instance.class),
            TypeData::Package(prefix) => prefix.as_class(),
        }
    }

    /// The instance view of this type.
    pub fn instance(&self) -> Result<InstanceType, InvariantViolation> {
        self.class().map(InstanceType::new)
    }

    pub fn is_package(&self) -> bool {
        matches!(self, TypeData::Package(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_prefix_is_never_a_type() {
        let prefix = PackagePrefix::new("java").extend("lang");
        assert_eq!(prefix.name, "java.lang");
        let data = TypeData::Package(prefix);
        assert!(data.is_package());
        assert_eq!(
            data.class(),
            Err(InvariantViolation::PartialPackage("java.lang".into()))
        );
        assert!(data.instance().is_err());
    }

    #[test]
    fn test_instance_and_class_share_the_handle() {
        let id = ClassId::new(3);
        assert_eq!(TypeData::Class(id).instance(), Ok(InstanceType::new(id)));
        assert_eq!(TypeData::Instance(InstanceType::new(id)).class(), Ok(id));
    }
}
