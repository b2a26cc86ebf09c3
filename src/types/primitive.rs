//! Primitive types of the type model

use serde::{Deserialize, Serialize};

/// Primitive types, including the `void` pseudo-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    /// All primitives, in reserved-handle order
    pub const ALL: [Primitive; 9] = [
        Self::Void,
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Field descriptor (JVMS 4.3.2)
    pub fn descriptor(self) -> &'static str {
        match self {
            Self::Void => "V",
            Self::Boolean => "Z",
            Self::Byte => "B",
            Self::Char => "C",
            Self::Short => "S",
            Self::Int => "I",
            Self::Long => "J",
            Self::Float => "F",
            Self::Double => "D",
        }
    }

    /// Source-level keyword
    pub fn name(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    pub fn from_descriptor(descriptor: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.descriptor() == descriptor)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// `byte`, `short`, `int`, `long`, `char`, `float` or `double`
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Void | Self::Boolean)
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::Byte | Self::Char | Self::Short | Self::Int | Self::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_name_lookup() {
        for p in Primitive::ALL {
            assert_eq!(Primitive::from_descriptor(p.descriptor()), Some(p));
            assert_eq!(Primitive::from_name(p.name()), Some(p));
        }
        assert_eq!(Primitive::from_descriptor("L"), None);
        assert_eq!(Primitive::from_name("String"), None);
    }

    #[test]
    fn test_numeric_kinds() {
        assert!(!Primitive::Void.is_numeric());
        assert!(!Primitive::Boolean.is_numeric());
        assert!(Primitive::Char.is_numeric());
        assert!(Primitive::Char.is_integral());
        assert!(Primitive::Double.is_floating());
        assert!(!Primitive::Long.is_floating());
    }
}
