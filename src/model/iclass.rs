//! Type handles
//!
//! An [`IClass`] is one node of the type graph: a primitive (or `void`), a
//! class or interface backed by a [`ClassProvider`], or an array derived from
//! another handle. Handles live in a [`TypeArena`](crate::model::TypeArena)
//! and are referred to by [`TypeId`]; two handles denote the same type iff
//! their ids are equal.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::model::lookup::{FieldIndex, MethodIndex};
use crate::model::memo::Memo;
use crate::model::{ClassProvider, IConstructor, IMethod};
use crate::types::Primitive;

/// Identity of a type handle within one arena
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TypeId(u32);

impl TypeId {
    // Reserved handles, interned in this order by `TypeArena::new()`
    pub const VOID: TypeId = TypeId(0);
    pub const BOOLEAN: TypeId = TypeId(1);
    pub const BYTE: TypeId = TypeId(2);
    pub const CHAR: TypeId = TypeId(3);
    pub const SHORT: TypeId = TypeId(4);
    pub const INT: TypeId = TypeId(5);
    pub const LONG: TypeId = TypeId(6);
    pub const FLOAT: TypeId = TypeId(7);
    pub const DOUBLE: TypeId = TypeId(8);

    /// First index handed out for classes, interfaces and arrays
    pub const FIRST_DYNAMIC: u32 = 9;

    pub fn of(primitive: Primitive) -> TypeId {
        match primitive {
            Primitive::Void => Self::VOID,
            Primitive::Boolean => Self::BOOLEAN,
            Primitive::Byte => Self::BYTE,
            Primitive::Char => Self::CHAR,
            Primitive::Short => Self::SHORT,
            Primitive::Int => Self::INT,
            Primitive::Long => Self::LONG,
            Primitive::Float => Self::FLOAT,
            Primitive::Double => Self::DOUBLE,
        }
    }

    pub fn index(self) -> u32 {
        self.0
    }

    pub(crate) fn from_index(index: usize) -> TypeId {
        TypeId(index as u32)
    }

    /// Check if this is one of the reserved primitive handles
    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a handle stands for
pub enum IClassKind {
    Primitive(Primitive),
    /// Class or interface
    Declared(Arc<dyn ClassProvider>),
    /// `object` is the root type every array extends
    Array { component: TypeId, object: TypeId },
}

impl fmt::Debug for IClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "Primitive({})", p.name()),
            Self::Declared(provider) => write!(f, "Declared({})", provider.descriptor()),
            Self::Array { component, .. } => write!(f, "Array({})", component),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Primitive,
    Class,
    Interface,
    Array,
}

/// Lazily filled state of one handle.
///
/// Method caches and the field index can be reset independently; supertype,
/// interface and member-type results are permanent once computed.
#[derive(Default)]
pub(crate) struct IClassCache {
    pub descriptor: Memo<Arc<str>>,
    pub superclass: Memo<Option<TypeId>>,
    pub interfaces: Memo<Arc<[TypeId]>>,
    pub outer_class: Memo<Option<TypeId>>,
    pub declaring_class: Memo<Option<TypeId>>,
    pub declared_classes: Memo<Arc<[TypeId]>>,
    pub declared_constructors: Memo<Arc<[IConstructor]>>,

    // Method group
    pub declared_methods: Memo<Arc<[IMethod]>>,
    pub declared_methods_by_name: Memo<Arc<MethodIndex>>,
    pub methods: Memo<Arc<[IMethod]>>,

    // Field group
    pub declared_fields: Memo<Arc<FieldIndex>>,

    pub member_types: Mutex<HashMap<Option<String>, Arc<[TypeId]>>>,
}

pub struct IClass {
    id: TypeId,
    kind: IClassKind,
    pub(crate) cache: IClassCache,
    /// Guards single creation of the array-of-this handle
    pub(crate) array_class: Mutex<Option<TypeId>>,
}

impl IClass {
    pub(crate) fn new(id: TypeId, kind: IClassKind) -> Self {
        Self {
            id,
            kind,
            cache: IClassCache::default(),
            array_class: Mutex::new(None),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn kind(&self) -> &IClassKind {
        &self.kind
    }

    pub fn provider(&self) -> Option<&Arc<dyn ClassProvider>> {
        match &self.kind {
            IClassKind::Declared(provider) => Some(provider),
            _ => None,
        }
    }

    pub fn category(&self) -> TypeCategory {
        match &self.kind {
            IClassKind::Primitive(_) => TypeCategory::Primitive,
            IClassKind::Declared(provider) if provider.is_interface() => TypeCategory::Interface,
            IClassKind::Declared(_) => TypeCategory::Class,
            IClassKind::Array { .. } => TypeCategory::Array,
        }
    }
}

impl fmt::Debug for IClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IClass")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_ids_follow_primitive_order() {
        for (i, p) in Primitive::ALL.into_iter().enumerate() {
            assert_eq!(TypeId::of(p).index() as usize, i);
            assert!(TypeId::of(p).is_reserved());
        }
        assert!(!TypeId::from_index(TypeId::FIRST_DYNAMIC as usize).is_reserved());
    }
}
