//! Small arenas for unit tests

use std::sync::Arc;

use crate::loader::Bootstrap;
use crate::model::{SourceClass, TypeArena, TypeId};

/// An arena with the bootstrap types installed
pub struct Fixture {
    pub arena: TypeArena,
    pub object: TypeId,
    pub cloneable: TypeId,
    pub serializable: TypeId,
    pub string: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let arena = TypeArena::new();
        let bootstrap = Bootstrap::install(&arena).unwrap();
        Self {
            arena,
            object: bootstrap.object,
            cloneable: bootstrap.cloneable,
            serializable: bootstrap.serializable,
            string: bootstrap.string,
        }
    }

    /// Register `class` and keep a handle on its declarations
    pub fn source(&self, class: SourceClass) -> (Arc<SourceClass>, TypeId) {
        let class = Arc::new(class);
        let id = self.arena.define_class(class.clone()).unwrap();
        (class, id)
    }

    pub fn class(&self, name: &str, superclass: Option<TypeId>) -> TypeId {
        let (src, id) = self.source(SourceClass::class(name));
        src.set_superclass(superclass);
        id
    }

    pub fn interface(&self, name: &str, extends: &[TypeId]) -> TypeId {
        let (src, id) = self.source(SourceClass::interface(name));
        for &interface in extends {
            src.add_interface(interface);
        }
        id
    }
}
