//! Class loading
//!
//! A [`ClassLoader`] turns a descriptor the arena does not know yet into a
//! registered handle. Loaders register a class before resolving anything it
//! refers to, so mutually referring classes load without recursion.

mod bootstrap;
mod classpath;

pub use bootstrap::{Bootstrap, BootstrapLoader};
pub use classpath::{
    ClassKind, ClassModel, ClassPathModel, ConstructorModel, FieldModel, MethodModel, ModelLoader,
};

use crate::model::{TypeArena, TypeId};
use crate::types::descriptor;
use crate::utils::{Error, Result, Span};

pub trait ClassLoader {
    /// Define the class or interface with this descriptor in `arena`.
    ///
    /// `Ok(None)` if this loader does not know it.
    fn load_class(&self, arena: &TypeArena, descriptor: &str) -> Result<Option<TypeId>>;

    /// The root type every array extends
    fn object_type(&self, arena: &TypeArena) -> Result<TypeId> {
        arena
            .resolve(descriptor::JAVA_LANG_OBJECT, self)?
            .ok_or_else(|| Error::UnknownType {
                name: descriptor::to_class_name(descriptor::JAVA_LANG_OBJECT),
                span: None,
            })
    }
}

/// Resolve a type in source spelling, failing if no loader knows it
pub fn require<L: ClassLoader + ?Sized>(
    arena: &TypeArena,
    loader: &L,
    class_name: &str,
    span: Option<Span>,
) -> Result<TypeId> {
    arena
        .resolve_name(class_name, loader)?
        .ok_or_else(|| Error::UnknownType {
            name: class_name.to_string(),
            span,
        })
}

/// Resolve each of `class_names`, in order
pub fn require_all<L: ClassLoader + ?Sized>(
    arena: &TypeArena,
    loader: &L,
    class_names: &[String],
    span: Option<Span>,
) -> Result<Vec<TypeId>> {
    class_names
        .iter()
        .map(|name| require(arena, loader, name, span))
        .collect()
}
