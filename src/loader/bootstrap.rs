//! Built-in `java.lang` and `java.io` types
//!
//! Only the types the conversion rules name are built in: `Object`,
//! `Cloneable`, `Serializable` and `String`.

use std::sync::Arc;

use log::debug;

use crate::loader::{require, ClassLoader};
use crate::model::{Access, ConstructorDecl, FieldDecl, MethodDecl, SourceClass, TypeArena, TypeId};
use crate::types::descriptor::{JAVA_IO_SERIALIZABLE, JAVA_LANG_CLONEABLE, JAVA_LANG_OBJECT, JAVA_LANG_STRING};
use crate::utils::{Error, Result};

/// Loader for the built-in types only
#[derive(Debug, Default, Clone, Copy)]
pub struct BootstrapLoader;

impl BootstrapLoader {
    pub fn new() -> Self {
        Self
    }
}

impl ClassLoader for BootstrapLoader {
    fn load_class(&self, arena: &TypeArena, descriptor: &str) -> Result<Option<TypeId>> {
        define(arena, descriptor, self)
    }
}

/// Handles of the built-in types of one arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bootstrap {
    pub object: TypeId,
    pub cloneable: TypeId,
    pub serializable: TypeId,
    pub string: TypeId,
}

impl Bootstrap {
    /// Load the built-in types into `arena`, or find them if already there
    pub fn install(arena: &TypeArena) -> Result<Self> {
        Self::install_with(arena, &BootstrapLoader)
    }

    pub fn install_with<L: ClassLoader + ?Sized>(arena: &TypeArena, loader: &L) -> Result<Self> {
        Ok(Self {
            object: require(arena, loader, "java.lang.Object", None)?,
            cloneable: require(arena, loader, "java.lang.Cloneable", None)?,
            serializable: require(arena, loader, "java.io.Serializable", None)?,
            string: require(arena, loader, "java.lang.String", None)?,
        })
    }
}

/// Define the built-in type `desc`, resolving the types it refers to through
/// `loader`. `Ok(None)` for anything that is not built in.
pub(crate) fn define<L: ClassLoader + ?Sized>(
    arena: &TypeArena,
    desc: &str,
    loader: &L,
) -> Result<Option<TypeId>> {
    let class = match desc {
        JAVA_LANG_OBJECT => SourceClass::class("java.lang.Object"),
        JAVA_LANG_CLONEABLE => SourceClass::interface("java.lang.Cloneable"),
        JAVA_IO_SERIALIZABLE => SourceClass::interface("java.io.Serializable"),
        JAVA_LANG_STRING => SourceClass::class("java.lang.String").with_final(true),
        _ => return Ok(None),
    };
    let class = Arc::new(class);
    let id = match arena.define_class(class.clone()) {
        Ok(id) => id,
        // Lost a race with a concurrent load of the same type
        Err(Error::DuplicateType { .. }) => return Ok(arena.lookup(desc)),
        Err(err) => return Err(err),
    };
    debug!("bootstrapping {}", class.name());

    match desc {
        JAVA_LANG_OBJECT => define_object(&class, arena, loader)?,
        JAVA_LANG_STRING => define_string(&class, arena, loader)?,
        _ => {}
    }
    Ok(Some(id))
}

fn define_object<L: ClassLoader + ?Sized>(class: &SourceClass, arena: &TypeArena, loader: &L) -> Result<()> {
    let object = require(arena, loader, "java.lang.Object", None)?;
    let string = require(arena, loader, "java.lang.String", None)?;

    class.add_method(MethodDecl::new("equals", vec![object], TypeId::BOOLEAN));
    class.add_method(MethodDecl::new("hashCode", vec![], TypeId::INT));
    class.add_method(MethodDecl::new("toString", vec![], string));
    class.add_method(MethodDecl::new("clone", vec![], object).with_access(Access::Protected));
    class.add_method(MethodDecl::new("finalize", vec![], TypeId::VOID).with_access(Access::Protected));
    class.add_method(MethodDecl::new("notify", vec![], TypeId::VOID));
    class.add_method(MethodDecl::new("notifyAll", vec![], TypeId::VOID));
    class.add_method(MethodDecl::new("wait", vec![], TypeId::VOID));
    class.add_method(MethodDecl::new("wait", vec![TypeId::LONG], TypeId::VOID));
    Ok(())
}

fn define_string<L: ClassLoader + ?Sized>(class: &SourceClass, arena: &TypeArena, loader: &L) -> Result<()> {
    let object = require(arena, loader, "java.lang.Object", None)?;
    let serializable = require(arena, loader, "java.io.Serializable", None)?;
    let string = require(arena, loader, "java.lang.String", None)?;
    let chars = require(arena, loader, "char[]", None)?;

    class.set_superclass(Some(object));
    class.add_interface(serializable);

    class.add_field(FieldDecl::new("value", chars).with_access(Access::Private));
    class.add_field(FieldDecl::new("hash", TypeId::INT).with_access(Access::Private));

    class.add_constructor(ConstructorDecl::new(vec![]));
    class.add_constructor(ConstructorDecl::new(vec![string]));
    class.add_constructor(ConstructorDecl::new(vec![chars]));

    class.add_method(MethodDecl::new("length", vec![], TypeId::INT));
    class.add_method(MethodDecl::new("charAt", vec![TypeId::INT], TypeId::CHAR));
    class.add_method(MethodDecl::new("equals", vec![object], TypeId::BOOLEAN));
    class.add_method(MethodDecl::new("hashCode", vec![], TypeId::INT));
    class.add_method(MethodDecl::new("toString", vec![], string));
    class.add_method(MethodDecl::new("concat", vec![string], string));
    class.add_method(MethodDecl::new("substring", vec![TypeId::INT], string));
    class.add_method(MethodDecl::new("substring", vec![TypeId::INT, TypeId::INT], string));
    for parameter in [
        TypeId::BOOLEAN,
        TypeId::CHAR,
        TypeId::INT,
        TypeId::LONG,
        TypeId::FLOAT,
        TypeId::DOUBLE,
        chars,
        object,
    ] {
        class.add_method(MethodDecl::new("valueOf", vec![parameter], string).with_static(true));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{maximally_specific, IMember, IInvocable};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_install_is_idempotent() {
        let arena = TypeArena::new();
        let first = Bootstrap::install(&arena).unwrap();
        let count = arena.len();
        let second = Bootstrap::install(&arena).unwrap();
        assert_eq!(first, second);
        assert_eq!(arena.len(), count);
    }

    #[test]
    fn test_object_is_the_root() {
        let arena = TypeArena::new();
        let b = Bootstrap::install(&arena).unwrap();
        assert_eq!(arena.superclass(b.object).unwrap(), None);
        assert!(arena.interfaces(b.object).unwrap().is_empty());
        assert!(!arena.is_final(b.object));
        assert_eq!(arena.declared_constructors(b.object).len(), 1);

        let clone = arena.find_method(b.object, "clone", &[]).unwrap();
        assert_eq!(clone.access(), Access::Protected);
        assert_eq!(clone.return_type(), b.object);
    }

    #[test]
    fn test_string_shape() {
        let arena = TypeArena::new();
        let b = Bootstrap::install(&arena).unwrap();
        assert!(arena.is_final(b.string));
        assert_eq!(arena.superclass(b.string).unwrap(), Some(b.object));
        assert_eq!(&*arena.interfaces(b.string).unwrap(), &[b.serializable]);
        assert!(arena.is_interface(b.cloneable));
        assert!(arena.is_interface(b.serializable));
        assert_eq!(arena.superclass(b.serializable).unwrap(), None);

        let value = arena.declared_field(b.string, "value").unwrap();
        assert_eq!(arena.class_name(value.field_type()), "char[]");
        assert_eq!(arena.declared_constructors(b.string).len(), 3);
        assert!(arena.declared_methods_named(b.string, "valueOf").iter().all(|m| m.is_static()));
    }

    #[test]
    fn test_string_overrides_shadow_object_methods() {
        let arena = TypeArena::new();
        let b = Bootstrap::install(&arena).unwrap();
        let methods = arena.methods(b.string).unwrap();
        let hash_codes: Vec<_> = methods.iter().filter(|m| m.name() == "hashCode").collect();
        assert_eq!(hash_codes.len(), 1);
        assert_eq!(hash_codes[0].declaring_class(), b.string);
        // Inherited, not overridden
        assert!(methods.iter().any(|m| m.name() == "notifyAll" && m.declaring_class() == b.object));
    }

    #[test]
    fn test_value_of_picks_narrowest_overload() {
        let arena = TypeArena::new();
        let b = Bootstrap::install(&arena).unwrap();
        let overloads = arena.declared_methods_named(b.string, "valueOf");

        // A `short` argument widens to int, long, float and double
        let applicable: Vec<_> = overloads
            .iter()
            .filter(|m| crate::model::is_applicable(&arena, *m, &[TypeId::SHORT]).unwrap())
            .cloned()
            .collect();
        assert_eq!(applicable.len(), 4);
        let best = maximally_specific(&arena, &applicable).unwrap();
        assert_eq!(best.len(), 1);
        assert_eq!(best[0].parameter_types(), &[TypeId::INT]);
    }

    #[test]
    fn test_unknown_types_are_not_loaded() {
        let arena = TypeArena::new();
        let loader = BootstrapLoader::new();
        assert_eq!(loader.load_class(&arena, "Ljava/util/List;").unwrap(), None);
        assert_eq!(arena.len(), TypeId::FIRST_DYNAMIC as usize);
    }
}
