//! Uncached class providers
//!
//! A provider is the backing store of a class or interface handle: a parsed
//! compilation unit, a loaded class file, a JSON class-path entry. The arena
//! calls each method at most once per cache generation and layers caching,
//! cycle detection and indexing on top, so providers just report what they
//! currently declare.

use std::sync::Arc;

use crate::model::{Access, ConstructorDecl, FieldDecl, MethodDecl, TypeId};
use crate::utils::{Error, Result, Span};

pub trait ClassProvider: Send + Sync {
    /// Field descriptor, e.g. `Lpkg/Outer$Inner;`
    fn descriptor(&self) -> String;

    fn access(&self) -> Access;

    fn is_final(&self) -> bool;

    fn is_abstract(&self) -> bool;

    fn is_interface(&self) -> bool;

    /// Location reported in errors about this type
    fn location(&self) -> Option<Span> {
        None
    }

    /// Why filling in this declaration failed. A failed type is still
    /// registered but must not be used.
    fn load_error(&self) -> Option<Error> {
        None
    }

    /// `None` for `java.lang.Object` and interfaces
    fn superclass(&self) -> Result<Option<TypeId>>;

    /// Implemented interfaces of a class, extended interfaces of an interface
    fn interfaces(&self) -> Result<Vec<TypeId>>;

    /// Immediately enclosing instance type of inner, local and anonymous classes
    fn outer_class(&self) -> Result<Option<TypeId>>;

    /// The declaring type of a member type
    fn declaring_class(&self) -> Result<Option<TypeId>>;

    fn declared_constructors(&self) -> Vec<Arc<ConstructorDecl>>;

    fn declared_methods(&self) -> Vec<Arc<MethodDecl>>;

    fn declared_fields(&self) -> Vec<Arc<FieldDecl>>;

    fn declared_classes(&self) -> Result<Vec<TypeId>>;

    /// Outer-instance and captured-local fields, in constructor parameter order
    fn synthetic_fields(&self) -> Vec<Arc<FieldDecl>> {
        Vec::new()
    }
}
