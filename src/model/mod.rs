//! Type model and resolution engine
//!
//! Provides:
//! - Canonical type handles ([`TypeArena`], [`IClass`], [`TypeId`])
//! - Lazily cached class structure backed by [`ClassProvider`]s
//! - Fields, methods and constructors ([`IField`], [`IMethod`], [`IConstructor`])
//! - Assignability and subtyping (JLS2 5.1)
//! - Member lookup and overload specificity (JLS3 15.12.2)

mod access;
mod arena;
mod conversion;
mod display;
mod iclass;
mod lookup;
mod member;
mod memo;
pub mod overload;
mod provider;
mod source;

#[cfg(test)]
pub(crate) mod fixtures;

pub use access::Access;
pub use arena::TypeArena;
pub use display::MemberDisplay;
pub use iclass::{IClass, IClassKind, TypeCategory, TypeId};
pub use member::{
    Constant, ConstructorDecl, FieldDecl, IConstructor, IField, IInvocable, IMember, IMethod,
    MemberRef, MethodDecl,
};
pub use overload::{is_applicable, maximally_specific};
pub use provider::ClassProvider;
pub use source::SourceClass;
