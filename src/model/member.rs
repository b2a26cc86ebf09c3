//! Member model: fields, methods and constructors
//!
//! Providers describe members with plain declarations ([`MethodDecl`],
//! [`ConstructorDecl`], [`FieldDecl`]). The arena wraps each declaration into
//! an [`IMethod`], [`IConstructor`] or [`IField`] that is bound to the handle
//! whose cache it lives in, so the declaring type of a member is fixed when it
//! is first materialized and never reassigned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{overload, Access, TypeArena, TypeId};
use crate::types::descriptor;
use crate::utils::Result;

// ==================== Declarations ====================

/// Compile-time constant value of a field (JLS 15.28)
///
/// `Option<Constant>` separates "not a constant" (`None`) from a constant whose
/// value happens to be `null` or zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constant {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub access: Access,
    pub is_static: bool,
    pub is_abstract: bool,
    pub parameter_types: Vec<TypeId>,
    pub return_type: TypeId,
    pub thrown_exceptions: Vec<TypeId>,
}

impl MethodDecl {
    /// A public instance method
    pub fn new(name: impl Into<String>, parameter_types: Vec<TypeId>, return_type: TypeId) -> Self {
        Self {
            name: name.into(),
            access: Access::Public,
            is_static: false,
            is_abstract: false,
            parameter_types,
            return_type,
            thrown_exceptions: Vec::new(),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_throws(mut self, thrown_exceptions: Vec<TypeId>) -> Self {
        self.thrown_exceptions = thrown_exceptions;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub access: Access,
    /// Declared parameters only; the synthetic outer-instance parameter is not listed
    pub parameter_types: Vec<TypeId>,
    pub thrown_exceptions: Vec<TypeId>,
}

impl ConstructorDecl {
    pub fn new(parameter_types: Vec<TypeId>) -> Self {
        Self {
            access: Access::Public,
            parameter_types,
            thrown_exceptions: Vec::new(),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_throws(mut self, thrown_exceptions: Vec<TypeId>) -> Self {
        self.thrown_exceptions = thrown_exceptions;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub access: Access,
    pub is_static: bool,
    pub ty: TypeId,
    pub constant_value: Option<Constant>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            access: Access::Default,
            is_static: false,
            ty,
            constant_value: None,
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_constant(mut self, value: Constant) -> Self {
        self.constant_value = Some(value);
        self
    }
}

// ==================== Member Capabilities ====================

/// Shared by fields, methods and constructors
pub trait IMember {
    fn access(&self) -> Access;

    /// The type handle that declares this member
    fn declaring_class(&self) -> TypeId;
}

/// Shared shape of methods and constructors
pub trait IInvocable: IMember {
    fn parameter_types(&self) -> &[TypeId];

    fn thrown_exceptions(&self) -> &[TypeId];

    /// Method descriptor (JVMS 4.3.3)
    fn descriptor(&self, arena: &TypeArena) -> Result<String>;

    /// JLS 15.12.2.5; the declaring types are not compared
    fn is_more_specific_than(&self, that: &dyn IInvocable, arena: &TypeArena) -> Result<bool> {
        overload::is_more_specific(arena, self.parameter_types(), that.parameter_types())
    }

    fn is_less_specific_than(&self, that: &dyn IInvocable, arena: &TypeArena) -> Result<bool> {
        overload::is_more_specific(arena, that.parameter_types(), self.parameter_types())
    }
}

// ==================== Materialized Members ====================

#[derive(Debug, Clone)]
pub struct IMethod {
    declaring: TypeId,
    decl: Arc<MethodDecl>,
}

impl IMethod {
    pub(crate) fn new(declaring: TypeId, decl: Arc<MethodDecl>) -> Self {
        Self { declaring, decl }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn return_type(&self) -> TypeId {
        self.decl.return_type
    }

    pub fn is_static(&self) -> bool {
        self.decl.is_static
    }

    pub fn is_abstract(&self) -> bool {
        self.decl.is_abstract
    }

    pub fn decl(&self) -> &MethodDecl {
        &self.decl
    }
}

impl PartialEq for IMethod {
    fn eq(&self, other: &Self) -> bool {
        self.declaring == other.declaring && Arc::ptr_eq(&self.decl, &other.decl)
    }
}

impl IMember for IMethod {
    fn access(&self) -> Access {
        self.decl.access
    }

    fn declaring_class(&self) -> TypeId {
        self.declaring
    }
}

impl IInvocable for IMethod {
    fn parameter_types(&self) -> &[TypeId] {
        &self.decl.parameter_types
    }

    fn thrown_exceptions(&self) -> &[TypeId] {
        &self.decl.thrown_exceptions
    }

    fn descriptor(&self, arena: &TypeArena) -> Result<String> {
        let parameters = arena.descriptors(&self.decl.parameter_types);
        Ok(descriptor::method_descriptor(
            &parameters,
            &arena.descriptor(self.decl.return_type),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct IConstructor {
    declaring: TypeId,
    decl: Arc<ConstructorDecl>,
}

impl IConstructor {
    pub(crate) fn new(declaring: TypeId, decl: Arc<ConstructorDecl>) -> Self {
        Self { declaring, decl }
    }

    pub fn decl(&self) -> &ConstructorDecl {
        &self.decl
    }
}

impl PartialEq for IConstructor {
    fn eq(&self, other: &Self) -> bool {
        self.declaring == other.declaring && Arc::ptr_eq(&self.decl, &other.decl)
    }
}

impl IMember for IConstructor {
    fn access(&self) -> Access {
        self.decl.access
    }

    fn declaring_class(&self) -> TypeId {
        self.declaring
    }
}

impl IInvocable for IConstructor {
    fn parameter_types(&self) -> &[TypeId] {
        &self.decl.parameter_types
    }

    fn thrown_exceptions(&self) -> &[TypeId] {
        &self.decl.thrown_exceptions
    }

    /// Includes the leading outer-instance parameter of inner classes
    fn descriptor(&self, arena: &TypeArena) -> Result<String> {
        let mut parameters = Vec::with_capacity(self.decl.parameter_types.len() + 1);
        if let Some(outer) = arena.outer_class(self.declaring)? {
            parameters.push(arena.descriptor(outer));
        }
        parameters.extend(arena.descriptors(&self.decl.parameter_types));
        Ok(descriptor::method_descriptor(&parameters, "V"))
    }
}

#[derive(Debug, Clone)]
pub struct IField {
    declaring: TypeId,
    decl: Arc<FieldDecl>,
}

impl IField {
    pub(crate) fn new(declaring: TypeId, decl: Arc<FieldDecl>) -> Self {
        Self { declaring, decl }
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    pub fn field_type(&self) -> TypeId {
        self.decl.ty
    }

    pub fn is_static(&self) -> bool {
        self.decl.is_static
    }

    /// `None` iff the field is not a compile-time constant
    pub fn constant_value(&self) -> Option<&Constant> {
        self.decl.constant_value.as_ref()
    }

    pub fn descriptor(&self, arena: &TypeArena) -> Arc<str> {
        arena.descriptor(self.decl.ty)
    }

    pub fn decl(&self) -> &FieldDecl {
        &self.decl
    }
}

impl PartialEq for IField {
    fn eq(&self, other: &Self) -> bool {
        self.declaring == other.declaring && Arc::ptr_eq(&self.decl, &other.decl)
    }
}

impl IMember for IField {
    fn access(&self) -> Access {
        self.decl.access
    }

    fn declaring_class(&self) -> TypeId {
        self.declaring
    }
}

/// Closed set of member kinds
#[derive(Debug, Clone, Copy)]
pub enum MemberRef<'a> {
    Field(&'a IField),
    Method(&'a IMethod),
    Constructor(&'a IConstructor),
}

impl IMember for MemberRef<'_> {
    fn access(&self) -> Access {
        match self {
            Self::Field(f) => f.access(),
            Self::Method(m) => m.access(),
            Self::Constructor(c) => c.access(),
        }
    }

    fn declaring_class(&self) -> TypeId {
        match self {
            Self::Field(f) => f.declaring_class(),
            Self::Method(m) => m.declaring_class(),
            Self::Constructor(c) => c.declaring_class(),
        }
    }
}

impl<'a> From<&'a IField> for MemberRef<'a> {
    fn from(field: &'a IField) -> Self {
        Self::Field(field)
    }
}

impl<'a> From<&'a IMethod> for MemberRef<'a> {
    fn from(method: &'a IMethod) -> Self {
        Self::Method(method)
    }
}

impl<'a> From<&'a IConstructor> for MemberRef<'a> {
    fn from(constructor: &'a IConstructor) -> Self {
        Self::Constructor(constructor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::Fixture;
    use crate::model::SourceClass;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_descriptor() {
        let fx = Fixture::new();
        let m = IMethod::new(
            fx.object,
            Arc::new(MethodDecl::new("m", vec![TypeId::INT, fx.string], TypeId::VOID)),
        );
        assert_eq!(m.descriptor(&fx.arena).unwrap(), "(ILjava/lang/String;)V");
        assert_eq!(m.declaring_class(), fx.object);
    }

    #[test]
    fn test_constructor_descriptor_includes_outer_instance() {
        let fx = Fixture::new();
        let outer = fx.class("pkg.Outer", Some(fx.object));
        let inner_src = SourceClass::class("pkg.Outer$Inner");
        inner_src.set_superclass(Some(fx.object));
        inner_src.set_outer_class(Some(outer));
        inner_src.add_constructor(ConstructorDecl::new(vec![TypeId::LONG]));
        let inner = fx.arena.define_class(Arc::new(inner_src)).unwrap();

        let ctors = fx.arena.declared_constructors(inner);
        assert_eq!(ctors.len(), 1);
        assert_eq!(ctors[0].parameter_types(), &[TypeId::LONG]);
        assert_eq!(ctors[0].descriptor(&fx.arena).unwrap(), "(Lpkg/Outer;J)V");
    }

    #[test]
    fn test_constant_sentinel() {
        let fx = Fixture::new();
        let plain = IField::new(fx.object, Arc::new(FieldDecl::new("a", fx.string)));
        let null = IField::new(
            fx.object,
            Arc::new(FieldDecl::new("b", fx.string).with_constant(Constant::Null)),
        );
        assert_eq!(plain.constant_value(), None);
        assert_eq!(null.constant_value(), Some(&Constant::Null));
        assert_eq!(&*null.descriptor(&fx.arena), "Ljava/lang/String;");
    }

    #[test]
    fn test_member_ref_dispatch() {
        let fx = Fixture::new();
        let field = IField::new(
            fx.string,
            Arc::new(FieldDecl::new("hash", TypeId::INT).with_access(Access::Private)),
        );
        let member = MemberRef::from(&field);
        assert_eq!(member.access(), Access::Private);
        assert_eq!(member.declaring_class(), fx.string);
    }
}
