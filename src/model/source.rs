//! AST-backed class provider
//!
//! A [`SourceClass`] is the declaration of a class or interface as a parser
//! and resolver build it up: the handle is registered first, then supertypes
//! and members are filled in. Member lists may keep growing after the handle
//! was queried; callers then invalidate the arena's method or field caches.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::model::{Access, ClassProvider, ConstructorDecl, FieldDecl, MethodDecl, TypeId};
use crate::types::descriptor;
use crate::utils::sync::{read, write};
use crate::utils::{Error, Result, Span};

pub struct SourceClass {
    descriptor: String,
    is_interface: bool,
    access: Access,
    is_final: bool,
    is_abstract: bool,
    location: Option<Span>,
    default_constructor: Arc<ConstructorDecl>,

    superclass: RwLock<Option<TypeId>>,
    interfaces: RwLock<Vec<TypeId>>,
    outer_class: RwLock<Option<TypeId>>,
    declaring_class: RwLock<Option<TypeId>>,

    constructors: RwLock<Vec<Arc<ConstructorDecl>>>,
    methods: RwLock<Vec<Arc<MethodDecl>>>,
    fields: RwLock<Vec<Arc<FieldDecl>>>,
    member_types: RwLock<Vec<TypeId>>,
    /// `this$n` and `val$name` fields, ordered by name
    synthetic_fields: RwLock<BTreeMap<String, Arc<FieldDecl>>>,
    load_error: RwLock<Option<Error>>,
}

impl SourceClass {
    /// A public class named in source spelling (`pkg.Outer$Inner`)
    pub fn class(name: &str) -> Self {
        Self::new(name, false)
    }

    /// A public interface named in source spelling
    pub fn interface(name: &str) -> Self {
        let mut class = Self::new(name, true);
        class.is_abstract = true;
        class
    }

    fn new(name: &str, is_interface: bool) -> Self {
        Self {
            descriptor: format!("L{};", name.replace('.', "/")),
            is_interface,
            access: Access::Public,
            is_final: false,
            is_abstract: false,
            location: None,
            default_constructor: Arc::new(ConstructorDecl::new(Vec::new())),
            superclass: RwLock::new(None),
            interfaces: RwLock::new(Vec::new()),
            outer_class: RwLock::new(None),
            declaring_class: RwLock::new(None),
            constructors: RwLock::new(Vec::new()),
            methods: RwLock::new(Vec::new()),
            fields: RwLock::new(Vec::new()),
            member_types: RwLock::new(Vec::new()),
            synthetic_fields: RwLock::new(BTreeMap::new()),
            load_error: RwLock::new(None),
        }
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn at(mut self, span: Span) -> Self {
        self.location = Some(span);
        self
    }

    pub fn name(&self) -> String {
        descriptor::to_class_name(&self.descriptor)
    }

    pub fn set_superclass(&self, superclass: Option<TypeId>) {
        *write(&self.superclass) = superclass;
    }

    pub fn add_interface(&self, interface: TypeId) {
        write(&self.interfaces).push(interface);
    }

    pub fn set_outer_class(&self, outer: Option<TypeId>) {
        *write(&self.outer_class) = outer;
    }

    pub fn set_declaring_class(&self, declaring: Option<TypeId>) {
        *write(&self.declaring_class) = declaring;
    }

    pub fn add_constructor(&self, constructor: ConstructorDecl) -> Arc<ConstructorDecl> {
        let constructor = Arc::new(constructor);
        write(&self.constructors).push(constructor.clone());
        constructor
    }

    pub fn add_method(&self, method: MethodDecl) -> Arc<MethodDecl> {
        let method = Arc::new(method);
        write(&self.methods).push(method.clone());
        method
    }

    pub fn add_field(&self, field: FieldDecl) -> Arc<FieldDecl> {
        let field = Arc::new(field);
        write(&self.fields).push(field.clone());
        field
    }

    pub fn add_member_type(&self, member: TypeId) {
        write(&self.member_types).push(member);
    }

    /// Mark the declaration as broken; its supertypes and member types then
    /// report `error` instead of the partial state.
    pub fn fail(&self, error: Error) {
        let mut load_error = write(&self.load_error);
        if load_error.is_none() {
            *load_error = Some(error);
        }
    }

    fn check_loaded(&self) -> Result<()> {
        match &*read(&self.load_error) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Define a synthetic field. Redefining one with the same type is a no-op.
    pub fn define_synthetic_field(&self, field: FieldDecl) -> Result<()> {
        let mut fields = write(&self.synthetic_fields);
        if let Some(existing) = fields.get(&field.name) {
            if existing.ty != field.ty {
                return Err(Error::SyntheticFieldConflict {
                    class: self.name(),
                    field: field.name,
                });
            }
            return Ok(());
        }
        fields.insert(field.name.clone(), Arc::new(field));
        Ok(())
    }
}

impl ClassProvider for SourceClass {
    fn descriptor(&self) -> String {
        self.descriptor.clone()
    }

    fn access(&self) -> Access {
        self.access
    }

    fn is_final(&self) -> bool {
        self.is_final
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_interface(&self) -> bool {
        self.is_interface
    }

    fn location(&self) -> Option<Span> {
        self.location
    }

    fn load_error(&self) -> Option<Error> {
        read(&self.load_error).clone()
    }

    fn superclass(&self) -> Result<Option<TypeId>> {
        self.check_loaded()?;
        Ok(*read(&self.superclass))
    }

    fn interfaces(&self) -> Result<Vec<TypeId>> {
        self.check_loaded()?;
        Ok(read(&self.interfaces).clone())
    }

    fn outer_class(&self) -> Result<Option<TypeId>> {
        Ok(*read(&self.outer_class))
    }

    fn declaring_class(&self) -> Result<Option<TypeId>> {
        Ok(*read(&self.declaring_class))
    }

    /// A class without explicit constructors gets the public no-arg one
    fn declared_constructors(&self) -> Vec<Arc<ConstructorDecl>> {
        let constructors = read(&self.constructors);
        if constructors.is_empty() && !self.is_interface {
            return vec![self.default_constructor.clone()];
        }
        constructors.clone()
    }

    fn declared_methods(&self) -> Vec<Arc<MethodDecl>> {
        read(&self.methods).clone()
    }

    fn declared_fields(&self) -> Vec<Arc<FieldDecl>> {
        read(&self.fields).clone()
    }

    fn declared_classes(&self) -> Result<Vec<TypeId>> {
        self.check_loaded()?;
        Ok(read(&self.member_types).clone())
    }

    fn synthetic_fields(&self) -> Vec<Arc<FieldDecl>> {
        read(&self.synthetic_fields).values().cloned().collect()
    }
}
