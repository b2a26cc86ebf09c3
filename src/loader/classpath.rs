//! JSON class-path models
//!
//! A class-path model describes compiled classes the way a class-file reader
//! would report them: names in source spelling, members with their types.
//!
//! ```json
//! { "classes": [
//!   { "name": "zoo.Dog", "superclass": "zoo.Animal", "interfaces": ["zoo.Moveable"],
//!     "methods": [ { "name": "move", "parameters": ["int"], "returns": "void" } ],
//!     "fields": [ { "name": "LEGS", "type": "int", "static": true, "constant": { "int": 4 } } ] }
//! ] }
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::bootstrap;
use crate::loader::{require, require_all, ClassLoader};
use crate::model::{Access, Constant, ConstructorDecl, FieldDecl, MethodDecl, SourceClass, TypeArena, TypeId};
use crate::types::descriptor;
use crate::utils::{Error, Result, Span};

// ==================== Model ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassPathModel {
    #[serde(default)]
    pub classes: Vec<ClassModel>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

fn public() -> Access {
    Access::Public
}

fn void() -> String {
    "void".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassModel {
    /// Source spelling, `$` separating member types: `p.Outer$Inner`
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default = "public")]
    pub access: Access,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Defaults to `java.lang.Object` for classes; ignored for interfaces
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub outer: Option<String>,
    #[serde(default)]
    pub declaring: Option<String>,
    #[serde(default)]
    pub member_types: Vec<String>,
    #[serde(default)]
    pub constructors: Vec<ConstructorModel>,
    #[serde(default)]
    pub methods: Vec<MethodModel>,
    #[serde(default)]
    pub fields: Vec<FieldModel>,
    #[serde(default)]
    pub synthetic_fields: Vec<FieldModel>,
    #[serde(default)]
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructorModel {
    #[serde(default = "public")]
    pub access: Access,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub throws: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodModel {
    pub name: String,
    #[serde(default = "public")]
    pub access: Access,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default = "void")]
    pub returns: String,
    #[serde(default)]
    pub throws: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldModel {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub access: Access,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub constant: Option<Constant>,
}

// ==================== Loader ====================

/// Loads classes from a [`ClassPathModel`] on first reference; anything the
/// model does not name falls back to the built-in types.
#[derive(Debug)]
pub struct ModelLoader {
    /// Keyed by descriptor
    classes: HashMap<String, ClassModel>,
    /// Class names in model order
    names: Vec<String>,
}

impl ModelLoader {
    pub fn new(model: ClassPathModel) -> Result<Self> {
        let mut classes = HashMap::new();
        let mut names = Vec::new();
        for class in model.classes {
            let desc = descriptor::from_class_name(&class.name)?;
            if descriptor::is_array(&desc) || descriptor::is_primitive(&desc) {
                return Err(Error::InvalidDescriptor { descriptor: desc });
            }
            if classes.contains_key(&desc) {
                return Err(Error::DuplicateType {
                    descriptor: desc,
                    span: class.span,
                });
            }
            names.push(class.name.clone());
            classes.insert(desc, class);
        }
        Ok(Self { classes, names })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn class_names(&self) -> &[String] {
        &self.names
    }

    /// Load every class of the model, in model order
    pub fn load_all(&self, arena: &TypeArena) -> Result<Vec<TypeId>> {
        self.names
            .iter()
            .map(|name| require(arena, self, name, None))
            .collect()
    }

    fn define(&self, arena: &TypeArena, desc: &str, model: &ClassModel) -> Result<Option<TypeId>> {
        let is_interface = model.kind == ClassKind::Interface;
        let mut class = if is_interface {
            SourceClass::interface(&model.name)
        } else {
            SourceClass::class(&model.name)
        }
        .with_access(model.access)
        .with_final(model.is_final);
        if model.is_abstract {
            class = class.with_abstract(true);
        }
        if let Some(span) = model.span {
            class = class.at(span);
        }
        let class = Arc::new(class);
        let id = match arena.define_class(class.clone()) {
            Ok(id) => id,
            Err(Error::DuplicateType { .. }) => return Ok(arena.lookup(desc)),
            Err(err) => return Err(err),
        };
        debug!("loaded {} from class-path model", model.name);

        // Registered first: filling in may load classes that refer back
        if let Err(err) = self.fill(arena, desc, model, &class) {
            warn!("failed to load {}: {}", model.name, err);
            class.fail(err.clone());
            return Err(err);
        }
        Ok(Some(id))
    }

    fn fill(&self, arena: &TypeArena, desc: &str, model: &ClassModel, class: &SourceClass) -> Result<()> {
        let is_interface = model.kind == ClassKind::Interface;
        let span = model.span;
        let ty = |name: &str| require(arena, self, name, span);
        let types = |names: &[String]| require_all(arena, self, names, span);

        let superclass = match &model.superclass {
            _ if is_interface => {
                if model.superclass.is_some() {
                    warn!("ignoring superclass of interface {}", model.name);
                }
                None
            }
            Some(name) => Some(ty(name)?),
            None if desc == descriptor::JAVA_LANG_OBJECT => None,
            None => Some(ty("java.lang.Object")?),
        };
        class.set_superclass(superclass);
        for interface in types(&model.interfaces)? {
            class.add_interface(interface);
        }
        class.set_outer_class(model.outer.as_deref().map(ty).transpose()?);
        class.set_declaring_class(model.declaring.as_deref().map(ty).transpose()?);
        for member in types(&model.member_types)? {
            class.add_member_type(member);
        }

        for constructor in &model.constructors {
            class.add_constructor(
                ConstructorDecl::new(types(&constructor.parameters)?)
                    .with_access(constructor.access)
                    .with_throws(types(&constructor.throws)?),
            );
        }
        for method in &model.methods {
            class.add_method(
                MethodDecl::new(method.name.as_str(), types(&method.parameters)?, ty(&method.returns)?)
                    .with_access(method.access)
                    .with_static(method.is_static)
                    .with_abstract(method.is_abstract)
                    .with_throws(types(&method.throws)?),
            );
        }
        for field in &model.fields {
            class.add_field(field_decl(field, ty(&field.ty)?));
        }
        for field in &model.synthetic_fields {
            class.define_synthetic_field(field_decl(field, ty(&field.ty)?))?;
        }
        Ok(())
    }
}

fn field_decl(field: &FieldModel, ty: TypeId) -> FieldDecl {
    let mut decl = FieldDecl::new(field.name.as_str(), ty)
        .with_access(field.access)
        .with_static(field.is_static);
    if let Some(constant) = &field.constant {
        decl = decl.with_constant(constant.clone());
    }
    decl
}

impl ClassLoader for ModelLoader {
    fn load_class(&self, arena: &TypeArena, descriptor: &str) -> Result<Option<TypeId>> {
        match self.classes.get(descriptor) {
            Some(model) => self.define(arena, descriptor, model),
            None => bootstrap::define(arena, descriptor, self),
        }
    }
}
