//! Canonical type-handle registry
//!
//! The [`TypeArena`] owns every [`IClass`] of one compilation. It hands out
//! exactly one handle per descriptor, so handle identity ([`TypeId`]
//! equality) is type identity everywhere else in the engine.
//!
//! Supertype links are validated when they are first computed:
//! - a superclass is accepted only if the chain above it never leads back
//! - an interface is accepted only if it does not (transitively) reach back
//!
//! A rejected link is not cached, so every later query fails the same way.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use log::{debug, trace, warn};

use crate::loader::ClassLoader;
use crate::model::{Access, ClassProvider, IClass, IClassKind, TypeCategory, TypeId};
use crate::types::{descriptor, Primitive};
use crate::utils::sync::{lock, read, write};
use crate::utils::{Error, Result, Span};

pub struct TypeArena {
    handles: RwLock<Vec<Arc<IClass>>>,
    by_descriptor: RwLock<HashMap<Arc<str>, TypeId>>,
}

impl TypeArena {
    /// Create an arena holding the nine reserved primitive handles
    pub fn new() -> Self {
        let arena = Self {
            handles: RwLock::new(Vec::new()),
            by_descriptor: RwLock::new(HashMap::new()),
        };
        for p in Primitive::ALL {
            let id = arena.push(IClassKind::Primitive(p));
            debug_assert_eq!(id, TypeId::of(p));
            write(&arena.by_descriptor).insert(Arc::from(p.descriptor()), id);
        }
        arena
    }

    pub fn len(&self) -> usize {
        read(&self.handles).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Panics if `id` was not issued by this arena
    pub fn handle(&self, id: TypeId) -> Arc<IClass> {
        read(&self.handles)[id.index() as usize].clone()
    }

    fn push(&self, kind: IClassKind) -> TypeId {
        let mut handles = write(&self.handles);
        let id = TypeId::from_index(handles.len());
        handles.push(Arc::new(IClass::new(id, kind)));
        id
    }

    /// Register a class or interface. Its descriptor must not be taken yet.
    pub fn define_class(&self, provider: Arc<dyn ClassProvider>) -> Result<TypeId> {
        let desc = provider.descriptor();
        descriptor::validate(&desc)?;
        if descriptor::is_primitive(&desc) || descriptor::is_array(&desc) {
            return Err(Error::InvalidDescriptor { descriptor: desc });
        }
        let mut index = write(&self.by_descriptor);
        if index.contains_key(desc.as_str()) {
            return Err(Error::DuplicateType {
                descriptor: desc,
                span: provider.location(),
            });
        }
        let id = self.push(IClassKind::Declared(provider));
        debug!("defined {} as {}", desc, id);
        index.insert(Arc::from(desc), id);
        Ok(id)
    }

    /// The handle registered for `descriptor`, if any
    pub fn lookup(&self, descriptor: &str) -> Option<TypeId> {
        read(&self.by_descriptor).get(descriptor).copied()
    }

    /// Find or load the handle for a field descriptor.
    ///
    /// Array handles are derived from their component by repeated wrapping;
    /// classes not yet registered are requested from `loader`.
    pub fn resolve<L: ClassLoader + ?Sized>(&self, desc: &str, loader: &L) -> Result<Option<TypeId>> {
        descriptor::validate(desc)?;
        if let Some(id) = self.lookup(desc) {
            if let Some(error) = self.handle(id).provider().and_then(|p| p.load_error()) {
                return Err(error);
            }
            return Ok(Some(id));
        }
        if let Some(component) = descriptor::component(desc) {
            let Some(component) = self.resolve(component, loader)? else {
                return Ok(None);
            };
            let object = loader.object_type(self)?;
            return Ok(Some(self.array_class(component, object)));
        }
        trace!("loading {}", desc);
        loader.load_class(self, desc)
    }

    /// Like [`resolve`](Self::resolve), for source spelling (`java.lang.String[]`)
    pub fn resolve_name<L: ClassLoader + ?Sized>(&self, class_name: &str, loader: &L) -> Result<Option<TypeId>> {
        self.resolve(&descriptor::from_class_name(class_name)?, loader)
    }

    // ==================== Attributes ====================

    pub fn descriptor(&self, id: TypeId) -> Arc<str> {
        let handle = self.handle(id);
        handle.cache.descriptor.get_or_compute(|| match handle.kind() {
            IClassKind::Primitive(p) => Arc::from(p.descriptor()),
            IClassKind::Declared(provider) => Arc::from(provider.descriptor()),
            IClassKind::Array { component, .. } => {
                Arc::from(format!("[{}", self.descriptor(*component)))
            }
        })
    }

    pub fn descriptors(&self, ids: &[TypeId]) -> Vec<Arc<str>> {
        ids.iter().map(|id| self.descriptor(*id)).collect()
    }

    /// Source spelling, e.g. `java.lang.String[]`
    pub fn class_name(&self, id: TypeId) -> String {
        descriptor::to_class_name(&self.descriptor(id))
    }

    pub fn category(&self, id: TypeId) -> TypeCategory {
        self.handle(id).category()
    }

    pub fn access(&self, id: TypeId) -> Access {
        match self.handle(id).kind() {
            IClassKind::Primitive(_) => Access::Public,
            IClassKind::Declared(provider) => provider.access(),
            IClassKind::Array { component, .. } => self.access(*component),
        }
    }

    /// Whether subclassing is prohibited
    pub fn is_final(&self, id: TypeId) -> bool {
        match self.handle(id).kind() {
            IClassKind::Declared(provider) => provider.is_final(),
            IClassKind::Primitive(_) | IClassKind::Array { .. } => true,
        }
    }

    /// Whether instantiation is prohibited
    pub fn is_abstract(&self, id: TypeId) -> bool {
        match self.handle(id).kind() {
            IClassKind::Declared(provider) => provider.is_abstract(),
            IClassKind::Primitive(_) | IClassKind::Array { .. } => false,
        }
    }

    pub fn is_interface(&self, id: TypeId) -> bool {
        self.category(id) == TypeCategory::Interface
    }

    pub fn is_array(&self, id: TypeId) -> bool {
        self.category(id) == TypeCategory::Array
    }

    /// Primitive type or `void`
    pub fn is_primitive(&self, id: TypeId) -> bool {
        self.category(id) == TypeCategory::Primitive
    }

    pub fn is_primitive_numeric(&self, id: TypeId) -> bool {
        matches!(self.handle(id).kind(), IClassKind::Primitive(p) if p.is_numeric())
    }

    pub fn location(&self, id: TypeId) -> Option<Span> {
        self.handle(id).provider().and_then(|p| p.location())
    }

    pub fn component_type(&self, id: TypeId) -> Option<TypeId> {
        match self.handle(id).kind() {
            IClassKind::Array { component, .. } => Some(*component),
            _ => None,
        }
    }

    pub fn outer_class(&self, id: TypeId) -> Result<Option<TypeId>> {
        let handle = self.handle(id);
        handle.cache.outer_class.get_or_try_compute(|| match handle.provider() {
            Some(provider) => provider.outer_class(),
            None => Ok(None),
        })
    }

    pub fn declaring_class(&self, id: TypeId) -> Result<Option<TypeId>> {
        let handle = self.handle(id);
        handle.cache.declaring_class.get_or_try_compute(|| match handle.provider() {
            Some(provider) => provider.declaring_class(),
            None => Ok(None),
        })
    }

    // ==================== Supertypes ====================

    /// `None` for `java.lang.Object`, interfaces, primitives and `void`.
    ///
    /// Fails with a class circularity error if the superclass chain would lead
    /// back to `id`.
    pub fn superclass(&self, id: TypeId) -> Result<Option<TypeId>> {
        let handle = self.handle(id);
        if let Some(cached) = handle.cache.superclass.get() {
            return Ok(cached);
        }
        let superclass = self.superclass_uncached(&handle)?;
        if let Some(first) = superclass {
            self.check_superclass_chain(id, first)?;
        }
        Ok(handle.cache.superclass.set(superclass))
    }

    fn superclass_uncached(&self, handle: &IClass) -> Result<Option<TypeId>> {
        match handle.kind() {
            IClassKind::Primitive(_) => Ok(None),
            IClassKind::Declared(provider) => provider.superclass(),
            IClassKind::Array { object, .. } => Ok(Some(*object)),
        }
    }

    /// Validated link if known, provider link otherwise
    fn peek_superclass(&self, id: TypeId) -> Result<Option<TypeId>> {
        let handle = self.handle(id);
        match handle.cache.superclass.get() {
            Some(cached) => Ok(cached),
            None => self.superclass_uncached(&handle),
        }
    }

    /// Walk the whole chain above `first` before accepting `id -> first`
    fn check_superclass_chain(&self, id: TypeId, first: TypeId) -> Result<()> {
        let mut seen = HashSet::new();
        let mut current = Some(first);
        while let Some(class) = current {
            if class == id || !seen.insert(class) {
                warn!("class circularity detected for {}", self.class_name(class));
                return Err(Error::ClassCircularity {
                    class: self.class_name(class),
                    span: self.location(class),
                });
            }
            current = self.peek_superclass(class)?;
        }
        Ok(())
    }

    /// Implemented interfaces of a class, extended interfaces of an interface;
    /// empty for arrays, primitives and `void`.
    ///
    /// Fails with an interface circularity error if any of them (transitively)
    /// reaches `id` again.
    pub fn interfaces(&self, id: TypeId) -> Result<Arc<[TypeId]>> {
        let handle = self.handle(id);
        if let Some(cached) = handle.cache.interfaces.get() {
            return Ok(cached);
        }
        let interfaces: Arc<[TypeId]> = self.interfaces_uncached(&handle)?.into();
        for &interface in interfaces.iter() {
            if self.reaches_interface(interface, id)? {
                warn!("interface circularity detected for {}", self.class_name(id));
                return Err(Error::InterfaceCircularity {
                    class: self.class_name(id),
                    span: self.location(id),
                });
            }
        }
        Ok(handle.cache.interfaces.set(interfaces))
    }

    fn interfaces_uncached(&self, handle: &IClass) -> Result<Vec<TypeId>> {
        match handle.provider() {
            Some(provider) => provider.interfaces(),
            None => Ok(Vec::new()),
        }
    }

    fn peek_interfaces(&self, id: TypeId) -> Result<Arc<[TypeId]>> {
        let handle = self.handle(id);
        match handle.cache.interfaces.get() {
            Some(cached) => Ok(cached),
            None => Ok(self.interfaces_uncached(&handle)?.into()),
        }
    }

    /// Whether `target` is an interface of `start`, of one of its superclasses,
    /// or of anything those interfaces extend
    fn reaches_interface(&self, start: TypeId, target: TypeId) -> Result<bool> {
        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if let Some(superclass) = self.peek_superclass(node)? {
                if visited.insert(superclass) {
                    stack.push(superclass);
                }
            }
            for &interface in self.peek_interfaces(node)?.iter() {
                if interface == target {
                    return Ok(true);
                }
                if visited.insert(interface) {
                    stack.push(interface);
                }
            }
        }
        Ok(false)
    }

    // ==================== Array Types ====================

    /// The handle for "array of `id`", created at most once per handle even
    /// under concurrent first use. `object` is the root type arrays extend.
    pub fn array_class(&self, id: TypeId, object: TypeId) -> TypeId {
        let handle = self.handle(id);
        let mut slot = lock(&handle.array_class);
        if let Some(array) = *slot {
            return array;
        }
        let array = self.push(IClassKind::Array { component: id, object });
        let desc = self.descriptor(array);
        debug!("created array type {} as {}", desc, array);
        write(&self.by_descriptor).entry(desc).or_insert(array);
        *slot = Some(array);
        array
    }

    /// `n`-dimensional array of `id`
    pub fn array_class_n(&self, id: TypeId, n: usize, object: TypeId) -> TypeId {
        (0..n).fold(id, |current, _| self.array_class(current, object))
    }
}

impl Default for TypeArena {
    fn default() -> Self {
        Self::new()
    }
}
