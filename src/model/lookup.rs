//! Member lookup and caching
//!
//! Declared members come from the providers once and are indexed by name.
//! Indices are never patched in place: the method group is dropped by
//! [`TypeArena::invalidate_method_caches`] and the field index by
//! [`TypeArena::clear_field_caches`], and both are rebuilt on next access.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::debug;

use crate::model::{IConstructor, IField, IInvocable, IClassKind, IMethod, MethodDecl, TypeArena, TypeId};
use crate::types::descriptor;
use crate::utils::sync::lock;
use crate::utils::Result;

/// Declared methods grouped by name, declaration order kept within a group
pub(crate) type MethodIndex = HashMap<String, Arc<[IMethod]>>;

/// Declared fields in declaration order, with a name index
#[derive(Debug, Default)]
pub(crate) struct FieldIndex {
    fields: Vec<IField>,
    by_name: HashMap<String, usize>,
}

impl FieldIndex {
    fn build(fields: impl IntoIterator<Item = IField>) -> Self {
        let mut index = Self::default();
        for field in fields {
            match index.by_name.get(field.name()) {
                // A later declaration of the same name replaces the earlier one
                Some(&slot) => index.fields[slot] = field,
                None => {
                    index.by_name.insert(field.name().to_string(), index.fields.len());
                    index.fields.push(field);
                }
            }
        }
        index
    }

    fn get(&self, name: &str) -> Option<&IField> {
        self.by_name.get(name).map(|&slot| &self.fields[slot])
    }
}

/// One name's methods while the index is being built
enum Group {
    One(IMethod),
    Many(Vec<IMethod>),
}

fn build_method_index(methods: &[IMethod]) -> MethodIndex {
    let mut groups: HashMap<String, Group> = HashMap::new();
    for method in methods {
        match groups.remove(method.name()) {
            None => {
                groups.insert(method.name().to_string(), Group::One(method.clone()));
            }
            Some(Group::One(first)) => {
                groups.insert(
                    method.name().to_string(),
                    Group::Many(vec![first, method.clone()]),
                );
            }
            Some(Group::Many(mut list)) => {
                list.push(method.clone());
                groups.insert(method.name().to_string(), Group::Many(list));
            }
        }
    }
    groups
        .into_iter()
        .map(|(name, group)| {
            let methods: Arc<[IMethod]> = match group {
                Group::One(method) => Arc::from(vec![method]),
                Group::Many(list) => Arc::from(list),
            };
            (name, methods)
        })
        .collect()
}

impl TypeArena {
    // ==================== Constructors ====================

    /// Declared constructors including a class's default constructor; empty
    /// for interfaces, arrays, primitives and `void`
    pub fn declared_constructors(&self, id: TypeId) -> Arc<[IConstructor]> {
        let handle = self.handle(id);
        handle.cache.declared_constructors.get_or_compute(|| match handle.provider() {
            Some(provider) => provider
                .declared_constructors()
                .into_iter()
                .map(|decl| IConstructor::new(id, decl))
                .collect(),
            None => Arc::from(Vec::new()),
        })
    }

    // ==================== Methods ====================

    /// Methods declared by `id` itself, in declaration order.
    ///
    /// Arrays declare exactly `public Object clone()`.
    pub fn declared_methods(&self, id: TypeId) -> Arc<[IMethod]> {
        let handle = self.handle(id);
        handle.cache.declared_methods.get_or_compute(|| match handle.kind() {
            IClassKind::Primitive(_) => Arc::from(Vec::new()),
            IClassKind::Declared(provider) => provider
                .declared_methods()
                .into_iter()
                .map(|decl| IMethod::new(id, decl))
                .collect(),
            // Arrays override `Object.clone()` without `throws CloneNotSupportedException`
            IClassKind::Array { object, .. } => {
                let clone = MethodDecl::new("clone", Vec::new(), *object);
                Arc::from(vec![IMethod::new(id, Arc::new(clone))])
            }
        })
    }

    /// Methods named `name` declared by `id` itself; empty if there are none
    pub fn declared_methods_named(&self, id: TypeId, name: &str) -> Arc<[IMethod]> {
        let handle = self.handle(id);
        let index = handle
            .cache
            .declared_methods_by_name
            .get_or_compute(|| Arc::new(build_method_index(&self.declared_methods(id))));
        match index.get(name) {
            Some(methods) => methods.clone(),
            None => Arc::from(Vec::new()),
        }
    }

    /// The declared method with exactly these parameter handles
    pub fn find_method(&self, id: TypeId, name: &str, parameter_types: &[TypeId]) -> Option<IMethod> {
        self.declared_methods_named(id, name)
            .iter()
            .find(|m| m.parameter_types() == parameter_types)
            .cloned()
    }

    pub fn has_method(&self, id: TypeId, name: &str, parameter_types: &[TypeId]) -> bool {
        self.find_method(id, name, parameter_types).is_some()
    }

    /// Declared and inherited methods: declared ones first, then the
    /// superclass's set, then each interface's set. A method whose name and
    /// descriptor were already seen is skipped.
    pub fn methods(&self, id: TypeId) -> Result<Arc<[IMethod]>> {
        let handle = self.handle(id);
        handle.cache.methods.get_or_try_compute(|| {
            let mut result = Vec::new();
            let mut seen = HashSet::new();
            self.collect_methods(id, &mut result, &mut seen)?;
            Ok(Arc::from(result))
        })
    }

    fn collect_methods(
        &self,
        id: TypeId,
        result: &mut Vec<IMethod>,
        seen: &mut HashSet<(String, String)>,
    ) -> Result<()> {
        for method in self.declared_methods(id).iter() {
            let key = (method.name().to_string(), method.descriptor(self)?);
            if seen.insert(key) {
                result.push(method.clone());
            }
        }
        if let Some(superclass) = self.superclass(id)? {
            self.collect_methods(superclass, result, seen)?;
        }
        for &interface in self.interfaces(id)?.iter() {
            self.collect_methods(interface, result, seen)?;
        }
        Ok(())
    }

    /// Drop the declared-method list and the per-name index; the inherited
    /// method set and field caches stay
    pub fn invalidate_method_caches(&self, id: TypeId) {
        let handle = self.handle(id);
        handle.cache.declared_methods.clear();
        handle.cache.declared_methods_by_name.clear();
        debug!("invalidated method caches of {}", self.class_name(id));
    }

    // ==================== Fields ====================

    fn field_index(&self, id: TypeId) -> Arc<FieldIndex> {
        let handle = self.handle(id);
        handle.cache.declared_fields.get_or_compute(|| {
            let decls = handle
                .provider()
                .map(|provider| provider.declared_fields())
                .unwrap_or_default();
            Arc::new(FieldIndex::build(
                decls.into_iter().map(|decl| IField::new(id, decl)),
            ))
        })
    }

    /// Fields declared by `id` itself (not inherited), in declaration order
    pub fn declared_fields(&self, id: TypeId) -> Vec<IField> {
        self.field_index(id).fields.clone()
    }

    pub fn declared_field(&self, id: TypeId, name: &str) -> Option<IField> {
        self.field_index(id).get(name).cloned()
    }

    /// Forget the field index, e.g. after a class body gained fields
    pub fn clear_field_caches(&self, id: TypeId) {
        self.handle(id).cache.declared_fields.clear();
        debug!("cleared field caches of {}", self.class_name(id));
    }

    /// Outer-instance and captured-local fields of inner classes
    pub fn synthetic_fields(&self, id: TypeId) -> Vec<IField> {
        match self.handle(id).provider() {
            Some(provider) => provider
                .synthetic_fields()
                .into_iter()
                .map(|decl| IField::new(id, decl))
                .collect(),
            None => Vec::new(),
        }
    }

    // ==================== Member Types ====================

    /// Member classes and interfaces declared by `id` (not inherited)
    pub fn declared_classes(&self, id: TypeId) -> Result<Arc<[TypeId]>> {
        let handle = self.handle(id);
        handle.cache.declared_classes.get_or_try_compute(|| match handle.provider() {
            Some(provider) => Ok(Arc::from(provider.declared_classes()?)),
            None => Ok(Arc::from(Vec::new())),
        })
    }

    /// Member types visible in the scope of `id`: its own, its supertypes' and
    /// its enclosing types'.
    ///
    /// With a name, only members of that simple name are returned; a type
    /// that declares a match shadows its own supertypes and enclosing types.
    /// A type reachable along several paths appears once per path, so more
    /// than one result means the name is ambiguous.
    pub fn find_member_type(&self, id: TypeId, name: Option<&str>) -> Result<Arc<[TypeId]>> {
        let handle = self.handle(id);
        let key = name.map(str::to_string);
        if let Some(cached) = lock(&handle.cache.member_types).get(&key) {
            return Ok(cached.clone());
        }
        let mut result = Vec::new();
        let mut path = Vec::new();
        self.collect_member_types(id, name, &mut result, &mut path)?;
        let result: Arc<[TypeId]> = Arc::from(result);
        lock(&handle.cache.member_types).insert(key, result.clone());
        Ok(result)
    }

    fn collect_member_types(
        &self,
        id: TypeId,
        name: Option<&str>,
        result: &mut Vec<TypeId>,
        path: &mut Vec<TypeId>,
    ) -> Result<()> {
        // Enclosing links are not validated like supertypes; skip a frame
        // that is already being searched further up the recursion.
        if path.contains(&id) {
            return Ok(());
        }
        let members = self.declared_classes(id)?;
        match name {
            None => result.extend(members.iter().copied()),
            Some(name) => {
                let wanted = descriptor::from_class_name(&format!("{}${}", self.class_name(id), name))?;
                if let Some(&member) = members.iter().find(|&&m| *self.descriptor(m) == *wanted) {
                    result.push(member);
                    return Ok(());
                }
            }
        }

        path.push(id);
        if let Some(superclass) = self.superclass(id)? {
            self.collect_member_types(superclass, name, result, path)?;
        }
        for &interface in self.interfaces(id)?.iter() {
            self.collect_member_types(interface, name, result, path)?;
        }
        let declaring = self.declaring_class(id)?;
        if let Some(declaring) = declaring {
            self.collect_member_types(declaring, name, result, path)?;
        }
        if let Some(outer) = self.outer_class(id)? {
            if Some(outer) != declaring {
                self.collect_member_types(outer, name, result, path)?;
            }
        }
        path.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::Fixture;
    use crate::model::{Access, Constant, FieldDecl, IMember, SourceClass};
    use pretty_assertions::assert_eq;

    fn names(methods: &[IMethod]) -> Vec<String> {
        methods.iter().map(|m| m.name().to_string()).collect()
    }

    #[test]
    fn test_declared_methods_named_groups_in_order() {
        let fx = Fixture::new();
        let (src, c) = fx.source(SourceClass::class("p.C"));
        let first = src.add_method(MethodDecl::new("f", vec![], TypeId::VOID));
        src.add_method(MethodDecl::new("g", vec![], TypeId::VOID));
        let second = src.add_method(MethodDecl::new("f", vec![TypeId::INT], TypeId::VOID));
        let third = src.add_method(MethodDecl::new("f", vec![fx.string], TypeId::VOID));

        let fs = fx.arena.declared_methods_named(c, "f");
        let decls: Vec<&MethodDecl> = fs.iter().map(|m| m.decl()).collect();
        assert_eq!(decls, vec![&*first, &*second, &*third]);
        assert_eq!(fx.arena.declared_methods_named(c, "g").len(), 1);
        assert!(fx.arena.declared_methods_named(c, "h").is_empty());
        assert!(fs.iter().all(|m| m.declaring_class() == c));
    }

    #[test]
    fn test_find_method_matches_exact_handles() {
        let fx = Fixture::new();
        let (src, c) = fx.source(SourceClass::class("p.C"));
        src.add_method(MethodDecl::new("f", vec![TypeId::INT, fx.string], TypeId::VOID));

        assert!(fx.arena.has_method(c, "f", &[TypeId::INT, fx.string]));
        assert!(!fx.arena.has_method(c, "f", &[TypeId::INT]));
        assert!(!fx.arena.has_method(c, "f", &[TypeId::LONG, fx.string]));
        assert!(!fx.arena.has_method(c, "f", &[TypeId::INT, fx.object]));
        assert_eq!(fx.arena.find_method(c, "g", &[]), None);
    }

    #[test]
    fn test_index_is_not_rebuilt_until_invalidated() {
        let fx = Fixture::new();
        let (src, c) = fx.source(SourceClass::class("p.C"));
        src.add_method(MethodDecl::new("f", vec![], TypeId::VOID));
        src.add_field(FieldDecl::new("x", TypeId::INT));
        assert_eq!(fx.arena.declared_methods_named(c, "f").len(), 1);
        assert!(fx.arena.declared_field(c, "x").is_some());

        src.add_method(MethodDecl::new("f", vec![TypeId::INT], TypeId::VOID));
        src.add_field(FieldDecl::new("y", TypeId::INT));
        assert_eq!(fx.arena.declared_methods_named(c, "f").len(), 1);

        fx.arena.invalidate_method_caches(c);
        assert_eq!(fx.arena.declared_methods_named(c, "f").len(), 2);
        assert_eq!(fx.arena.declared_methods(c).len(), 2);
        // Fields are a separate cache group
        assert!(fx.arena.declared_field(c, "y").is_none());

        fx.arena.clear_field_caches(c);
        assert!(fx.arena.declared_field(c, "y").is_some());
        assert_eq!(fx.arena.declared_fields(c).len(), 2);
    }

    #[test]
    fn test_invalidation_keeps_inherited_method_set() {
        let fx = Fixture::new();
        let (src, c) = fx.source(SourceClass::class("p.C"));
        src.set_superclass(Some(fx.object));
        let before = fx.arena.methods(c).unwrap().len();
        src.add_method(MethodDecl::new("extra", vec![], TypeId::VOID));
        fx.arena.invalidate_method_caches(c);
        assert_eq!(fx.arena.methods(c).unwrap().len(), before);
        assert_eq!(fx.arena.declared_methods(c).len(), 1);
    }

    #[test]
    fn test_fields_keep_declaration_order() {
        let fx = Fixture::new();
        let (src, c) = fx.source(SourceClass::class("p.C"));
        src.add_field(FieldDecl::new("zeta", TypeId::INT));
        src.add_field(FieldDecl::new("alpha", fx.string).with_access(Access::Public));
        src.add_field(
            FieldDecl::new("MAX", TypeId::LONG)
                .with_static(true)
                .with_constant(Constant::Long(9)),
        );
        let fields = fx.arena.declared_fields(c);
        let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "MAX"]);
        let max = fx.arena.declared_field(c, "MAX").unwrap();
        assert!(max.is_static());
        assert_eq!(max.constant_value(), Some(&Constant::Long(9)));
        assert_eq!(max.declaring_class(), c);
    }

    #[test]
    fn test_primitives_and_arrays_have_no_fields() {
        let fx = Fixture::new();
        let ints = fx.arena.array_class(TypeId::INT, fx.object);
        assert!(fx.arena.declared_fields(TypeId::INT).is_empty());
        assert!(fx.arena.declared_fields(ints).is_empty());
        assert!(fx.arena.declared_methods(TypeId::INT).is_empty());
        assert!(fx.arena.declared_constructors(ints).is_empty());
        assert!(fx.arena.declared_classes(TypeId::VOID).unwrap().is_empty());
        assert!(fx.arena.synthetic_fields(TypeId::INT).is_empty());
    }

    #[test]
    fn test_array_declares_public_clone() {
        let fx = Fixture::new();
        let strings = fx.arena.array_class(fx.string, fx.object);
        let methods = fx.arena.declared_methods(strings);
        assert_eq!(names(&methods), vec!["clone"]);
        let clone = &methods[0];
        assert_eq!(clone.access(), Access::Public);
        assert_eq!(clone.return_type(), fx.object);
        assert!(clone.parameter_types().is_empty());
        assert!(clone.thrown_exceptions().is_empty());
        assert!(fx.arena.has_method(strings, "clone", &[]));
    }

    #[test]
    fn test_methods_dedup_and_order() {
        let fx = Fixture::new();
        let (moveable_src, moveable) = fx.source(SourceClass::interface("zoo.Moveable"));
        moveable_src.add_method(MethodDecl::new("move", vec![], TypeId::VOID).with_abstract(true));
        moveable_src.add_method(MethodDecl::new("stop", vec![], TypeId::VOID).with_abstract(true));

        let (dog_src, dog) = fx.source(SourceClass::class("zoo.Dog"));
        dog_src.set_superclass(Some(fx.object));
        dog_src.add_interface(moveable);
        dog_src.add_method(MethodDecl::new("move", vec![], TypeId::VOID));
        dog_src.add_method(MethodDecl::new("toString", vec![], fx.string));

        let methods = fx.arena.methods(dog).unwrap();
        let moves: Vec<&IMethod> = methods.iter().filter(|m| m.name() == "move").collect();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].declaring_class(), dog);

        let to_strings: Vec<&IMethod> = methods.iter().filter(|m| m.name() == "toString").collect();
        assert_eq!(to_strings.len(), 1);
        assert_eq!(to_strings[0].declaring_class(), dog);

        // Declared first, then Object's, then the interface's remainder
        let order = names(&methods);
        assert_eq!(&order[..2], &["move".to_string(), "toString".to_string()]);
        assert_eq!(order.last().map(String::as_str), Some("stop"));
        let stop = methods.iter().find(|m| m.name() == "stop").unwrap();
        assert_eq!(stop.declaring_class(), moveable);
    }

    #[test]
    fn test_overloads_with_distinct_descriptors_are_all_inherited() {
        let fx = Fixture::new();
        let (base_src, base) = fx.source(SourceClass::class("p.Base"));
        base_src.set_superclass(Some(fx.object));
        base_src.add_method(MethodDecl::new("f", vec![TypeId::INT], TypeId::VOID));
        let (sub_src, sub) = fx.source(SourceClass::class("p.Sub"));
        sub_src.set_superclass(Some(base));
        sub_src.add_method(MethodDecl::new("f", vec![TypeId::LONG], TypeId::VOID));

        let fs: Vec<TypeId> = fx
            .arena
            .methods(sub)
            .unwrap()
            .iter()
            .filter(|m| m.name() == "f")
            .map(|m| m.declaring_class())
            .collect();
        assert_eq!(fs, vec![sub, base]);
    }

    #[test]
    fn test_methods_propagates_circularity() {
        let fx = Fixture::new();
        let (a_src, a) = fx.source(SourceClass::class("cyc.A"));
        let b = fx.class("cyc.B", Some(a));
        a_src.set_superclass(Some(b));
        assert!(fx.arena.methods(a).unwrap_err().is_circularity());
        assert!(fx.arena.methods(a).is_err());
    }

    #[test]
    fn test_find_member_type_by_name() {
        let fx = Fixture::new();
        let (outer_src, outer) = fx.source(SourceClass::class("p.Outer"));
        outer_src.set_superclass(Some(fx.object));
        let (entry_src, entry) = fx.source(SourceClass::class("p.Outer$Entry"));
        entry_src.set_superclass(Some(fx.object));
        entry_src.set_declaring_class(Some(outer));
        outer_src.add_member_type(entry);

        let (inner_src, inner) = fx.source(SourceClass::class("p.Outer$Inner"));
        inner_src.set_superclass(Some(fx.object));
        inner_src.set_declaring_class(Some(outer));
        inner_src.set_outer_class(Some(outer));
        outer_src.add_member_type(inner);

        assert_eq!(&*fx.arena.find_member_type(outer, Some("Entry")).unwrap(), &[entry]);
        // Found through the declaring type; the identical outer type is not searched twice
        assert_eq!(&*fx.arena.find_member_type(inner, Some("Entry")).unwrap(), &[entry]);
        assert!(fx.arena.find_member_type(outer, Some("Missing")).unwrap().is_empty());
        assert_eq!(&*fx.arena.find_member_type(outer, None).unwrap(), &[entry, inner]);
    }

    #[test]
    fn test_find_member_type_through_supertypes_with_duplicates() {
        let fx = Fixture::new();
        let (holder_src, holder) = fx.source(SourceClass::interface("p.Holder"));
        let (key_src, key) = fx.source(SourceClass::class("p.Holder$Key"));
        key_src.set_superclass(Some(fx.object));
        key_src.set_declaring_class(Some(holder));
        holder_src.add_member_type(key);

        let (base_src, base) = fx.source(SourceClass::class("p.Base"));
        base_src.set_superclass(Some(fx.object));
        base_src.add_interface(holder);
        let (sub_src, sub) = fx.source(SourceClass::class("p.Sub"));
        sub_src.set_superclass(Some(base));
        sub_src.add_interface(holder);

        // Reached once through Base and once directly
        assert_eq!(&*fx.arena.find_member_type(sub, Some("Key")).unwrap(), &[key, key]);
        assert_eq!(&*fx.arena.find_member_type(sub, None).unwrap(), &[key, key]);
    }

    #[test]
    fn test_declared_match_shadows_inherited() {
        let fx = Fixture::new();
        let (base_src, base) = fx.source(SourceClass::class("p.Base"));
        base_src.set_superclass(Some(fx.object));
        let (base_node_src, base_node) = fx.source(SourceClass::class("p.Base$Node"));
        base_node_src.set_declaring_class(Some(base));
        base_src.add_member_type(base_node);

        let (sub_src, sub) = fx.source(SourceClass::class("p.Sub"));
        sub_src.set_superclass(Some(base));
        let (sub_node_src, sub_node) = fx.source(SourceClass::class("p.Sub$Node"));
        sub_node_src.set_declaring_class(Some(sub));
        sub_src.add_member_type(sub_node);

        assert_eq!(&*fx.arena.find_member_type(sub, Some("Node")).unwrap(), &[sub_node]);
        assert_eq!(&*fx.arena.find_member_type(sub, None).unwrap(), &[sub_node, base_node]);
    }

    #[test]
    fn test_member_type_results_are_memoized() {
        let fx = Fixture::new();
        let (outer_src, outer) = fx.source(SourceClass::class("p.Outer"));
        outer_src.set_superclass(Some(fx.object));
        assert!(fx.arena.find_member_type(outer, Some("Late")).unwrap().is_empty());

        let (late_src, late) = fx.source(SourceClass::class("p.Outer$Late"));
        late_src.set_declaring_class(Some(outer));
        outer_src.add_member_type(late);
        assert!(fx.arena.find_member_type(outer, Some("Late")).unwrap().is_empty());
    }

    #[test]
    fn test_enclosing_cycle_terminates() {
        let fx = Fixture::new();
        let (a_src, a) = fx.source(SourceClass::class("p.A"));
        let (b_src, b) = fx.source(SourceClass::class("p.B"));
        a_src.set_declaring_class(Some(b));
        b_src.set_declaring_class(Some(a));
        assert!(fx.arena.find_member_type(a, Some("X")).unwrap().is_empty());
    }

    #[test]
    fn test_synthetic_fields_are_bound_to_class() {
        let fx = Fixture::new();
        let (src, inner) = fx.source(SourceClass::class("p.Outer$1"));
        src.define_synthetic_field(FieldDecl::new("this$0", fx.object)).unwrap();
        let synthetic = fx.arena.synthetic_fields(inner);
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].declaring_class(), inner);
        assert!(fx.arena.declared_fields(inner).is_empty());
    }
}
