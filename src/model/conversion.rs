//! Conversion and subtyping (JLS2 5.1)

use crate::model::{TypeArena, TypeId};
use crate::types::descriptor;
use crate::utils::Result;

/// Widening primitive conversions (JLS2 5.1.2) as source-then-target
/// descriptor pairs. Every pair is listed; there is no transitive closure.
const PRIMITIVE_WIDENING_CONVERSIONS: &[&str] = &[
    "BS", "BI", "SI", "CI",
    "BJ", "SJ", "CJ", "IJ",
    "BF", "SF", "CF", "IF", "JF",
    "BD", "SD", "CD", "ID", "JD", "FD",
];

impl TypeArena {
    /// Whether a value of type `that` may be assigned to `this`: identity
    /// (JLS2 5.1.1), widening primitive (5.1.2) or widening reference (5.1.4)
    /// conversion.
    pub fn is_assignable_from(&self, this: TypeId, that: TypeId) -> Result<bool> {
        if this == that {
            return Ok(true);
        }

        let pair = format!("{}{}", self.descriptor(that), self.descriptor(this));
        if pair.len() == 2 && PRIMITIVE_WIDENING_CONVERSIONS.contains(&pair.as_str()) {
            return Ok(true);
        }

        // 5.1.4.1: target is a superclass of the source class
        if self.is_subclass_of(that, this)? {
            return Ok(true);
        }
        // 5.1.4.2, 5.1.4.4: source class implements (or source interface extends) the target
        if self.implements_interface(that, this)? {
            return Ok(true);
        }
        // 5.1.4.3: the null literal, typed as `void`, converts to any reference type
        if that == TypeId::VOID && !self.is_primitive(this) {
            return Ok(true);
        }

        let target = self.descriptor(this);
        // 5.1.4.5: any interface to Object
        if self.is_interface(that) && &*target == descriptor::JAVA_LANG_OBJECT {
            return Ok(true);
        }
        if self.is_array(that) {
            // 5.1.4.6 - 5.1.4.8
            if matches!(
                &*target,
                descriptor::JAVA_LANG_OBJECT
                    | descriptor::JAVA_LANG_CLONEABLE
                    | descriptor::JAVA_IO_SERIALIZABLE
            ) {
                return Ok(true);
            }
            // 5.1.4.9: SC[] to TC[] if SC widens to TC by reference
            if let (Some(this_ct), Some(that_ct)) = (self.component_type(this), self.component_type(that)) {
                if !self.is_primitive(this_ct) && self.is_assignable_from(this_ct, that_ct)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Whether `that` is a proper ancestor in the superclass chain of `this`
    pub fn is_subclass_of(&self, this: TypeId, that: TypeId) -> Result<bool> {
        let mut current = self.superclass(this)?;
        while let Some(class) = current {
            if class == that {
                return Ok(true);
            }
            current = self.superclass(class)?;
        }
        Ok(false)
    }

    /// For a class: whether it or a superclass implements `that`, directly or
    /// through an extended interface. For an interface: whether it extends
    /// `that`, directly or indirectly.
    pub fn implements_interface(&self, this: TypeId, that: TypeId) -> Result<bool> {
        let mut current = Some(this);
        while let Some(class) = current {
            for &interface in self.interfaces(class)?.iter() {
                if interface == that || self.implements_interface(interface, that)? {
                    return Ok(true);
                }
            }
            current = self.superclass(class)?;
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::Fixture;
    use crate::model::SourceClass;
    use crate::types::Primitive;

    fn rank(p: Primitive) -> Option<u8> {
        match p {
            Primitive::Byte => Some(0),
            Primitive::Short => Some(1),
            Primitive::Int => Some(2),
            Primitive::Long => Some(3),
            Primitive::Float => Some(4),
            Primitive::Double => Some(5),
            _ => None,
        }
    }

    /// The byte > short > int > long > float > double and char > int chain
    fn widens(from: Primitive, to: Primitive) -> bool {
        if from == to {
            return true;
        }
        if from == Primitive::Char {
            return rank(to).is_some_and(|r| r >= 2);
        }
        match (rank(from), rank(to)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    #[test]
    fn test_widening_closure() {
        let fx = Fixture::new();
        let numeric: Vec<Primitive> = Primitive::ALL.into_iter().filter(|p| p.is_numeric()).collect();
        assert_eq!(numeric.len(), 7);
        for &p in &numeric {
            for &q in &numeric {
                assert_eq!(
                    fx.arena.is_assignable_from(TypeId::of(q), TypeId::of(p)).unwrap(),
                    widens(p, q),
                    "{} <- {}",
                    q.name(),
                    p.name()
                );
            }
        }
    }

    #[test]
    fn test_widening_examples() {
        let fx = Fixture::new();
        let a = &fx.arena;
        assert!(a.is_assignable_from(TypeId::LONG, TypeId::BYTE).unwrap());
        assert!(!a.is_assignable_from(TypeId::BYTE, TypeId::LONG).unwrap());
        assert!(a.is_assignable_from(TypeId::INT, TypeId::CHAR).unwrap());
        assert!(!a.is_assignable_from(TypeId::CHAR, TypeId::INT).unwrap());
        assert!(!a.is_assignable_from(TypeId::SHORT, TypeId::CHAR).unwrap());
        assert!(!a.is_assignable_from(TypeId::CHAR, TypeId::BYTE).unwrap());
        assert!(!a.is_assignable_from(TypeId::INT, TypeId::BOOLEAN).unwrap());
        assert!(a.is_assignable_from(TypeId::BOOLEAN, TypeId::BOOLEAN).unwrap());
    }

    #[test]
    fn test_reflexive_but_not_strict_subclass() {
        let fx = Fixture::new();
        let ints = fx.arena.array_class(TypeId::INT, fx.object);
        let dog = fx.class("zoo.Dog", Some(fx.object));
        for t in [TypeId::INT, TypeId::VOID, fx.object, fx.string, fx.serializable, ints, dog] {
            assert!(fx.arena.is_assignable_from(t, t).unwrap());
            assert!(!fx.arena.is_subclass_of(t, t).unwrap());
        }
    }

    #[test]
    fn test_reference_widening() {
        let fx = Fixture::new();
        let a = &fx.arena;
        assert!(a.is_assignable_from(fx.object, fx.string).unwrap());
        assert!(!a.is_assignable_from(fx.string, fx.object).unwrap());
        assert!(a.is_assignable_from(fx.serializable, fx.string).unwrap());
        assert!(a.is_subclass_of(fx.string, fx.object).unwrap());
        assert!(a.implements_interface(fx.string, fx.serializable).unwrap());
        assert!(!a.implements_interface(fx.string, fx.cloneable).unwrap());
        // Interfaces to Object without any supertype link
        assert!(a.is_assignable_from(fx.object, fx.cloneable).unwrap());
        assert!(!a.is_subclass_of(fx.cloneable, fx.object).unwrap());
        // No boxing, no primitive-to-reference
        assert!(!a.is_assignable_from(fx.object, TypeId::INT).unwrap());
        assert!(!a.is_assignable_from(TypeId::INT, fx.object).unwrap());
    }

    #[test]
    fn test_null_literal_converts_to_references_only() {
        let fx = Fixture::new();
        let ints = fx.arena.array_class(TypeId::INT, fx.object);
        assert!(fx.arena.is_assignable_from(fx.string, TypeId::VOID).unwrap());
        assert!(fx.arena.is_assignable_from(fx.cloneable, TypeId::VOID).unwrap());
        assert!(fx.arena.is_assignable_from(ints, TypeId::VOID).unwrap());
        assert!(!fx.arena.is_assignable_from(TypeId::INT, TypeId::VOID).unwrap());
        assert!(!fx.arena.is_assignable_from(TypeId::VOID, fx.string).unwrap());
    }

    #[test]
    fn test_inherited_interfaces() {
        let fx = Fixture::new();
        let top = fx.interface("p.Top", &[]);
        let mid = fx.interface("p.Mid", &[top]);
        let (base_src, base) = fx.source(SourceClass::class("p.Base"));
        base_src.set_superclass(Some(fx.object));
        base_src.add_interface(mid);
        let sub = fx.class("p.Sub", Some(base));

        assert!(fx.arena.implements_interface(sub, top).unwrap());
        assert!(fx.arena.implements_interface(mid, top).unwrap());
        assert!(!fx.arena.implements_interface(top, mid).unwrap());
        assert!(fx.arena.is_assignable_from(top, sub).unwrap());
        assert!(!fx.arena.is_assignable_from(sub, top).unwrap());
    }

    #[test]
    fn test_array_covariance() {
        let fx = Fixture::new();
        let a = &fx.arena;
        let objects = a.array_class(fx.object, fx.object);
        let strings = a.array_class(fx.string, fx.object);
        let ints = a.array_class(TypeId::INT, fx.object);
        let longs = a.array_class(TypeId::LONG, fx.object);
        let string_matrix = a.array_class_n(fx.string, 2, fx.object);
        let object_matrix = a.array_class_n(fx.object, 2, fx.object);

        assert!(a.is_assignable_from(objects, strings).unwrap());
        assert!(!a.is_assignable_from(strings, objects).unwrap());
        assert!(a.is_assignable_from(object_matrix, string_matrix).unwrap());
        // Object[] takes arrays of arrays but not arrays of primitives
        assert!(!a.is_assignable_from(objects, ints).unwrap());
        assert!(a.is_assignable_from(objects, string_matrix).unwrap());
        // Primitive component types never widen
        assert!(!a.is_assignable_from(longs, ints).unwrap());
        assert!(!a.is_assignable_from(ints, longs).unwrap());
    }

    #[test]
    fn test_arrays_to_object_cloneable_serializable() {
        let fx = Fixture::new();
        let ints = fx.arena.array_class(TypeId::INT, fx.object);
        let strings = fx.arena.array_class(fx.string, fx.object);
        for array in [ints, strings] {
            for target in [fx.object, fx.cloneable, fx.serializable] {
                assert!(fx.arena.is_assignable_from(target, array).unwrap());
            }
            assert!(!fx.arena.is_subclass_of(array, fx.cloneable).unwrap());
            assert!(!fx.arena.is_subclass_of(array, fx.serializable).unwrap());
            assert!(!fx.arena.implements_interface(array, fx.cloneable).unwrap());
            assert!(!fx.arena.is_assignable_from(array, fx.object).unwrap());
        }
    }

    #[test]
    fn test_circular_graph_fails_instead_of_looping() {
        let fx = Fixture::new();
        let (a_src, a) = fx.source(SourceClass::class("cyc.A"));
        let b = fx.class("cyc.B", Some(a));
        a_src.set_superclass(Some(b));
        for _ in 0..2 {
            assert!(fx.arena.is_assignable_from(fx.object, a).unwrap_err().is_circularity());
            assert!(fx.arena.is_subclass_of(b, a).is_err());
        }
    }
}
