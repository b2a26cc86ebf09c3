//! Human-readable member rendering for diagnostics

use std::fmt;

use crate::model::{Access, IInvocable, IMember, MemberRef, TypeArena, TypeId};

/// Renders a member the way diagnostics spell it:
///
/// ```text
/// public static int com.x.A.m(int, java.lang.String) throws java.io.IOException
/// com.x.A(int)
/// com.x.A.f
/// ```
pub struct MemberDisplay<'a> {
    arena: &'a TypeArena,
    member: MemberRef<'a>,
}

impl TypeArena {
    pub fn display<'a>(&'a self, member: impl Into<MemberRef<'a>>) -> MemberDisplay<'a> {
        MemberDisplay {
            arena: self,
            member: member.into(),
        }
    }
}

impl MemberDisplay<'_> {
    fn write_types(&self, f: &mut fmt::Formatter<'_>, types: &[TypeId]) -> fmt::Result {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&self.arena.class_name(*ty))?;
        }
        Ok(())
    }

    fn write_signature(&self, f: &mut fmt::Formatter<'_>, invocable: &dyn IInvocable) -> fmt::Result {
        f.write_str("(")?;
        self.write_types(f, invocable.parameter_types())?;
        f.write_str(")")?;
        if !invocable.thrown_exceptions().is_empty() {
            f.write_str(" throws ")?;
            self.write_types(f, invocable.thrown_exceptions())?;
        }
        Ok(())
    }
}

impl fmt::Display for MemberDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declaring = self.arena.class_name(self.member.declaring_class());
        match self.member {
            MemberRef::Field(field) => write!(f, "{}.{}", declaring, field.name()),
            MemberRef::Constructor(constructor) => {
                f.write_str(&declaring)?;
                self.write_signature(f, constructor)
            }
            MemberRef::Method(method) => {
                if method.access() != Access::Default {
                    write!(f, "{} ", method.access())?;
                }
                if method.is_static() {
                    f.write_str("static ")?;
                }
                if method.is_abstract() {
                    f.write_str("abstract ")?;
                }
                write!(
                    f,
                    "{} {}.{}",
                    self.arena.class_name(method.return_type()),
                    declaring,
                    method.name()
                )?;
                self.write_signature(f, method)
            }
        }
    }
}
