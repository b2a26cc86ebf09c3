//! JVM field and method descriptors (JVMS 4.3)
//!
//! Descriptors are the canonical string identity of a type handle. Class names
//! in source spelling (`java.lang.String[]`) convert to and from them here.

use crate::types::Primitive;
use crate::utils::{Error, Result};

pub const JAVA_LANG_OBJECT: &str = "Ljava/lang/Object;";
pub const JAVA_LANG_CLONEABLE: &str = "Ljava/lang/Cloneable;";
pub const JAVA_IO_SERIALIZABLE: &str = "Ljava/io/Serializable;";
pub const JAVA_LANG_STRING: &str = "Ljava/lang/String;";

pub fn is_array(descriptor: &str) -> bool {
    descriptor.starts_with('[')
}

pub fn is_primitive(descriptor: &str) -> bool {
    Primitive::from_descriptor(descriptor).is_some()
}

pub fn is_primitive_numeric(descriptor: &str) -> bool {
    Primitive::from_descriptor(descriptor).is_some_and(Primitive::is_numeric)
}

/// Component descriptor of an array descriptor
pub fn component(descriptor: &str) -> Option<&str> {
    descriptor.strip_prefix('[')
}

/// `Ljava/lang/String;` => `java.lang.String`, `[I` => `int[]`.
///
/// Anything that is not a well-formed descriptor is returned unchanged.
pub fn to_class_name(descriptor: &str) -> String {
    let dims = descriptor.chars().take_while(|c| *c == '[').count();
    let base = &descriptor[dims..];
    let name = if let Some(p) = Primitive::from_descriptor(base) {
        p.name().to_string()
    } else if let Some(inner) = base.strip_prefix('L').and_then(|s| s.strip_suffix(';')) {
        inner.replace('/', ".")
    } else {
        return descriptor.to_string();
    };
    let mut result = name;
    for _ in 0..dims {
        result.push_str("[]");
    }
    result
}

/// `java.lang.String` => `Ljava/lang/String;`, `int[][]` => `[[I`.
pub fn from_class_name(class_name: &str) -> Result<String> {
    let mut base = class_name.trim();
    let mut dims = 0;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
        dims += 1;
    }
    let invalid = || Error::InvalidDescriptor {
        descriptor: class_name.to_string(),
    };
    let element = if let Some(p) = Primitive::from_name(base) {
        if p == Primitive::Void && dims > 0 {
            return Err(invalid());
        }
        p.descriptor().to_string()
    } else {
        if base.is_empty()
            || base.starts_with('.')
            || base.ends_with('.')
            || base
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, ';' | '[' | ']' | '/'))
        {
            return Err(invalid());
        }
        format!("L{};", base.replace('.', "/"))
    };
    Ok(format!("{}{}", "[".repeat(dims), element))
}

/// Reject strings that are not field descriptors
pub fn validate(descriptor: &str) -> Result<()> {
    let base = descriptor.trim_start_matches('[');
    let dims = descriptor.len() - base.len();
    let ok = match Primitive::from_descriptor(base) {
        Some(Primitive::Void) => dims == 0,
        Some(_) => true,
        None => base
            .strip_prefix('L')
            .and_then(|s| s.strip_suffix(';'))
            .is_some_and(|inner| !inner.is_empty() && !inner.contains(['.', ';', '['])),
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidDescriptor {
            descriptor: descriptor.to_string(),
        })
    }
}

/// `(II)V`-style method descriptor
pub fn method_descriptor<S: AsRef<str>>(parameters: &[S], return_type: &str) -> String {
    let mut result = String::from("(");
    for p in parameters {
        result.push_str(p.as_ref());
    }
    result.push(')');
    result.push_str(return_type);
    result
}
